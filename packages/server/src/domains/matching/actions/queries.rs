//! Match read views: listing by status and single-match show.
//!
//! Both views hydrate each match with the counterpart's denormalized profile:
//! interests, distance from the requester, and pictures with freshly resolved
//! URLs. Hydration batches its storage reads and fans the URL resolutions out
//! concurrently.

use std::collections::HashMap;

use anyhow::anyhow;

use crate::common::{AppError, AppResult, GeoPoint, MatchId, UserId};
use crate::domains::matching::data::{InterestData, MatchData, MatchUserData, PictureData};
use crate::domains::matching::models::{Match, MatchStatus};
use crate::domains::profiles::actions::{get_by_ids, resolve_urls};
use crate::domains::profiles::data::UserDetailAggregate;
use crate::domains::profiles::models::{Interest, UserDetail};
use crate::kernel::ServerDeps;

/// Matches of `requester` in `status`, newest first, hydrated.
pub async fn list_matches(
    requester: UserId,
    status: MatchStatus,
    page: i64,
    limit: i64,
    deps: &ServerDeps,
) -> AppResult<Vec<MatchData>> {
    if page < 1 {
        return Err(AppError::validation_field("page must be at least 1", "page"));
    }
    if limit < 1 {
        return Err(AppError::validation_field(
            "limit must be at least 1",
            "limit",
        ));
    }

    let offset = page * limit - limit;
    let matches = Match::list_by_status(requester, status, limit, offset, &deps.db_pool).await?;
    hydrate(requester, &matches, deps).await
}

/// One match by id, hydrated. Enforces the visibility rules.
pub async fn show_match(
    requester: UserId,
    match_id: MatchId,
    deps: &ServerDeps,
) -> AppResult<MatchData> {
    let m = Match::find_by_id(match_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("match"))?;
    m.ensure_visible_to(requester)?;

    let mut hydrated = hydrate(requester, std::slice::from_ref(&m), deps).await?;
    hydrated
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow!("hydration dropped match {}", match_id)))
}

/// Annotate matches with their counterparts' profiles.
///
/// Counterpart aggregates load in one batch per table; every picture key
/// across the whole page is resolved in one concurrent fan-out.
async fn hydrate(
    requester: UserId,
    matches: &[Match],
    deps: &ServerDeps,
) -> AppResult<Vec<MatchData>> {
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let requester_detail = UserDetail::find_by_user_id(requester, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("user detail"))?;
    let requester_geo = requester_detail.geo_point();

    let counterparts: Vec<UserId> = matches
        .iter()
        .map(|m| m.counterpart(requester))
        .collect::<AppResult<_>>()?;

    let aggregates = get_by_ids(&counterparts, &deps.db_pool).await?;

    let keys: Vec<String> = aggregates
        .values()
        .flat_map(|agg| agg.picture_keys().map(str::to_string))
        .collect();
    let urls = resolve_urls(keys, deps.presign_ttl, deps.blob_store.as_ref()).await?;

    matches
        .iter()
        .zip(&counterparts)
        .map(|(m, counterpart)| {
            let agg = aggregates
                .get(counterpart)
                .ok_or(AppError::NotFound("user detail"))?;
            let distance_km = requester_geo.distance_km(&agg.detail.geo_point())?;
            let user = build_user_data(agg, distance_km, &urls)?;
            Ok(MatchData::from_match(m, user))
        })
        .collect()
}

/// Shape one counterpart aggregate for the wire.
///
/// Pure function; picture order (selected-first) is preserved from the
/// aggregate. A picture whose key is missing from `urls` means the resolution
/// batch was incomplete, which is an internal fault.
fn build_user_data(
    agg: &UserDetailAggregate,
    distance_km: f64,
    urls: &HashMap<String, String>,
) -> AppResult<MatchUserData> {
    let interests = |rows: &[Interest]| {
        rows.iter()
            .map(|i| InterestData {
                id: i.id.to_string(),
                value: i.value.clone(),
            })
            .collect::<Vec<_>>()
    };

    let pictures = agg
        .pictures
        .iter()
        .map(|p| {
            let url = urls.get(&p.blob_link).ok_or_else(|| {
                AppError::Internal(anyhow!("no resolved URL for picture {}", p.id))
            })?;
            Ok(PictureData {
                id: p.id.to_string(),
                selected: p.selected,
                url: url.clone(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(MatchUserData {
        user_id: agg.detail.user_id.to_string(),
        bio: agg.detail.bio.clone(),
        gender: agg.detail.gender.clone(),
        education: agg.detail.education.clone(),
        drinking: agg.detail.drinking.clone(),
        smoking: agg.detail.smoking.clone(),
        relationship_preference: agg.detail.relationship_preference.clone(),
        zodiac: agg.detail.zodiac.clone(),
        distance_km,
        hobbies: interests(&agg.hobbies),
        movie_series: interests(&agg.movie_series),
        traveling: interests(&agg.traveling),
        sports: interests(&agg.sports),
        pictures,
    })
}
