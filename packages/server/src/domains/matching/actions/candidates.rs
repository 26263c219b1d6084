//! Candidate generation and listing.

use tracing::info;

use crate::common::{AppError, AppResult, GeoPoint, UserId};
use crate::domains::matching::models::{find_candidates, Match, CANDIDATE_BATCH};
use crate::domains::profiles::models::UserDetail;
use crate::kernel::ServerDeps;

/// Generate a fresh batch of `UNKNOWN` candidate rows for `requester`.
///
/// Runs as one transaction: the requester's detail is loaded under a row
/// lock, the nearest users not yet linked by any match row are found from
/// its geo point, and one candidate row per pair is bulk-inserted. The lock
/// keeps a concurrent profile update from changing the geo point between the
/// load and the nearest-neighbor query. An empty neighborhood is a valid
/// outcome and returns an empty batch.
pub async fn create_candidates(requester: UserId, deps: &ServerDeps) -> AppResult<Vec<Match>> {
    let mut tx = deps.db_pool.begin().await?;

    let detail = UserDetail::find_by_user_id_for_update(requester, &mut tx)
        .await?
        .ok_or(AppError::NotFound("user detail"))?;
    let geo = detail.geo_point();

    let to_ids = find_candidates(requester, &geo, 1, CANDIDATE_BATCH, &mut tx).await?;
    if to_ids.is_empty() {
        tx.commit().await?;
        return Ok(Vec::new());
    }

    let rows = Match::insert_candidates(requester, &to_ids, &mut tx).await?;
    tx.commit().await?;

    info!(user_id = %requester, count = rows.len(), "Candidate batch created");
    Ok(rows)
}

/// List candidate user ids near a point, closest first.
pub async fn list_candidates(
    user_id: UserId,
    geo: &GeoPoint,
    page: i64,
    limit: i64,
    deps: &ServerDeps,
) -> AppResult<Vec<UserId>> {
    if page < 1 {
        return Err(AppError::validation_field("page must be at least 1", "page"));
    }
    if limit < 1 {
        return Err(AppError::validation_field(
            "limit must be at least 1",
            "limit",
        ));
    }

    let mut conn = deps.db_pool.acquire().await?;
    find_candidates(user_id, geo, page, limit, &mut conn).await
}
