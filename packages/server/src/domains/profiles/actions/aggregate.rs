//! User-detail aggregation: batch-load profiles with all owned collections.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::debug;

use crate::common::{AppError, AppResult, UserId};
use crate::domains::profiles::data::UserDetailAggregate;
use crate::domains::profiles::models::{
    Interest, InterestKind, PictureWithFile, ProfilePicture, UserDetail,
};

/// Load full profile aggregates for a set of user ids.
///
/// One batched round trip per table, merged by user id. Every requested id
/// must have a base profile (`NotFound` otherwise); empty interest/picture
/// collections are fine.
pub async fn get_by_ids(
    ids: &[UserId],
    pool: &PgPool,
) -> AppResult<HashMap<UserId, UserDetailAggregate>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    debug!(count = ids.len(), "Loading user detail aggregates");

    let details = UserDetail::find_by_user_ids(ids, pool).await?;
    let hobbies = Interest::find_by_user_ids(InterestKind::Hobbies, ids, pool).await?;
    let movie_series = Interest::find_by_user_ids(InterestKind::MovieSeries, ids, pool).await?;
    let traveling = Interest::find_by_user_ids(InterestKind::Traveling, ids, pool).await?;
    let sports = Interest::find_by_user_ids(InterestKind::Sports, ids, pool).await?;
    let pictures = ProfilePicture::find_with_files(ids, pool).await?;

    merge_aggregates(
        ids,
        details,
        hobbies,
        movie_series,
        traveling,
        sports,
        pictures,
    )
}

/// Merge per-table row sets into one aggregate per user.
///
/// Pure function; row order within each child collection is preserved.
fn merge_aggregates(
    requested: &[UserId],
    details: Vec<UserDetail>,
    hobbies: Vec<Interest>,
    movie_series: Vec<Interest>,
    traveling: Vec<Interest>,
    sports: Vec<Interest>,
    pictures: Vec<PictureWithFile>,
) -> AppResult<HashMap<UserId, UserDetailAggregate>> {
    let mut map: HashMap<UserId, UserDetailAggregate> = details
        .into_iter()
        .map(|d| (d.user_id, UserDetailAggregate::new(d)))
        .collect();

    for id in requested {
        if !map.contains_key(id) {
            return Err(AppError::NotFound("user detail"));
        }
    }

    for row in hobbies {
        if let Some(agg) = map.get_mut(&row.user_id) {
            agg.hobbies.push(row);
        }
    }
    for row in movie_series {
        if let Some(agg) = map.get_mut(&row.user_id) {
            agg.movie_series.push(row);
        }
    }
    for row in traveling {
        if let Some(agg) = map.get_mut(&row.user_id) {
            agg.traveling.push(row);
        }
    }
    for row in sports {
        if let Some(agg) = map.get_mut(&row.user_id) {
            agg.sports.push(row);
        }
    }
    for row in pictures {
        if let Some(agg) = map.get_mut(&row.user_id) {
            agg.pictures.push(row);
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{FileId, InterestId, PictureId};
    use chrono::Utc;

    fn detail(user_id: UserId) -> UserDetail {
        UserDetail {
            user_id,
            lat: "1.0".into(),
            lng: "1.0".into(),
            bio: None,
            gender: "female".into(),
            education: None,
            drinking: None,
            smoking: None,
            relationship_preference: None,
            zodiac: None,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn interest(user_id: UserId, value: &str) -> Interest {
        Interest {
            id: InterestId::new(),
            user_id,
            value: value.into(),
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn picture(user_id: UserId, selected: bool) -> PictureWithFile {
        PictureWithFile {
            id: PictureId::new(),
            user_id,
            file_id: FileId::new(),
            selected,
            blob_link: format!("pictures/{}", PictureId::new()),
        }
    }

    #[test]
    fn test_merge_keys_children_by_user() {
        let a = UserId::new();
        let b = UserId::new();
        let map = merge_aggregates(
            &[a, b],
            vec![detail(a), detail(b)],
            vec![interest(a, "climbing"), interest(b, "chess")],
            vec![],
            vec![interest(a, "japan")],
            vec![],
            vec![picture(a, true), picture(a, false)],
        )
        .unwrap();

        let agg_a = &map[&a];
        assert_eq!(agg_a.hobbies.len(), 1);
        assert_eq!(agg_a.hobbies[0].value, "climbing");
        assert_eq!(agg_a.traveling.len(), 1);
        assert_eq!(agg_a.pictures.len(), 2);

        let agg_b = &map[&b];
        assert_eq!(agg_b.hobbies.len(), 1);
        assert!(agg_b.pictures.is_empty());
    }

    #[test]
    fn test_empty_collections_are_tolerated() {
        let a = UserId::new();
        let map =
            merge_aggregates(&[a], vec![detail(a)], vec![], vec![], vec![], vec![], vec![])
                .unwrap();
        let agg = &map[&a];
        assert!(agg.hobbies.is_empty());
        assert!(agg.pictures.is_empty());
    }

    #[test]
    fn test_missing_base_profile_is_not_found() {
        let a = UserId::new();
        let missing = UserId::new();
        let err = merge_aggregates(
            &[a, missing],
            vec![detail(a)],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
