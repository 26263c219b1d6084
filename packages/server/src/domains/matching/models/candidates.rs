//! Geospatial candidate query.
//!
//! Nearest-neighbor ordering is pushed down to the database geography index;
//! nothing here recomputes distance in memory.

use sqlx::PgConnection;

use crate::common::{AppResult, GeoPoint, UserId};

/// Users nearest to `geo`, excluding the requester and anyone already linked
/// to them by a match row in either direction, ordered by ascending distance.
///
/// `page` is 1-indexed (`offset = page * limit - limit`). An empty result is
/// a valid, non-error outcome.
pub async fn find_candidates(
    user_id: UserId,
    geo: &GeoPoint,
    page: i64,
    limit: i64,
    conn: &mut PgConnection,
) -> AppResult<Vec<UserId>> {
    let (lat, lng) = geo.coords()?;
    let offset = page * limit - limit;

    let ids = sqlx::query_scalar::<_, UserId>(
        r#"
        SELECT ud.user_id
        FROM user_details ud
        WHERE ud.user_id <> $1
          AND NOT EXISTS (
              SELECT 1 FROM matches m
              WHERE (m.request_from = $1 AND m.request_to = ud.user_id)
                 OR (m.request_to = $1 AND m.request_from = ud.user_id)
          )
        ORDER BY ud.geom <-> ST_SetSRID(ST_MakePoint($2, $3), 4326)::geography
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(user_id)
    .bind(lng)
    .bind(lat)
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}
