//! User detail aggregate - SQL persistence layer.
//!
//! The aggregate root is `user_details`; interests live in four sibling
//! tables (`hobbies`, `movie_series`, `traveling`, `sports`) and profile
//! pictures reference `files` for their storage keys. Coordinates are kept as
//! decimal strings next to a generated PostGIS geography column that backs
//! the nearest-neighbor index.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{
    AppError, AppResult, FileId, GeoPoint, InterestId, Maybe, PictureId, UserId,
};

/// At most this many values per interest kind.
pub const MAX_INTERESTS: usize = 5;

#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct UserDetail {
    pub user_id: UserId,
    pub lat: String,
    pub lng: String,
    pub bio: Option<String>,
    pub gender: String,
    pub education: Option<String>,
    pub drinking: Option<String>,
    pub smoking: Option<String>,
    pub relationship_preference: Option<String>,
    pub zodiac: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDetail {
    pub fn geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.lat.clone(), self.lng.clone())
    }

    /// Find one user's detail row
    pub async fn find_by_user_id(user_id: UserId, pool: &PgPool) -> AppResult<Option<Self>> {
        let row = sqlx::query_as::<_, Self>("SELECT * FROM user_details WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Load a detail row under a row lock.
    ///
    /// Candidate generation reads the requester's geo point through this so a
    /// concurrent profile update cannot commit between the load and the
    /// nearest-neighbor query that uses it.
    pub async fn find_by_user_id_for_update(
        user_id: UserId,
        conn: &mut PgConnection,
    ) -> AppResult<Option<Self>> {
        let row =
            sqlx::query_as::<_, Self>("SELECT * FROM user_details WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(row)
    }

    /// Batch-load detail rows for a set of users in one round trip.
    pub async fn find_by_user_ids(ids: &[UserId], pool: &PgPool) -> AppResult<Vec<Self>> {
        let rows =
            sqlx::query_as::<_, Self>("SELECT * FROM user_details WHERE user_id = ANY($1)")
                .bind(ids)
                .fetch_all(pool)
                .await?;
        Ok(rows)
    }

    /// Apply a tri-state partial update.
    ///
    /// Each field branches on whether the patch set it at all; `NULL` writes
    /// clear nullable columns. Bumps `version`. The geography column is
    /// generated from `lat`/`lng` and follows automatically.
    pub async fn apply_patch(
        user_id: UserId,
        patch: &ProfilePatch,
        pool: &PgPool,
    ) -> AppResult<Self> {
        let location = patch.location.as_option();
        let row = sqlx::query_as::<_, Self>(
            r#"
            UPDATE user_details SET
                bio = CASE WHEN $2 THEN $3 ELSE bio END,
                gender = CASE WHEN $4 THEN $5 ELSE gender END,
                education = CASE WHEN $6 THEN $7 ELSE education END,
                drinking = CASE WHEN $8 THEN $9 ELSE drinking END,
                smoking = CASE WHEN $10 THEN $11 ELSE smoking END,
                relationship_preference = CASE WHEN $12 THEN $13 ELSE relationship_preference END,
                zodiac = CASE WHEN $14 THEN $15 ELSE zodiac END,
                lat = CASE WHEN $16 THEN $17 ELSE lat END,
                lng = CASE WHEN $16 THEN $18 ELSE lng END,
                version = version + 1,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(patch.bio.is_set())
        .bind(patch.bio.as_option())
        .bind(patch.gender.is_set())
        .bind(patch.gender.as_option())
        .bind(patch.education.is_set())
        .bind(patch.education.as_option())
        .bind(patch.drinking.is_set())
        .bind(patch.drinking.as_option())
        .bind(patch.smoking.is_set())
        .bind(patch.smoking.as_option())
        .bind(patch.relationship_preference.is_set())
        .bind(patch.relationship_preference.as_option())
        .bind(patch.zodiac.is_set())
        .bind(patch.zodiac.as_option())
        .bind(patch.location.is_set())
        .bind(location.map(|g| g.lat.as_str()))
        .bind(location.map(|g| g.lng.as_str()))
        .fetch_optional(pool)
        .await?;

        row.ok_or(AppError::NotFound("user detail"))
    }
}

/// Tri-state patch for `user_details`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub bio: Maybe<String>,
    #[serde(default)]
    pub gender: Maybe<String>,
    #[serde(default)]
    pub education: Maybe<String>,
    #[serde(default)]
    pub drinking: Maybe<String>,
    #[serde(default)]
    pub smoking: Maybe<String>,
    #[serde(default)]
    pub relationship_preference: Maybe<String>,
    #[serde(default)]
    pub zodiac: Maybe<String>,
    #[serde(default)]
    pub location: Maybe<GeoPoint>,
}

// ============================================================================
// Interests
// ============================================================================

/// The four interest collections a profile owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestKind {
    Hobbies,
    MovieSeries,
    Traveling,
    Sports,
}

impl InterestKind {
    /// Table (and field-path) name. Static strings only; interpolated into
    /// SQL below.
    pub fn table(&self) -> &'static str {
        match self {
            InterestKind::Hobbies => "hobbies",
            InterestKind::MovieSeries => "movie_series",
            InterestKind::Traveling => "traveling",
            InterestKind::Sports => "sports",
        }
    }
}

impl std::fmt::Display for InterestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

/// One interest row in any of the four collections.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub id: InterestId,
    pub user_id: UserId,
    pub value: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interest {
    /// Batch-load one kind for a set of users, insertion order.
    pub async fn find_by_user_ids(
        kind: InterestKind,
        ids: &[UserId],
        pool: &PgPool,
    ) -> AppResult<Vec<Self>> {
        let sql = format!(
            "SELECT * FROM {} WHERE user_id = ANY($1) ORDER BY id",
            kind.table()
        );
        let rows = sqlx::query_as::<_, Self>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Replace a user's collection of `kind` with `values`.
    ///
    /// # Errors
    ///
    /// `Internal` if the insert does not affect exactly `values.len()` rows.
    pub async fn replace_for_user(
        kind: InterestKind,
        user_id: UserId,
        values: &[String],
        conn: &mut PgConnection,
    ) -> AppResult<Vec<Self>> {
        let delete_sql = format!("DELETE FROM {} WHERE user_id = $1", kind.table());
        sqlx::query(&delete_sql)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        if values.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<InterestId> = values.iter().map(|_| InterestId::new()).collect();
        let insert_sql = format!(
            r#"
            INSERT INTO {} (id, user_id, value, version)
            SELECT t.id, $1, t.value, 1
            FROM UNNEST($2::uuid[], $3::text[]) AS t(id, value)
            RETURNING *
            "#,
            kind.table()
        );
        let rows = sqlx::query_as::<_, Self>(&insert_sql)
            .bind(user_id)
            .bind(&ids)
            .bind(values)
            .fetch_all(&mut *conn)
            .await?;

        if rows.len() != values.len() {
            return Err(AppError::Internal(anyhow!(
                "{} replace affected {} rows, expected {}",
                kind,
                rows.len(),
                values.len()
            )));
        }
        Ok(rows)
    }
}

// ============================================================================
// Profile pictures
// ============================================================================

#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePicture {
    pub id: PictureId,
    pub user_id: UserId,
    pub file_id: FileId,
    pub selected: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile picture joined with its file's storage key.
///
/// `blob_link` is an opaque storage key; it is resolved to a temporary public
/// URL at read time and never persisted in resolved form.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PictureWithFile {
    pub id: PictureId,
    pub user_id: UserId,
    pub file_id: FileId,
    pub selected: bool,
    pub blob_link: String,
}

impl ProfilePicture {
    /// Load a picture under a row lock (for selection changes).
    pub async fn find_by_id_for_update(
        id: PictureId,
        conn: &mut PgConnection,
    ) -> AppResult<Option<Self>> {
        let row =
            sqlx::query_as::<_, Self>("SELECT * FROM profile_pictures WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(row)
    }

    /// Batch-load pictures with storage keys for a set of users.
    ///
    /// Ordered selected-first within each user; this ordering is part of the
    /// aggregate contract.
    pub async fn find_with_files(ids: &[UserId], pool: &PgPool) -> AppResult<Vec<PictureWithFile>> {
        let rows = sqlx::query_as::<_, PictureWithFile>(
            r#"
            SELECT pp.id, pp.user_id, pp.file_id, pp.selected, f.blob_link
            FROM profile_pictures pp
            JOIN files f ON f.id = pp.file_id
            WHERE pp.user_id = ANY($1)
            ORDER BY pp.user_id, pp.selected DESC, pp.id
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Selected picture's storage key per user (for conversation summaries).
    pub async fn selected_with_files(
        ids: &[UserId],
        pool: &PgPool,
    ) -> AppResult<Vec<PictureWithFile>> {
        let rows = sqlx::query_as::<_, PictureWithFile>(
            r#"
            SELECT pp.id, pp.user_id, pp.file_id, pp.selected, f.blob_link
            FROM profile_pictures pp
            JOIN files f ON f.id = pp.file_id
            WHERE pp.user_id = ANY($1) AND pp.selected = true
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Clear any current selection for `user_id`, except `keep`.
    pub async fn clear_selected(
        user_id: UserId,
        keep: PictureId,
        conn: &mut PgConnection,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE profile_pictures
            SET selected = false, version = version + 1, updated_at = NOW()
            WHERE user_id = $1 AND selected = true AND id <> $2
            "#,
        )
        .bind(user_id)
        .bind(keep)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Mark one picture selected.
    pub async fn set_selected(id: PictureId, conn: &mut PgConnection) -> AppResult<Self> {
        let row = sqlx::query_as::<_, Self>(
            r#"
            UPDATE profile_pictures
            SET selected = true, version = version + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        row.ok_or(AppError::NotFound("profile picture"))
    }
}
