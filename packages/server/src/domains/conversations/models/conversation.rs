//! Conversation model - SQL persistence layer.
//!
//! A conversation is keyed by its match id (one per accepted match) and
//! carries denormalized counters: `chat_rows` tracks the number of messages,
//! `day_pass` the number of distinct days with activity. Counters are bumped
//! under the conversation row lock together with the write they count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{AppError, AppResult, MatchId, UserId};

#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// One conversation per match; the match id doubles as the primary key.
    pub match_id: MatchId,
    pub chat_rows: i32,
    pub day_pass: i32,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A conversation joined with its match row, as listed for one user.
///
/// Carries both participant columns so the caller can resolve the
/// counterpart without a second query.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ConversationListRow {
    pub match_id: MatchId,
    pub chat_rows: i32,
    pub day_pass: i32,
    pub updated_at: DateTime<Utc>,
    pub request_from: UserId,
    pub request_to: UserId,
}

impl Conversation {
    /// Create the conversation for a freshly accepted match.
    ///
    /// Runs inside the same transaction as the accepting transition; the
    /// unique primary key makes a double-create surface as `Conflict`.
    pub async fn create(match_id: MatchId, conn: &mut PgConnection) -> AppResult<Self> {
        let row = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO conversations (match_id, chat_rows, day_pass, version)
            VALUES ($1, 0, 0, 1)
            RETURNING *
            "#,
        )
        .bind(match_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    pub async fn find_by_match_id(match_id: MatchId, pool: &PgPool) -> AppResult<Option<Self>> {
        let row = sqlx::query_as::<_, Self>("SELECT * FROM conversations WHERE match_id = $1")
            .bind(match_id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Load a conversation under a row lock (for counter bumps).
    pub async fn find_by_match_id_for_update(
        match_id: MatchId,
        conn: &mut PgConnection,
    ) -> AppResult<Option<Self>> {
        let row =
            sqlx::query_as::<_, Self>("SELECT * FROM conversations WHERE match_id = $1 FOR UPDATE")
                .bind(match_id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(row)
    }

    /// Record one sent chat: bump `chat_rows`, and `day_pass` when this is
    /// the first activity of a new UTC day.
    ///
    /// Day comparison is done in UTC explicitly; a bare `::date` cast would
    /// truncate in the session's time zone.
    pub async fn record_chat(match_id: MatchId, conn: &mut PgConnection) -> AppResult<Self> {
        let row = sqlx::query_as::<_, Self>(
            r#"
            UPDATE conversations
            SET chat_rows = chat_rows + 1,
                day_pass = day_pass
                    + CASE WHEN chat_rows > 0
                            AND (updated_at AT TIME ZONE 'UTC')::date
                                = (NOW() AT TIME ZONE 'UTC')::date
                           THEN 0 ELSE 1 END,
                version = version + 1,
                updated_at = NOW()
            WHERE match_id = $1
            RETURNING *
            "#,
        )
        .bind(match_id)
        .fetch_optional(&mut *conn)
        .await?;
        row.ok_or(AppError::NotFound("conversation"))
    }

    /// Conversations of accepted matches where `user_id` is a participant,
    /// most recently active first.
    pub async fn list_for_user(
        user_id: UserId,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> AppResult<Vec<ConversationListRow>> {
        let rows = sqlx::query_as::<_, ConversationListRow>(
            r#"
            SELECT c.match_id, c.chat_rows, c.day_pass, c.updated_at,
                   m.request_from, m.request_to
            FROM conversations c
            JOIN matches m ON m.id = c.match_id
            WHERE m.request_status = 'ACCEPTED'
              AND (m.request_from = $1 OR m.request_to = $1)
            ORDER BY c.updated_at DESC, c.match_id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
