//! Chat model - SQL persistence layer and keyset windows.
//!
//! Chat history is ordered by the composite key `(sent_at, id)`; ids are
//! time-ordered UUIDs, so the pair is a total order that survives equal
//! timestamps. Window queries are pure keyset comparisons against that pair
//! and never use OFFSET.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{AppResult, ChatCursor, ChatId, MatchId, UserId};

#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    /// Conversations are keyed by match id.
    pub conversation_id: MatchId,
    pub author: UserId,
    pub message: String,
    /// Optional threading: the chat this one replies to.
    pub reply_to: Option<ChatId>,
    pub sent_at: DateTime<Utc>,
    pub seen_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// This chat's position in the conversation ordering.
    pub fn cursor(&self) -> ChatCursor {
        ChatCursor::new(self.id.into_uuid(), self.sent_at)
    }

    pub async fn find_by_id(id: ChatId, pool: &PgPool) -> AppResult<Option<Self>> {
        let row = sqlx::query_as::<_, Self>("SELECT * FROM chats WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Append one chat to a conversation.
    pub async fn insert(
        conversation_id: MatchId,
        author: UserId,
        message: &str,
        reply_to: Option<ChatId>,
        conn: &mut PgConnection,
    ) -> AppResult<Self> {
        let row = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO chats (id, conversation_id, author, message, reply_to, sent_at, version)
            VALUES ($1, $2, $3, $4, $5, NOW(), 1)
            RETURNING *
            "#,
        )
        .bind(ChatId::new())
        .bind(conversation_id)
        .bind(author)
        .bind(message)
        .bind(reply_to)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Chats strictly after `cursor` (or from the start), ascending.
    ///
    /// `fetch_limit` already includes the extra row for has-more detection.
    pub async fn window_after(
        conversation_id: MatchId,
        cursor: Option<&ChatCursor>,
        fetch_limit: i64,
        pool: &PgPool,
    ) -> AppResult<Vec<Self>> {
        let rows = match cursor {
            Some(cursor) => {
                sqlx::query_as::<_, Self>(
                    r#"
                    SELECT * FROM chats
                    WHERE conversation_id = $1
                      AND (sent_at, id) > ($2, $3)
                    ORDER BY sent_at ASC, id ASC
                    LIMIT $4
                    "#,
                )
                .bind(conversation_id)
                .bind(cursor.date)
                .bind(cursor.id)
                .bind(fetch_limit)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Self>(
                    r#"
                    SELECT * FROM chats
                    WHERE conversation_id = $1
                    ORDER BY sent_at ASC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(conversation_id)
                .bind(fetch_limit)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Chats strictly before `cursor`, descending (caller flips the page).
    pub async fn window_before(
        conversation_id: MatchId,
        cursor: &ChatCursor,
        fetch_limit: i64,
        pool: &PgPool,
    ) -> AppResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM chats
            WHERE conversation_id = $1
              AND (sent_at, id) < ($2, $3)
            ORDER BY sent_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(conversation_id)
        .bind(cursor.date)
        .bind(cursor.id)
        .bind(fetch_limit)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// The newest chat of each listed conversation, one row per conversation.
    pub async fn last_chats(
        conversation_ids: &[MatchId],
        pool: &PgPool,
    ) -> AppResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT DISTINCT ON (conversation_id) *
            FROM chats
            WHERE conversation_id = ANY($1)
            ORDER BY conversation_id, sent_at DESC, id DESC
            "#,
        )
        .bind(conversation_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
