//! Conversation read views: the conversation list and chat history windows.

use std::collections::HashMap;

use crate::common::{
    assemble_window, AppError, AppResult, CursorArgs, MatchId, UserId, Window, WindowDirection,
};
use crate::domains::conversations::data::{ChatData, ConversationData, ConversationUserData};
use crate::domains::conversations::models::{Chat, Conversation};
use crate::domains::matching::models::{counterpart_of, Match};
use crate::domains::profiles::actions::resolve_urls;
use crate::domains::profiles::models::ProfilePicture;
use crate::kernel::ServerDeps;

/// One window of a conversation's chat history, oldest-first.
///
/// Cursor arguments are validated and decoded before any storage access; a
/// malformed cursor never reaches the database.
pub async fn list_chats(
    requester: UserId,
    match_id: MatchId,
    args: &CursorArgs,
    deps: &ServerDeps,
) -> AppResult<Window<ChatData>> {
    let validated = args.validate()?;

    let m = Match::find_by_id(match_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("match"))?;
    m.counterpart(requester)?;
    Conversation::find_by_match_id(match_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("conversation"))?;

    let rows = match validated.direction {
        WindowDirection::Forward => {
            Chat::window_after(
                match_id,
                validated.cursor.as_ref(),
                validated.fetch_limit(),
                &deps.db_pool,
            )
            .await?
        }
        WindowDirection::Backward => {
            // Backward travel always carries a cursor (validate guarantees it).
            let cursor = validated.cursor.as_ref().ok_or_else(AppError::invalid_cursor)?;
            Chat::window_before(match_id, cursor, validated.fetch_limit(), &deps.db_pool).await?
        }
    };

    let window = assemble_window(rows, &validated, Chat::cursor);
    Ok(map_window(window))
}

fn map_window(window: Window<Chat>) -> Window<ChatData> {
    Window {
        items: window.items.iter().map(ChatData::from_chat).collect(),
        has_next: window.has_next,
        has_prev: window.has_prev,
        next: window.next,
        prev: window.prev,
    }
}

/// A user's conversations, most recently active first.
///
/// Each row carries the counterpart's selected picture (resolved to a URL)
/// and a snapshot of the newest chat.
pub async fn list_conversations(
    requester: UserId,
    page: i64,
    limit: i64,
    deps: &ServerDeps,
) -> AppResult<Vec<ConversationData>> {
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
    let rows = Conversation::list_for_user(requester, limit, offset, &deps.db_pool).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let counterparts: Vec<UserId> = rows
        .iter()
        .map(|r| counterpart_of(requester, r.request_from, r.request_to))
        .collect::<AppResult<_>>()?;
    let conversation_ids: Vec<MatchId> = rows.iter().map(|r| r.match_id).collect();

    let pictures = ProfilePicture::selected_with_files(&counterparts, &deps.db_pool).await?;
    let urls = resolve_urls(
        pictures.iter().map(|p| p.blob_link.clone()),
        deps.presign_ttl,
        deps.blob_store.as_ref(),
    )
    .await?;
    let picture_by_user: HashMap<UserId, &str> = pictures
        .iter()
        .map(|p| (p.user_id, p.blob_link.as_str()))
        .collect();

    let last_by_conversation: HashMap<MatchId, Chat> =
        Chat::last_chats(&conversation_ids, &deps.db_pool)
            .await?
            .into_iter()
            .map(|c| (c.conversation_id, c))
            .collect();

    Ok(rows
        .iter()
        .zip(&counterparts)
        .map(|(row, counterpart)| {
            let picture_url = picture_by_user
                .get(counterpart)
                .and_then(|key| urls.get(*key))
                .cloned();
            ConversationData {
                match_id: row.match_id.to_string(),
                counterpart: ConversationUserData {
                    user_id: counterpart.to_string(),
                    picture_url,
                },
                last_chat: last_by_conversation
                    .get(&row.match_id)
                    .map(ChatData::from_chat),
                chat_rows: row.chat_rows,
                day_pass: row.day_pass,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChatId;
    use chrono::Utc;

    fn chat(message: &str) -> Chat {
        Chat {
            id: ChatId::new(),
            conversation_id: MatchId::new(),
            author: UserId::new(),
            message: message.into(),
            reply_to: None,
            sent_at: Utc::now(),
            seen_at: None,
            version: 1,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_map_window_preserves_flags_and_order() {
        let chats = vec![chat("first"), chat("second")];
        let window = Window {
            items: chats.clone(),
            has_next: true,
            has_prev: false,
            next: Some("cursor".into()),
            prev: None,
        };

        let mapped = map_window(window);
        assert_eq!(mapped.items.len(), 2);
        assert_eq!(mapped.items[0].message, "first");
        assert_eq!(mapped.items[0].id, chats[0].id.to_string());
        assert!(mapped.has_next);
        assert!(!mapped.has_prev);
        assert_eq!(mapped.next.as_deref(), Some("cursor"));
    }

    #[test]
    fn test_chat_data_carries_reply_and_seen() {
        let mut c = chat("hello");
        let parent = ChatId::new();
        c.reply_to = Some(parent);
        c.seen_at = Some(Utc::now());

        let data = ChatData::from_chat(&c);
        assert_eq!(data.reply_to, Some(parent.to_string()));
        assert!(data.seen_at.is_some());
    }
}
