//! Sending chats.

use tracing::info;

use crate::common::{AppError, AppResult, ChatId, FieldErrors, MatchId, UserId};
use crate::domains::conversations::models::{Chat, Conversation};
use crate::domains::matching::models::{Match, MatchStatus};
use crate::kernel::ServerDeps;

/// Longest accepted chat message, in characters.
pub const MAX_CHAT_MESSAGE: usize = 2000;

/// Append one chat to an accepted match's conversation.
///
/// The conversation row is locked for the duration of the write so the
/// message counters stay consistent with the inserted row.
pub async fn create_chat(
    requester: UserId,
    match_id: MatchId,
    message: &str,
    reply_to: Option<ChatId>,
    deps: &ServerDeps,
) -> AppResult<Chat> {
    validate_message(message)?;

    let m = Match::find_by_id(match_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("match"))?;
    m.counterpart(requester)?;
    if m.status()? != MatchStatus::Accepted {
        return Err(AppError::Forbidden("conversation is not open"));
    }

    let mut tx = deps.db_pool.begin().await?;

    Conversation::find_by_match_id_for_update(match_id, &mut tx)
        .await?
        .ok_or(AppError::NotFound("conversation"))?;

    if let Some(parent_id) = reply_to {
        let parent = Chat::find_by_id(parent_id, &deps.db_pool)
            .await?
            .ok_or(AppError::NotFound("chat"))?;
        if parent.conversation_id != match_id {
            let mut fields = FieldErrors::new();
            fields.insert(
                "reply_to".to_string(),
                vec!["replied-to chat belongs to another conversation".to_string()],
            );
            return Err(AppError::unprocessable("invalid reply target", fields));
        }
    }

    let chat = Chat::insert(match_id, requester, message, reply_to, &mut tx).await?;
    Conversation::record_chat(match_id, &mut tx).await?;
    tx.commit().await?;

    info!(match_id = %match_id, chat_id = %chat.id, "Chat sent");
    Ok(chat)
}

fn validate_message(message: &str) -> AppResult<()> {
    if message.trim().is_empty() {
        return Err(AppError::validation_field(
            "message must not be blank",
            "message",
        ));
    }
    if message.chars().count() > MAX_CHAT_MESSAGE {
        return Err(AppError::validation_field(
            "message is too long",
            "message",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_message_rejected() {
        assert!(validate_message("").is_err());
        assert!(validate_message("   \n").is_err());
    }

    #[test]
    fn test_overlong_message_rejected() {
        let long = "a".repeat(MAX_CHAT_MESSAGE + 1);
        assert!(validate_message(&long).is_err());
    }

    #[test]
    fn test_normal_message_passes() {
        assert!(validate_message("hey, how was your day?").is_ok());
        let at_limit = "a".repeat(MAX_CHAT_MESSAGE);
        assert!(validate_message(&at_limit).is_ok());
    }
}
