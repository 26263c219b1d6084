//! Cursor-based pagination for chat windows.
//!
//! A cursor points at the boundary chat of a page: it encodes the chat's id
//! and `sent_at` timestamp as base64 over `"{uuid}-{rfc3339}"`. Decoding is
//! strict — malformed base64, a malformed uuid, or an unparsable date all
//! yield the distinct "invalid cursor format" error.
//!
//! A request carries at most one of `next`/`prev`. Windows are fetched with
//! `limit + 1` rows to learn whether more data exists in the requested
//! direction, and the page is always returned oldest-first regardless of the
//! direction traveled.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::errors::{AppError, AppResult};

// UUIDs render as 36 hyphenated ASCII characters.
const UUID_LEN: usize = 36;

/// Default page size when the caller does not specify one.
pub const DEFAULT_CHAT_LIMIT: i64 = 20;

/// Upper bound on a single window.
pub const MAX_CHAT_LIMIT: i64 = 100;

// ============================================================================
// Cursor
// ============================================================================

/// Boundary position of a page: the id and sent-at date of the edge chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatCursor {
    pub id: Uuid,
    pub date: DateTime<Utc>,
}

impl ChatCursor {
    pub fn new(id: Uuid, date: DateTime<Utc>) -> Self {
        Self { id, date }
    }

    /// Encode as an opaque base64 string.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}-{}",
            self.id,
            self.date.to_rfc3339_opts(SecondsFormat::Micros, true)
        );
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    /// Decode an opaque cursor string.
    ///
    /// # Errors
    ///
    /// Returns the "invalid cursor format" validation error for anything that
    /// is not base64 over `"{uuid}-{rfc3339}"`.
    pub fn decode(s: &str) -> AppResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|_| AppError::invalid_cursor())?;
        let raw = String::from_utf8(bytes).map_err(|_| AppError::invalid_cursor())?;

        // "{uuid}-{rfc3339}": the uuid occupies a fixed 36-char prefix.
        if raw.len() < UUID_LEN + 2 || !raw.is_char_boundary(UUID_LEN) {
            return Err(AppError::invalid_cursor());
        }
        let (id_part, rest) = raw.split_at(UUID_LEN);
        let date_part = rest
            .strip_prefix('-')
            .ok_or_else(AppError::invalid_cursor)?;

        let id = Uuid::parse_str(id_part).map_err(|_| AppError::invalid_cursor())?;
        let date = DateTime::parse_from_rfc3339(date_part)
            .map_err(|_| AppError::invalid_cursor())?
            .with_timezone(&Utc);

        Ok(Self { id, date })
    }
}

// ============================================================================
// Window arguments
// ============================================================================

/// Direction a window is traveled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDirection {
    /// Chats strictly after the cursor (or from the start when no cursor).
    Forward,
    /// Chats strictly before the cursor.
    Backward,
}

/// Raw pagination input as it arrives from the caller.
#[derive(Debug, Clone, Default)]
pub struct CursorArgs {
    pub limit: Option<i64>,
    /// Opaque cursor: return chats after this position.
    pub next: Option<String>,
    /// Opaque cursor: return chats before this position.
    pub prev: Option<String>,
}

impl CursorArgs {
    /// Validate and decode. Runs before any storage access.
    ///
    /// # Errors
    ///
    /// `Validation` when both `next` and `prev` are supplied, or when either
    /// cursor fails strict decoding.
    pub fn validate(&self) -> AppResult<ValidatedCursorArgs> {
        if self.next.is_some() && self.prev.is_some() {
            return Err(AppError::validation(
                "next and prev are mutually exclusive",
            ));
        }

        let limit = self.limit.unwrap_or(DEFAULT_CHAT_LIMIT).clamp(1, MAX_CHAT_LIMIT);

        let (direction, cursor_str) = match (&self.next, &self.prev) {
            (_, Some(prev)) => (WindowDirection::Backward, Some(prev)),
            (next, None) => (WindowDirection::Forward, next.as_ref()),
        };

        let cursor = cursor_str.map(|c| ChatCursor::decode(c)).transpose()?;

        Ok(ValidatedCursorArgs {
            limit,
            cursor,
            direction,
        })
    }
}

/// Validated and decoded pagination arguments.
#[derive(Debug, Clone)]
pub struct ValidatedCursorArgs {
    pub limit: i64,
    pub cursor: Option<ChatCursor>,
    pub direction: WindowDirection,
}

impl ValidatedCursorArgs {
    /// SQL LIMIT value: one extra row to detect more data in this direction.
    pub fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }
}

// ============================================================================
// Window assembly
// ============================================================================

/// One page of chats with its boundary cursors.
#[derive(Debug, Clone)]
pub struct Window<T> {
    /// Page items, always oldest-first.
    pub items: Vec<T>,
    pub has_next: bool,
    pub has_prev: bool,
    /// Cursor of the last returned item; present only when `has_next`.
    pub next: Option<String>,
    /// Cursor of the first returned item; present only when `has_prev`.
    pub prev: Option<String>,
}

/// Assemble a page from `limit + 1` fetched rows.
///
/// `rows` must arrive in query order: ascending for forward windows,
/// descending for backward windows (the backward page is flipped back to
/// ascending here). The flag for the traveled direction comes from the extra
/// row; the flag for the opposite direction is implied by having followed a
/// cursor to get here.
pub fn assemble_window<T>(
    mut rows: Vec<T>,
    args: &ValidatedCursorArgs,
    cursor_of: impl Fn(&T) -> ChatCursor,
) -> Window<T> {
    let has_more = rows.len() as i64 > args.limit;
    if has_more {
        rows.truncate(args.limit as usize);
    }

    let (has_next, has_prev) = match args.direction {
        WindowDirection::Forward => (has_more, args.cursor.is_some()),
        WindowDirection::Backward => (args.cursor.is_some(), has_more),
    };

    if args.direction == WindowDirection::Backward {
        rows.reverse();
    }

    let next = if has_next {
        rows.last().map(|r| cursor_of(r).encode())
    } else {
        None
    };
    let prev = if has_prev {
        rows.first().map(|r| cursor_of(r).encode())
    } else {
        None
    };

    Window {
        items: rows,
        has_next,
        has_prev,
        next,
        prev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cursor_at(secs: i64) -> ChatCursor {
        ChatCursor::new(Uuid::new_v4(), Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn test_cursor_roundtrip() {
        let cursor = ChatCursor::new(
            Uuid::new_v4(),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap(),
        );
        let decoded = ChatCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        let err = ChatCursor::decode("%%% not base64 %%%").unwrap_err();
        assert_eq!(err.to_string(), "invalid cursor format");
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        // Valid base64, but not "{uuid}-{rfc3339}"
        let encoded = URL_SAFE_NO_PAD.encode("hello world");
        let err = ChatCursor::decode(&encoded).unwrap_err();
        assert_eq!(err.to_string(), "invalid cursor format");
    }

    #[test]
    fn test_decode_rejects_bad_date() {
        let raw = format!("{}-not-a-date", Uuid::new_v4());
        let encoded = URL_SAFE_NO_PAD.encode(raw.as_bytes());
        let err = ChatCursor::decode(&encoded).unwrap_err();
        assert_eq!(err.to_string(), "invalid cursor format");
    }

    #[test]
    fn test_decode_rejects_bad_uuid() {
        let raw = format!(
            "{}-{}",
            "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz",
            Utc::now().to_rfc3339()
        );
        let encoded = URL_SAFE_NO_PAD.encode(raw.as_bytes());
        assert!(ChatCursor::decode(&encoded).is_err());
    }

    #[test]
    fn test_next_and_prev_are_mutually_exclusive() {
        let args = CursorArgs {
            limit: Some(10),
            next: Some(cursor_at(1).encode()),
            prev: Some(cursor_at(2).encode()),
        };
        assert!(matches!(
            args.validate(),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_validate_defaults_and_clamps() {
        let args = CursorArgs::default().validate().unwrap();
        assert_eq!(args.limit, DEFAULT_CHAT_LIMIT);
        assert!(args.cursor.is_none());
        assert_eq!(args.direction, WindowDirection::Forward);

        let args = CursorArgs {
            limit: Some(10_000),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(args.limit, MAX_CHAT_LIMIT);
    }

    #[test]
    fn test_validate_decodes_direction() {
        let prev = cursor_at(5);
        let args = CursorArgs {
            limit: Some(3),
            next: None,
            prev: Some(prev.encode()),
        }
        .validate()
        .unwrap();
        assert_eq!(args.direction, WindowDirection::Backward);
        assert_eq!(args.cursor, Some(prev));
        assert_eq!(args.fetch_limit(), 4);
    }

    // Scenario from the chat listing contract: 3 chats at t1 < t2 < t3,
    // limit 2. First call returns [t1, t2] with a next cursor at t2;
    // following it returns [t3] with has_next=false.
    #[test]
    fn test_forward_window_sequence() {
        let chats: Vec<ChatCursor> = (1..=3).map(cursor_at).collect();

        let args = CursorArgs {
            limit: Some(2),
            ..Default::default()
        }
        .validate()
        .unwrap();
        // Storage fetches limit+1 ascending rows from the start.
        let fetched = chats.clone();
        let window = assemble_window(fetched, &args, |c| *c);
        assert_eq!(window.items, vec![chats[0], chats[1]]);
        assert!(window.has_next);
        assert!(!window.has_prev);
        let next = window.next.expect("next cursor emitted");
        assert_eq!(ChatCursor::decode(&next).unwrap(), chats[1]);
        assert!(window.prev.is_none());

        // Follow the next cursor: only t3 remains.
        let args = CursorArgs {
            limit: Some(2),
            next: Some(next),
            prev: None,
        }
        .validate()
        .unwrap();
        let fetched = vec![chats[2]];
        let window = assemble_window(fetched, &args, |c| *c);
        assert_eq!(window.items, vec![chats[2]]);
        assert!(!window.has_next);
        assert!(window.has_prev);
        assert!(window.next.is_none());
        let prev = window.prev.expect("prev cursor emitted");
        assert_eq!(ChatCursor::decode(&prev).unwrap(), chats[2]);
    }

    #[test]
    fn test_backward_window_returns_oldest_first() {
        // Rows arrive descending from storage for backward windows.
        let args = CursorArgs {
            limit: Some(2),
            next: None,
            prev: Some(cursor_at(9).encode()),
        }
        .validate()
        .unwrap();
        let fetched = vec![cursor_at(8), cursor_at(7), cursor_at(6)];
        let window = assemble_window(fetched.clone(), &args, |c| *c);
        // Flipped back to ascending for display.
        assert_eq!(window.items, vec![fetched[1], fetched[0]]);
        assert!(window.has_prev);
        assert!(window.has_next);
    }

    #[test]
    fn test_exact_fit_has_no_more() {
        let args = CursorArgs {
            limit: Some(3),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let fetched = vec![cursor_at(1), cursor_at(2), cursor_at(3)];
        let window = assemble_window(fetched, &args, |c| *c);
        assert_eq!(window.items.len(), 3);
        assert!(!window.has_next);
        assert!(window.next.is_none());
    }
}
