//! Match model - SQL persistence layer and the lifecycle state machine.
//!
//! Exactly one match row exists per unordered user pair (enforced by a unique
//! index over `LEAST/GREATEST` of the participants). Rows are created in bulk
//! as `UNKNOWN` candidates and mutated once per transition; they are never
//! physically deleted.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{AppError, AppResult, MatchId, UserId};

/// How many candidate rows one generation pass creates at most.
pub const CANDIDATE_BATCH: i64 = 20;

#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// Who initiated the candidate link.
    pub request_from: UserId,
    pub request_to: UserId,
    pub request_status: String,
    pub accepted_at: Option<DateTime<Utc>>,

    // Identity-reveal sub-flow: persisted and surfaced, never interpreted here
    pub reveal_status: Option<String>,
    pub revealed_declined_count: Option<i32>,
    pub revealed_at: Option<DateTime<Utc>>,

    /// Who performed the last status-changing action.
    pub updated_by: Option<UserId>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Match lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Candidate, unacted-upon.
    Unknown,
    /// Liked, awaiting reciprocation.
    Requested,
    Accepted,
    Declined,
}

impl MatchStatus {
    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Accepted | MatchStatus::Declined)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Unknown => write!(f, "UNKNOWN"),
            MatchStatus::Requested => write!(f, "REQUESTED"),
            MatchStatus::Accepted => write!(f, "ACCEPTED"),
            MatchStatus::Declined => write!(f, "DECLINED"),
        }
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "UNKNOWN" => Ok(MatchStatus::Unknown),
            "REQUESTED" => Ok(MatchStatus::Requested),
            "ACCEPTED" => Ok(MatchStatus::Accepted),
            "DECLINED" => Ok(MatchStatus::Declined),
            _ => Err(anyhow!("Invalid match status: {}", s)),
        }
    }
}

/// Resolve which side of a match row is the counterpart of `requester`.
///
/// This is the single source of truth for "self vs other" framing; listing,
/// show, transition, and conversation views all go through it.
pub fn counterpart_of(requester: UserId, from: UserId, to: UserId) -> AppResult<UserId> {
    if requester == from {
        Ok(to)
    } else if requester == to {
        Ok(from)
    } else {
        Err(AppError::Forbidden("not a participant of this match"))
    }
}

impl Match {
    pub fn status(&self) -> AppResult<MatchStatus> {
        self.request_status
            .parse::<MatchStatus>()
            .map_err(AppError::Internal)
    }

    /// The other participant, or `Forbidden` for strangers.
    pub fn counterpart(&self, requester: UserId) -> AppResult<UserId> {
        counterpart_of(requester, self.request_from, self.request_to)
    }

    /// Compute the status a swipe moves this row to.
    ///
    /// Pure validation; the caller applies the result under a row lock.
    ///
    /// # Errors
    ///
    /// `Forbidden` when the requester is not a participant, the row is in a
    /// terminal state, or the requester tries to reciprocate their own
    /// request.
    pub fn next_status(&self, requester: UserId, swipe: bool) -> AppResult<MatchStatus> {
        self.counterpart(requester)?;

        let current = self.status()?;
        if current.is_terminal() {
            return Err(AppError::Forbidden("match is already settled"));
        }

        if !swipe {
            return Ok(MatchStatus::Declined);
        }

        match current {
            MatchStatus::Unknown => Ok(MatchStatus::Requested),
            MatchStatus::Requested => {
                // The requesting side cannot approve its own request.
                if self.updated_by == Some(requester) {
                    Err(AppError::Forbidden("awaiting response from the other side"))
                } else {
                    Ok(MatchStatus::Accepted)
                }
            }
            MatchStatus::Accepted | MatchStatus::Declined => unreachable!("terminal checked above"),
        }
    }

    /// Visibility rule for single-match views.
    ///
    /// A requester never sees `UNKNOWN` or `DECLINED` rows, and cannot see a
    /// `REQUESTED` row they put into that state themselves.
    pub fn ensure_visible_to(&self, requester: UserId) -> AppResult<()> {
        self.counterpart(requester)?;
        match self.status()? {
            MatchStatus::Unknown | MatchStatus::Declined => {
                Err(AppError::Forbidden("match is not viewable"))
            }
            MatchStatus::Requested if self.updated_by == Some(requester) => {
                Err(AppError::Forbidden("awaiting response from the other side"))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Find match by ID
    pub async fn find_by_id(id: MatchId, pool: &PgPool) -> AppResult<Option<Self>> {
        let row = sqlx::query_as::<_, Self>("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Load a match under a row-level exclusive lock.
    ///
    /// Must run inside a transaction; the lock is released on commit or
    /// rollback. Contending transitions block here rather than failing fast.
    pub async fn find_by_id_for_update(
        id: MatchId,
        conn: &mut PgConnection,
    ) -> AppResult<Option<Self>> {
        let row = sqlx::query_as::<_, Self>("SELECT * FROM matches WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Matches in `status` where `user_id` is on either side, newest first.
    pub async fn list_by_status(
        user_id: UserId,
        status: MatchStatus,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> AppResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM matches
            WHERE (request_from = $1 OR request_to = $1)
              AND request_status = $2
            ORDER BY updated_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Bulk-insert `UNKNOWN` candidate rows from `from` to each of `to_ids`.
    ///
    /// # Errors
    ///
    /// `Internal` if the insert does not affect exactly `to_ids.len()` rows —
    /// a write-conflict/partial-failure condition that must abort the
    /// enclosing transaction, never be retried silently. A concurrent insert
    /// of the same pair trips the unique pair index and surfaces as
    /// `Conflict`.
    pub async fn insert_candidates(
        from: UserId,
        to_ids: &[UserId],
        conn: &mut PgConnection,
    ) -> AppResult<Vec<Self>> {
        let ids: Vec<MatchId> = to_ids.iter().map(|_| MatchId::new()).collect();

        let rows = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO matches (id, request_from, request_to, request_status, version)
            SELECT t.id, $1, t.to_id, 'UNKNOWN', 1
            FROM UNNEST($2::uuid[], $3::uuid[]) AS t(id, to_id)
            RETURNING *
            "#,
        )
        .bind(from)
        .bind(&ids)
        .bind(to_ids)
        .fetch_all(&mut *conn)
        .await?;

        if rows.len() != to_ids.len() {
            return Err(AppError::Internal(anyhow!(
                "candidate bulk insert affected {} rows, expected {}",
                rows.len(),
                to_ids.len()
            )));
        }
        Ok(rows)
    }

    /// Apply a validated transition under the row lock already held.
    ///
    /// Increments `version` and records `updated_by`; stamps `accepted_at`
    /// on the move to `ACCEPTED`. The `version` guard backs up the row lock:
    /// a mismatch means the invariants were violated and the transaction must
    /// abort.
    pub async fn apply_transition(
        id: MatchId,
        next: MatchStatus,
        updated_by: UserId,
        expected_version: i32,
        conn: &mut PgConnection,
    ) -> AppResult<Self> {
        let updated = sqlx::query_as::<_, Self>(
            r#"
            UPDATE matches
            SET request_status = $2,
                updated_by = $3,
                accepted_at = CASE WHEN $2 = 'ACCEPTED' THEN NOW() ELSE accepted_at END,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next.to_string())
        .bind(updated_by)
        .bind(expected_version)
        .fetch_optional(&mut *conn)
        .await?;

        updated.ok_or_else(|| {
            AppError::Internal(anyhow!(
                "match {} transition affected 0 rows at version {}",
                id,
                expected_version
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(from: UserId, to: UserId, status: MatchStatus, updated_by: Option<UserId>) -> Match {
        Match {
            id: MatchId::new(),
            request_from: from,
            request_to: to,
            request_status: status.to_string(),
            accepted_at: None,
            reveal_status: None,
            revealed_declined_count: None,
            revealed_at: None,
            updated_by,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            MatchStatus::Unknown,
            MatchStatus::Requested,
            MatchStatus::Accepted,
            MatchStatus::Declined,
        ] {
            assert_eq!(status.to_string().parse::<MatchStatus>().unwrap(), status);
        }
        assert!("SWIPED".parse::<MatchStatus>().is_err());
    }

    #[test]
    fn test_counterpart_resolution() {
        let a = UserId::new();
        let b = UserId::new();
        let stranger = UserId::new();
        let m = row(a, b, MatchStatus::Unknown, None);

        assert_eq!(m.counterpart(a).unwrap(), b);
        assert_eq!(m.counterpart(b).unwrap(), a);
        assert!(matches!(
            m.counterpart(stranger),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_swipe_moves_unknown_to_requested() {
        let a = UserId::new();
        let b = UserId::new();
        let m = row(a, b, MatchStatus::Unknown, None);
        assert_eq!(m.next_status(a, true).unwrap(), MatchStatus::Requested);
        assert_eq!(m.next_status(b, true).unwrap(), MatchStatus::Requested);
    }

    #[test]
    fn test_counterpart_swipe_accepts() {
        let a = UserId::new();
        let b = UserId::new();
        let m = row(a, b, MatchStatus::Requested, Some(a));
        assert_eq!(m.next_status(b, true).unwrap(), MatchStatus::Accepted);
    }

    #[test]
    fn test_self_reciprocation_is_forbidden() {
        let a = UserId::new();
        let b = UserId::new();
        // A already put the row into REQUESTED; a second identical swipe from
        // A must be rejected, never silently re-applied.
        let m = row(a, b, MatchStatus::Requested, Some(a));
        assert!(matches!(m.next_status(a, true), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_decline_from_any_non_terminal_state() {
        let a = UserId::new();
        let b = UserId::new();
        let m = row(a, b, MatchStatus::Unknown, None);
        assert_eq!(m.next_status(b, false).unwrap(), MatchStatus::Declined);

        let m = row(a, b, MatchStatus::Requested, Some(a));
        assert_eq!(m.next_status(a, false).unwrap(), MatchStatus::Declined);
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        let a = UserId::new();
        let b = UserId::new();
        for status in [MatchStatus::Accepted, MatchStatus::Declined] {
            let m = row(a, b, status, Some(a));
            for swipe in [true, false] {
                assert!(matches!(
                    m.next_status(b, swipe),
                    Err(AppError::Forbidden(_))
                ));
            }
        }
    }

    #[test]
    fn test_stranger_cannot_transition() {
        let m = row(UserId::new(), UserId::new(), MatchStatus::Unknown, None);
        assert!(matches!(
            m.next_status(UserId::new(), true),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_visibility_rules() {
        let a = UserId::new();
        let b = UserId::new();

        // UNKNOWN and DECLINED are never viewable.
        for status in [MatchStatus::Unknown, MatchStatus::Declined] {
            let m = row(a, b, status, None);
            assert!(m.ensure_visible_to(a).is_err());
            assert!(m.ensure_visible_to(b).is_err());
        }

        // REQUESTED is hidden from the actor who requested it.
        let m = row(a, b, MatchStatus::Requested, Some(a));
        assert!(m.ensure_visible_to(a).is_err());
        assert!(m.ensure_visible_to(b).is_ok());

        // ACCEPTED is visible to both sides, never to strangers.
        let m = row(a, b, MatchStatus::Accepted, Some(b));
        assert!(m.ensure_visible_to(a).is_ok());
        assert!(m.ensure_visible_to(b).is_ok());
        assert!(m.ensure_visible_to(UserId::new()).is_err());
    }
}
