//! Swipe handling: validated status transitions under a row lock.

use tracing::info;

use crate::common::{AppError, AppResult, MatchId, UserId};
use crate::domains::conversations::models::Conversation;
use crate::domains::matching::models::{Match, MatchStatus};
use crate::kernel::ServerDeps;

/// Apply one swipe to a match.
///
/// Loads the row under `FOR UPDATE`, validates the transition against the
/// current state, and writes the new status. The move to `ACCEPTED` also
/// creates the pair's conversation in the same transaction, so an accepted
/// match without a conversation can never be observed.
pub async fn transition(
    requester: UserId,
    match_id: MatchId,
    swipe: bool,
    deps: &ServerDeps,
) -> AppResult<Match> {
    let mut tx = deps.db_pool.begin().await?;

    let current = Match::find_by_id_for_update(match_id, &mut tx)
        .await?
        .ok_or(AppError::NotFound("match"))?;

    let next = current.next_status(requester, swipe)?;
    let updated = Match::apply_transition(match_id, next, requester, current.version, &mut tx).await?;

    if next == MatchStatus::Accepted {
        Conversation::create(match_id, &mut tx).await?;
    }

    tx.commit().await?;

    info!(
        match_id = %match_id,
        user_id = %requester,
        from = %current.request_status,
        to = %next,
        "Match transitioned"
    );
    Ok(updated)
}
