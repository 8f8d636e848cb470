use crate::core::models::{EffectiveTransaction, RawTransaction, UserId};
use tracing::warn;

/// Picks, for every raw transaction, the state `viewer_id` should see.
///
/// A draft of the viewer always wins and is shown even if the committed state
/// is deleted. Without a draft only a live committed state is visible.
/// Malformed records are skipped.
pub fn resolve(raw_transactions: &[RawTransaction], viewer_id: UserId) -> Vec<EffectiveTransaction> {
    raw_transactions
        .iter()
        .filter(|raw| match raw.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping transaction: {}", e);
                false
            }
        })
        .filter_map(|raw| effective_state(raw, viewer_id))
        .collect()
}

fn effective_state(raw: &RawTransaction, viewer_id: UserId) -> Option<EffectiveTransaction> {
    if let Some(draft) = raw.draft_of(viewer_id) {
        return Some(EffectiveTransaction {
            id: raw.id,
            kind: raw.kind,
            state: draft.clone(),
            is_wip: true,
            has_committed_changes: raw.committed_state.is_some(),
        });
    }

    match &raw.committed_state {
        Some(committed) if !committed.deleted => Some(EffectiveTransaction {
            id: raw.id,
            kind: raw.kind,
            state: committed.clone(),
            is_wip: false,
            has_committed_changes: true,
        }),
        _ => None,
    }
}
