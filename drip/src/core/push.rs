//! Push policy: when accumulated commits are sent to the remote.

use crate::config::PushMode;

/// Decide whether to push immediately after a commit, given the number of
/// commits pending since the last push (the just-made commit included).
pub fn push_due(mode: PushMode, batch_size: u32, pending: u32) -> bool {
    match mode {
        PushMode::Every => true,
        PushMode::Batch => pending >= batch_size,
        PushMode::End => false,
    }
}

/// Decide whether a final push is needed once the loop has finished.
///
/// `batch` pushes any remainder; `end` pushes its single accumulated batch.
pub fn final_push_due(mode: PushMode, pending: u32) -> bool {
    match mode {
        PushMode::Every => false,
        PushMode::Batch | PushMode::End => pending > 0,
    }
}
