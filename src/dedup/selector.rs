//! Canonical member selection for duplicate groups.

use super::models::Question;

/// Order group members by keep preference: difficulty rank first, then
/// oldest `created_at`. The sort is stable, so members tied on both keys
/// keep their fetch order. Index 0 becomes the canonical question.
pub fn order_by_keep_preference(mut members: Vec<Question>) -> Vec<Question> {
    members.sort_by(|a, b| {
        a.difficulty
            .keep_rank()
            .cmp(&b.difficulty.keep_rank())
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    members
}
