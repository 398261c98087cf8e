use std::collections::HashMap;

use crate::records::PlaylistItem;

/// Assign `recency_rank` within each `channel_id`: newest `published_at` is 1.
///
/// Ties keep their first-seen order, so ranks within a channel are always
/// `1..=n` with no gaps or repeats.
pub fn assign_recency_rank(items: &mut [PlaylistItem]) {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        groups.entry(item.channel_id.as_str()).or_default().push(idx);
    }

    let mut ranks = vec![0_u32; items.len()];
    for mut indices in groups.into_values() {
        // Stable sort: equal timestamps stay in first-seen order.
        indices.sort_by(|&a, &b| items[b].published_at.cmp(&items[a].published_at));
        for (position, idx) in indices.into_iter().enumerate() {
            ranks[idx] = u32::try_from(position + 1).unwrap_or(u32::MAX);
        }
    }

    for (item, rank) in items.iter_mut().zip(ranks) {
        item.recency_rank = rank;
    }
}

/// IDs of the rank-1 video of every channel, in table order.
#[must_use]
pub fn latest_video_ids(items: &[PlaylistItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.recency_rank == 1)
        .map(|item| item.video_id.clone())
        .collect()
}
