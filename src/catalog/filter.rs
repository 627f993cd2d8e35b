use super::model::Track;

/// Indices of the tracks whose title or mood contains `query`
/// (case-insensitive). A blank query keeps every track, in order.
pub fn filter_indices(tracks: &[Track], query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return (0..tracks.len()).collect();
    }

    tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.title.to_lowercase().contains(&query) || t.mood.to_lowercase().contains(&query)
        })
        .map(|(i, _)| i)
        .collect()
}
