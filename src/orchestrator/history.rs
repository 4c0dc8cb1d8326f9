//! Bounded per-entity score history.

/// Append `entry`, dropping the oldest entries beyond `capacity`.
pub fn push_bounded<T>(history: &mut Vec<T>, entry: T, capacity: usize) {
    history.push(entry);
    if history.len() > capacity {
        let excess = history.len() - capacity;
        history.drain(..excess);
    }
}

/// The newest `window` entries, oldest first.
pub fn recent<T>(history: &[T], window: usize) -> &[T] {
    &history[history.len().saturating_sub(window)..]
}
