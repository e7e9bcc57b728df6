use crossterm::event::KeyCode;
use std::collections::VecDeque;

/// Up Up Down Down Left Right Left Right B A.
pub const ADMIN_UNLOCK_SEQUENCE: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Char('b'),
    KeyCode::Char('a'),
];

/// Watches a rolling window of recent key presses for one fixed sequence.
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    sequence: Vec<KeyCode>,
    recent: VecDeque<KeyCode>,
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new(&ADMIN_UNLOCK_SEQUENCE)
    }
}

impl SequenceTracker {
    pub fn new(sequence: &[KeyCode]) -> Self {
        Self {
            sequence: sequence.to_vec(),
            recent: VecDeque::with_capacity(sequence.len()),
        }
    }

    /// Record a key press. Returns true when it completes the sequence; the
    /// window is cleared afterwards.
    pub fn push(&mut self, key: KeyCode) -> bool {
        if self.sequence.is_empty() {
            return false;
        }
        let key = match key {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        if self.recent.len() == self.sequence.len() {
            self.recent.pop_front();
        }
        self.recent.push_back(key);

        if self.recent.iter().eq(self.sequence.iter()) {
            self.recent.clear();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut SequenceTracker, keys: &[KeyCode]) -> Vec<bool> {
        keys.iter().map(|k| tracker.push(*k)).collect()
    }

    #[test]
    fn full_sequence_unlocks_on_the_last_key() {
        let mut tracker = SequenceTracker::default();
        let results = feed(&mut tracker, &ADMIN_UNLOCK_SEQUENCE);
        assert_eq!(results.iter().filter(|r| **r).count(), 1);
        assert!(results[results.len() - 1]);
        assert_eq!(tracker.recent.len(), 0);
    }

    #[test]
    fn noise_before_the_sequence_is_ignored() {
        let mut tracker = SequenceTracker::default();
        feed(&mut tracker, &[KeyCode::Char('x'), KeyCode::Enter, KeyCode::Up]);
        let results = feed(&mut tracker, &ADMIN_UNLOCK_SEQUENCE);
        assert!(*results.last().unwrap());
    }

    #[test]
    fn buffer_is_capped_at_sequence_length() {
        let mut tracker = SequenceTracker::default();
        for _ in 0..50 {
            tracker.push(KeyCode::Char('z'));
        }
        assert_eq!(tracker.recent.len(), ADMIN_UNLOCK_SEQUENCE.len());
    }

    #[test]
    fn interrupted_sequence_does_not_unlock() {
        let mut tracker = SequenceTracker::default();
        let mut keys = ADMIN_UNLOCK_SEQUENCE.to_vec();
        keys.insert(5, KeyCode::Char('q'));
        assert!(feed(&mut tracker, &keys).iter().all(|r| !r));
    }

    #[test]
    fn uppercase_letters_count() {
        let mut tracker = SequenceTracker::new(&[KeyCode::Char('b'), KeyCode::Char('a')]);
        assert!(!tracker.push(KeyCode::Char('B')));
        assert!(tracker.push(KeyCode::Char('A')));
    }
}
