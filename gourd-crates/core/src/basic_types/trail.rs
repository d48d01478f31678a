use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::gourd_assert_simple;

/// The undo log of the [`Store`](crate::engine::Store).
///
/// The store pushes a record for every domain it narrows and every constraint it retires. The
/// records pushed while level `i` is the current level belong to level `i`. Removing a level
/// returns its records and those of all deeper levels, so the store can undo them newest first.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    /// `level_starts[i]` is the length of the log when level `i + 1` was opened.
    level_starts: Vec<usize>,
    records: Vec<T>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            level_starts: vec![],
            records: vec![],
        }
    }
}

impl<T> Trail<T> {
    /// Opens the next level; records pushed from now on belong to it.
    pub(crate) fn new_level(&mut self) {
        self.level_starts.push(self.records.len());
    }

    /// The current level; level 0 is never removed.
    pub(crate) fn level(&self) -> usize {
        self.level_starts.len()
    }

    /// The records pushed while `level` was the current level.
    pub(crate) fn entries_at_level(&self, level: usize) -> &[T] {
        gourd_assert_simple!(level <= self.level());

        let start = level
            .checked_sub(1)
            .map_or(0, |opened| self.level_starts[opened]);
        let end = self
            .level_starts
            .get(level)
            .copied()
            .unwrap_or(self.records.len());

        &self.records[start..end]
    }

    /// Removes every level above `level` and hands back their records, newest first.
    pub(crate) fn synchronise(&mut self, level: usize) -> Rev<Drain<'_, T>> {
        gourd_assert_simple!(level < self.level());

        let kept = self.level_starts[level];
        self.level_starts.truncate(level);
        self.records.drain(kept..).rev()
    }

    pub(crate) fn push(&mut self, record: T) {
        self.records.push(record)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_at_level_zero_survive_every_removal() {
        let mut trail = Trail::default();
        trail.push('a');
        trail.new_level();
        trail.push('b');

        let removed = trail.synchronise(0).collect::<Vec<_>>();

        assert_eq!(vec!['b'], removed);
        assert_eq!(&['a'], trail.deref());
        assert_eq!(0, trail.level());
    }

    #[test]
    fn removing_a_shallow_level_undoes_the_deeper_ones_newest_first() {
        let mut trail = Trail::default();
        trail.new_level();
        trail.push(1);
        trail.new_level();
        trail.push(2);
        trail.push(3);
        trail.new_level();
        trail.push(4);

        let removed = trail.synchronise(1).collect::<Vec<_>>();

        assert_eq!(vec![4, 3, 2], removed);
        assert_eq!(1, trail.level());
        assert_eq!(&[1], trail.deref());
    }

    #[test]
    fn records_are_grouped_by_the_level_they_were_pushed_at() {
        let mut trail = Trail::default();
        trail.push(1);
        trail.new_level();
        trail.new_level();
        trail.push(2);
        trail.push(3);

        assert_eq!(&[1], trail.entries_at_level(0));
        assert!(trail.entries_at_level(1).is_empty());
        assert_eq!(&[2, 3], trail.entries_at_level(2));
    }

    #[test]
    fn levels_can_be_reopened_after_removal() {
        let mut trail = Trail::default();
        trail.new_level();
        trail.push(1);
        let _ = trail.synchronise(0);

        trail.new_level();
        trail.push(2);

        assert_eq!(1, trail.level());
        assert_eq!(&[2], trail.entries_at_level(1));
    }
}
