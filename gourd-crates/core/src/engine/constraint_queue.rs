use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use crate::containers::KeyedVec;
use crate::gourd_assert_moderate;
use crate::propagation::ConstraintId;
use crate::propagation::Priority;

/// The pending constraints, one FIFO bucket per [`Priority`]. A constraint is in at most one
/// bucket at a time.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintQueue {
    queues: Vec<VecDeque<ConstraintId>>,
    is_enqueued: KeyedVec<ConstraintId, bool>,
    num_enqueued: usize,
    present_priorities: BinaryHeap<Reverse<u32>>,
}

impl Default for ConstraintQueue {
    fn default() -> Self {
        Self::new(Priority::NUM_PRIORITIES)
    }
}

impl ConstraintQueue {
    pub(crate) fn new(num_priority_levels: usize) -> ConstraintQueue {
        ConstraintQueue {
            queues: vec![VecDeque::new(); num_priority_levels],
            is_enqueued: KeyedVec::default(),
            num_enqueued: 0,
            present_priorities: BinaryHeap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.num_enqueued
    }

    pub(crate) fn enqueue(&mut self, constraint: ConstraintId, priority: Priority) {
        gourd_assert_moderate!((priority as usize) < self.queues.len());

        if !self.is_enqueued(constraint) {
            self.is_enqueued.accomodate(constraint, false);
            self.is_enqueued[constraint] = true;
            self.num_enqueued += 1;

            if self.queues[priority as usize].is_empty() {
                self.present_priorities.push(Reverse(priority as u32));
            }
            self.queues[priority as usize].push_back(constraint);
        }
    }

    /// Removes the oldest constraint of the highest priority present.
    pub(crate) fn pop(&mut self) -> Option<ConstraintId> {
        let top_priority = self.present_priorities.peek()?.0 as usize;
        gourd_assert_moderate!(!self.queues[top_priority].is_empty());

        let next = self.queues[top_priority].pop_front();

        if let Some(constraint) = next {
            self.is_enqueued[constraint] = false;
            self.num_enqueued -= 1;

            if self.queues[top_priority].is_empty() {
                let _ = self.present_priorities.pop();
            }
        }

        next
    }

    pub(crate) fn clear(&mut self) {
        while let Some(Reverse(priority)) = self.present_priorities.pop() {
            self.queues[priority as usize].clear();
        }

        for is_constraint_enqueued in self.is_enqueued.iter_mut() {
            *is_constraint_enqueued = false;
        }

        self.num_enqueued = 0;
    }

    /// The enqueued constraints in the order they would be popped.
    pub(crate) fn pending(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.queues.iter().flatten().copied()
    }

    pub(crate) fn is_enqueued(&self, constraint: ConstraintId) -> bool {
        self.is_enqueued
            .get(constraint)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priorities_are_popped_first() {
        let mut queue = ConstraintQueue::default();

        queue.enqueue(ConstraintId(1), Priority::High);
        queue.enqueue(ConstraintId(0), Priority::Medium);
        queue.enqueue(ConstraintId(3), Priority::VeryLow);
        queue.enqueue(ConstraintId(4), Priority::Low);

        assert_eq!(Some(ConstraintId(1)), queue.pop());
        assert_eq!(Some(ConstraintId(0)), queue.pop());
        assert_eq!(Some(ConstraintId(4)), queue.pop());
        assert_eq!(Some(ConstraintId(3)), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn constraints_are_enqueued_at_most_once() {
        let mut queue = ConstraintQueue::default();

        queue.enqueue(ConstraintId(2), Priority::Low);
        queue.enqueue(ConstraintId(2), Priority::Low);

        assert_eq!(1, queue.len());
        assert_eq!(Some(ConstraintId(2)), queue.pop());
        assert!(queue.is_empty());
    }

    #[test]
    fn same_priority_is_first_in_first_out() {
        let mut queue = ConstraintQueue::default();

        queue.enqueue(ConstraintId(5), Priority::Medium);
        queue.enqueue(ConstraintId(2), Priority::Medium);

        assert_eq!(Some(ConstraintId(5)), queue.pop());
        assert_eq!(Some(ConstraintId(2)), queue.pop());
    }

    #[test]
    fn pending_constraints_are_listed_in_pop_order() {
        let mut queue = ConstraintQueue::default();
        queue.enqueue(ConstraintId(3), Priority::Low);
        queue.enqueue(ConstraintId(1), Priority::High);
        queue.enqueue(ConstraintId(2), Priority::Low);

        assert_eq!(
            vec![ConstraintId(1), ConstraintId(3), ConstraintId(2)],
            queue.pending().collect::<Vec<_>>()
        );
        assert_eq!(3, queue.len());
    }

    #[test]
    fn cleared_queue_accepts_constraints_again() {
        let mut queue = ConstraintQueue::default();
        queue.enqueue(ConstraintId(0), Priority::High);
        queue.enqueue(ConstraintId(1), Priority::Low);

        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.is_enqueued(ConstraintId(0)));

        queue.enqueue(ConstraintId(0), Priority::High);
        assert_eq!(Some(ConstraintId(0)), queue.pop());
    }
}
