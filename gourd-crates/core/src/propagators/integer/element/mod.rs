//! Contains the constraint for the [Element](https://sofdem.github.io/gccat/gccat/Celement.html)
//! constraint over a list of integer constants.
mod options;

use std::fmt::Display;

use itertools::Itertools;
pub use options::*;

use crate::basic_types::ModelConstructionError;
use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::domains::IntDomain;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::engine::LevelState;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The constraint `list[index] = value` where `list` is a list of constants, maintained with
/// domain consistency.
#[derive(Clone, Debug)]
pub struct Element {
    index: IntVar,
    list: Box<[i32]>,
    value: IntVar,
    options: ElementOptions,
    /// The positions holding every distinct value of the list, in increasing order of value.
    blocks: Box<[(i32, Box<[usize]>)]>,
    /// Whether the index was restricted to the positions of the list at the current level.
    index_checked: LevelState<bool>,
}

impl Element {
    pub fn new(
        index: IntVar,
        list: Vec<i32>,
        value: IntVar,
        options: ElementOptions,
    ) -> Result<Self, ModelConstructionError> {
        if list.is_empty() {
            return Err(ModelConstructionError::EmptyScope {
                constraint: "Element",
            });
        }
        let last_index = i64::from(options.index_offset) + list.len() as i64 - 1;
        if i32::try_from(last_index).is_err() {
            return Err(ModelConstructionError::ConstantOutOfRange {
                constraint: "Element",
                value: last_index.to_string(),
            });
        }

        let blocks = list
            .iter()
            .enumerate()
            .map(|(position, &value)| (value, position))
            .into_group_map()
            .into_iter()
            .sorted_by_key(|&(value, _)| value)
            .map(|(value, positions)| (value, positions.into_boxed_slice()))
            .collect();

        Ok(Element {
            index,
            list: list.into(),
            value,
            options,
            blocks,
            index_checked: LevelState::new(false),
        })
    }

    fn index_of(&self, position: usize) -> i32 {
        // in range, as checked on creation
        self.options.index_offset + position as i32
    }

    fn position_of(&self, index: i32) -> Option<usize> {
        usize::try_from(i64::from(index) - i64::from(self.options.index_offset))
            .ok()
            .filter(|&position| position < self.list.len())
    }

    /// Removes the positions whose value is gone, and returns the values which still have a
    /// position.
    fn propagate_per_index(&self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let indices = context.int_domain(self.index).values().collect_vec();
        let mut supported = Vec::with_capacity(indices.len());
        for index in indices {
            let Some(position) = self.position_of(index) else {
                continue;
            };
            let value = self.list[position];
            if context.contains(self.value, value) {
                supported.push(value);
            } else {
                context.in_int_complement(self.index, index)?;
            }
        }
        self.restrict_value(context, supported)
    }

    fn propagate_blocks(&self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let mut supported = Vec::with_capacity(self.blocks.len());
        for (value, positions) in self.blocks.iter() {
            if context.contains(self.value, *value) {
                let has_position = positions
                    .iter()
                    .any(|&position| context.contains(self.index, self.index_of(position)));
                if has_position {
                    supported.push(*value);
                }
            } else {
                for &position in positions.iter() {
                    let index = self.index_of(position);
                    if context.contains(self.index, index) {
                        context.in_int_complement(self.index, index)?;
                    }
                }
            }
        }
        self.restrict_value(context, supported)
    }

    fn restrict_value(
        &self,
        context: &mut PropagationContext<'_>,
        supported: Vec<i32>,
    ) -> PropagationStatus {
        // no supported value means the index emptied before
        if let Some(domain) = IntDomain::from_values(supported) {
            context.in_int_domain(self.value, &domain)?;
        }
        Ok(())
    }
}

impl Constraint for Element {
    fn name(&self) -> &str {
        "Element"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.index.id(), self.value.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        if !*self.index_checked.get() {
            let first = i64::from(self.options.index_offset);
            context.in_int(self.index, first, first + self.list.len() as i64 - 1)?;
            self.index_checked.set(context.level(), true);
        }

        match self.options.duplicate_handling {
            DuplicateHandling::PerIndex => self.propagate_per_index(context),
            DuplicateHandling::Blocks => self.propagate_blocks(context),
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        let Some(value) = domains.fixed_value(self.value) else {
            return false;
        };
        domains.int_domain(self.index).values().all(|index| {
            self.position_of(index)
                .is_some_and(|position| self.list[position] == value)
        })
    }

    fn consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Any
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn remove_level(&mut self, level: usize) {
        self.index_checked.remove_level(level);
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Element({}, [{}], {})",
            self.index,
            self.list.iter().join(", "),
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::engine::test_store::TestStore;

    fn element(index: IntVar, list: &[i32], value: IntVar, handling: DuplicateHandling) -> Element {
        Element::new(
            index,
            list.to_vec(),
            value,
            ElementOptions {
                index_offset: 1,
                duplicate_handling: handling,
            },
        )
        .expect("valid element")
    }

    #[test]
    fn index_is_restricted_to_the_list() {
        let mut store = TestStore::default();
        let index = store.new_int_variable(-10, 10);
        let value = store.new_int_variable(-10, 10);

        let _ = store
            .new_constraint(element(index, &[4, 2, 7], value, DuplicateHandling::Blocks))
            .expect("no empty domains");

        store.assert_bounds(index, 1, 3);
        store.assert_bounds(value, 2, 7);
        assert!(!store.contains(value, 3));
    }

    #[test]
    fn missing_values_remove_their_positions() {
        let mut store = TestStore::default();
        let index = store.new_int_variable(1, 5);
        let value = store.new_int_variable(3, 5);

        let _ = store
            .new_constraint(element(
                index,
                &[1, 3, 1, 5, 3],
                value,
                DuplicateHandling::Blocks,
            ))
            .expect("no empty domains");

        assert_eq!(
            vec![2, 4, 5],
            store.int_domain(index).values().collect::<Vec<_>>()
        );
        assert!(!store.contains(value, 4));
    }

    #[test]
    fn both_duplicate_handlings_prune_the_same() {
        for handling in [DuplicateHandling::PerIndex, DuplicateHandling::Blocks] {
            let mut store = TestStore::default();
            let index = store.new_int_variable(0, 8);
            let value = store.new_int_variable(0, 3);
            store
                .narrow(|context| context.in_int_complement(index, 6))
                .expect("no empty domains");

            let _ = store
                .new_constraint(element(
                    index,
                    &[9, 2, 2, 2, 3, 9, 3, 0],
                    value,
                    handling,
                ))
                .expect("no empty domains");

            assert_eq!(
                vec![2, 3, 4, 5, 7, 8],
                store.int_domain(index).values().collect::<Vec<_>>(),
                "{handling:?}"
            );
            assert_eq!(
                vec![0, 2, 3],
                store.int_domain(value).values().collect::<Vec<_>>(),
                "{handling:?}"
            );
        }
    }

    #[test]
    fn index_restriction_is_redone_after_backtracking() {
        let mut store = TestStore::default();
        let index = store.new_int_variable(-5, 5);
        let value = store.new_int_variable(0, 10);

        let level = store.new_level();
        let _ = store
            .new_constraint(element(index, &[1, 2], value, DuplicateHandling::Blocks))
            .expect("no empty domains");
        store.assert_bounds(index, 1, 2);

        store.remove_level(level);
        store.assert_bounds(index, -5, 5);

        let _ = store.new_level();
        store.in_int(value, 0, 9).expect("no empty domains");
        store.consistency().expect("no empty domains");
        store.assert_bounds(index, 1, 2);
        store.assert_bounds(value, 1, 2);
    }

    #[test]
    fn fixing_the_value_fixes_a_unique_index() {
        let mut store = TestStore::default();
        let index = store.new_int_variable(1, 3);
        let value = store.new_int_variable(0, 10);
        let handle = store
            .new_constraint(element(index, &[4, 2, 7], value, DuplicateHandling::Blocks))
            .expect("no empty domains");

        let _ = store.new_level();
        store.in_int_value(value, 7).expect("no empty domains");
        store.consistency().expect("no empty domains");

        store.assert_bounds(index, 3, 3);
        assert!(store.is_retired(handle.id()));
    }

    #[test]
    fn value_without_any_position_fails() {
        let mut store = TestStore::default();
        let index = store.new_int_variable(1, 3);
        let value = store.new_int_variable(10, 20);

        let result =
            store.new_constraint(element(index, &[4, 2, 7], value, DuplicateHandling::PerIndex));
        assert_eq!(Some(Inconsistency::EmptyDomain), result.err());
    }
}
