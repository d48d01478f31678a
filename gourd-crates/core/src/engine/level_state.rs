/// A value owned by a constraint whose changes are undone when the store removes the level at
/// which they were made.
///
/// Constraints holding a `LevelState` must report [`Constraint::is_stateful`] and forward
/// [`Constraint::remove_level`] to [`LevelState::remove_level`].
///
/// [`Constraint::is_stateful`]: crate::propagation::Constraint::is_stateful
/// [`Constraint::remove_level`]: crate::propagation::Constraint::remove_level
#[derive(Clone, Debug)]
pub struct LevelState<T> {
    value: T,
    /// The value before the first change at every level, oldest first.
    history: Vec<(usize, T)>,
}

impl<T: Clone> LevelState<T> {
    pub fn new(value: T) -> Self {
        LevelState {
            value,
            history: vec![],
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Changes the value at `level`.
    pub fn set(&mut self, level: usize, value: T) {
        let first_change_at_level = self
            .history
            .last()
            .map_or(true, |&(last_level, _)| last_level < level);
        if first_change_at_level {
            self.history.push((level, self.value.clone()));
        }
        self.value = value;
    }

    /// Restores the value from before `level`, forgetting all changes made at `level` or above.
    pub fn remove_level(&mut self, level: usize) {
        while let Some((changed_at, _)) = self.history.last() {
            if *changed_at < level {
                break;
            }
            if let Some((_, previous)) = self.history.pop() {
                self.value = previous;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_a_level_restores_the_previous_value() {
        let mut state = LevelState::new(false);

        state.set(2, true);
        assert!(*state.get());

        state.remove_level(2);
        assert!(!*state.get());
    }

    #[test]
    fn only_the_first_change_per_level_is_remembered() {
        let mut state = LevelState::new(0);

        state.set(1, 10);
        state.set(1, 11);
        state.set(3, 30);

        state.remove_level(3);
        assert_eq!(11, *state.get());

        state.remove_level(1);
        assert_eq!(0, *state.get());
    }

    #[test]
    fn removing_a_lower_level_undoes_everything_above() {
        let mut state = LevelState::new("root");

        state.set(2, "two");
        state.set(4, "four");
        state.remove_level(1);

        assert_eq!("root", *state.get());
    }

    #[test]
    fn changes_at_level_zero_are_permanent_for_higher_levels() {
        let mut state = LevelState::new(1);

        state.set(0, 2);
        state.remove_level(1);

        assert_eq!(2, *state.get());
    }
}
