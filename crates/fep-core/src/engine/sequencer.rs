use super::config::ConfigError;
use crate::core::mutation::Mutation;
use std::fmt;
use std::str::FromStr;

/// How mutation steps are ordered into intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Mutations are applied one after another, never interleaved.
    #[default]
    Separate,
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "seperate" is accepted for existing configuration files.
            "separate" | "seperate" => Ok(Self::Separate),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Separate => f.write_str("separate"),
        }
    }
}

/// One intermediate state of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedState {
    /// 1-based state index; the state lives in `intst<index>/`.
    pub index: usize,
    /// Position of the mutation in the input list.
    pub mutation: usize,
    /// Step of that mutation applied to produce this state.
    pub step: usize,
}

/// The complete, ordered sequence of intermediate states for a list of mutations.
///
/// The first mutation contributes its steps `0..n`; every later mutation starts at step 1,
/// because its step 0 is the state the previous mutation ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationPlan {
    strategy: Strategy,
    states: Vec<PlannedState>,
}

impl MutationPlan {
    pub fn new(mutations: &[Box<dyn Mutation>], strategy: Strategy) -> Self {
        let steps: Vec<usize> = mutations.iter().map(|m| m.nr_of_steps()).collect();
        Self::from_step_counts(&steps, strategy)
    }

    pub fn from_step_counts(step_counts: &[usize], strategy: Strategy) -> Self {
        let mut states = Vec::new();
        match strategy {
            Strategy::Separate => {
                for (mutation, &nr_of_steps) in step_counts.iter().enumerate() {
                    let first_step = if mutation == 0 { 0 } else { 1 };
                    for step in first_step..nr_of_steps {
                        states.push(PlannedState {
                            index: states.len() + 1,
                            mutation,
                            step,
                        });
                    }
                }
            }
        }
        Self { strategy, states }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn states(&self) -> &[PlannedState] {
        &self.states
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedState> {
        self.states.iter()
    }

    /// The number of intermediate states `N`.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
