//! Plan store: the ordered, never-empty list of sets.

use crate::workouts::types::{SetConfig, SetLimits, SetUpdate, TimerError};

/// Ordered sequence of sets. Always holds at least one set.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStore {
    sets: Vec<SetConfig>,
    /// Template used by `add_set` and `reset`
    default_set: SetConfig,
    /// Bounds applied to edits
    limits: SetLimits,
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new(SetConfig::default(), SetLimits::default())
    }
}

impl PlanStore {
    /// Create a plan holding one copy of `default_set`.
    ///
    /// An invalid template is replaced by [`SetConfig::default`] so the plan
    /// invariants hold from the start.
    pub fn new(default_set: SetConfig, limits: SetLimits) -> Self {
        let default_set = match default_set.validate() {
            Ok(()) => default_set,
            Err(e) => {
                tracing::warn!("Ignoring invalid default set: {}", e);
                SetConfig::default()
            }
        };

        Self {
            sets: vec![default_set.clone()],
            default_set,
            limits,
        }
    }

    /// Build a plan from explicit sets.
    pub fn from_sets(sets: Vec<SetConfig>) -> Result<Self, TimerError> {
        if sets.is_empty() {
            return Err(TimerError::EmptyPlan);
        }
        for set in &sets {
            set.validate()?;
        }

        Ok(Self {
            sets,
            ..Self::default()
        })
    }

    /// Replace the template used for new sets.
    pub fn with_default_set(mut self, default_set: SetConfig) -> Result<Self, TimerError> {
        default_set.validate()?;
        self.default_set = default_set;
        Ok(self)
    }

    /// Replace the edit bounds.
    pub fn with_limits(mut self, limits: SetLimits) -> Self {
        self.limits = limits;
        self
    }

    /// All sets in order.
    pub fn sets(&self) -> &[SetConfig] {
        &self.sets
    }

    /// Number of sets (never zero).
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Set at `index`.
    pub fn get(&self, index: usize) -> Option<&SetConfig> {
        self.sets.get(index)
    }

    /// First set of the plan.
    pub fn first(&self) -> &SetConfig {
        // Non-empty by construction; the fallback is never reached.
        self.sets.first().unwrap_or(&self.default_set)
    }

    /// Set at `index`, falling back to the last set when out of range.
    pub fn get_clamped(&self, index: usize) -> &SetConfig {
        let index = index.min(self.sets.len().saturating_sub(1));
        self.sets.get(index).unwrap_or(&self.default_set)
    }

    pub fn default_set(&self) -> &SetConfig {
        &self.default_set
    }

    pub fn limits(&self) -> &SetLimits {
        &self.limits
    }

    /// Append a copy of the default set and return its index.
    pub fn add_set(&mut self) -> usize {
        self.sets.push(self.default_set.clone());
        let index = self.sets.len() - 1;
        tracing::debug!("Added set {}", index + 1);
        index
    }

    /// Remove the set at `index`.
    ///
    /// Refused when it is the only set.
    pub fn remove_set(&mut self, index: usize) -> Result<SetConfig, TimerError> {
        self.check_index(index)?;
        if self.sets.len() == 1 {
            return Err(TimerError::LastSet);
        }

        let removed = self.sets.remove(index);
        tracing::debug!("Removed set {}", index + 1);
        Ok(removed)
    }

    /// Merge `update` into the set at `index`.
    ///
    /// Zero durations or rounds are rejected outright; other out-of-range
    /// values are clamped into the configured limits.
    pub fn update_set(
        &mut self,
        index: usize,
        update: SetUpdate,
    ) -> Result<&SetConfig, TimerError> {
        self.check_index(index)?;

        if update.workout_duration == Some(0) {
            return Err(TimerError::InvalidSet(
                "workout duration must be positive".to_string(),
            ));
        }
        if update.rest_duration == Some(0) {
            return Err(TimerError::InvalidSet(
                "rest duration must be positive".to_string(),
            ));
        }
        if update.rounds == Some(0) {
            return Err(TimerError::InvalidSet(
                "a set needs at least one round".to_string(),
            ));
        }

        let limits = self.limits;
        let set = &mut self.sets[index];
        let SetUpdate {
            workout_duration,
            rest_duration,
            rounds,
            initial_countdown,
            details,
        } = update;

        // Only edited fields are clamped; the rest keep the values they
        // were built with.
        if let Some(seconds) = workout_duration {
            set.workout_duration = limits.clamp_workout(seconds);
        }
        if let Some(seconds) = rest_duration {
            set.rest_duration = limits.clamp_rest(seconds);
        }
        if let Some(count) = rounds {
            set.rounds = limits.clamp_rounds(count);
        }
        if let Some(seconds) = initial_countdown {
            set.initial_countdown = limits.clamp_countdown(seconds);
        }
        if let Some(details) = details {
            set.details = details;
        }

        tracing::debug!("Updated set {}: {:?}", index + 1, set);
        Ok(&self.sets[index])
    }

    /// Drop every set and start over with one default set.
    pub fn reset(&mut self) {
        self.sets.clear();
        self.sets.push(self.default_set.clone());
    }

    /// Planned work+rest seconds across all sets.
    pub fn total_planned_seconds(&self) -> u64 {
        self.sets.iter().map(SetConfig::planned_seconds).sum()
    }

    fn check_index(&self, index: usize) -> Result<(), TimerError> {
        if index >= self.sets.len() {
            return Err(TimerError::SetIndexOutOfRange {
                index,
                len: self.sets.len(),
            });
        }
        Ok(())
    }
}
