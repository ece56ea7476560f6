//! Search budget accounting.
//!
//! [`SearchTime`] holds the two monotonic counters every budget decision is
//! based on: evaluated actions and elapsed wall-clock time. Only the
//! engine's evaluation step writes them.

use std::time::{Duration, Instant};

/// Which counter bounds the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StoppingCriterion {
    /// Stop after a number of executed actions.
    #[default]
    ActionEvaluations,
    /// Stop after a number of seconds.
    Time,
}

/// Budget counters of one search.
#[derive(Debug, Clone)]
pub struct SearchTime {
    criterion: StoppingCriterion,
    max_action_evaluations: u64,
    max_time: Duration,
    start: Instant,
    evaluated_individuals: u64,
    evaluated_actions: u64,
    last_action_improvement: u64,
    covered_targets: usize,
}

impl SearchTime {
    pub fn new(criterion: StoppingCriterion, max_action_evaluations: u64, max_time_seconds: u64) -> Self {
        Self {
            criterion,
            max_action_evaluations,
            max_time: Duration::from_secs(max_time_seconds),
            start: Instant::now(),
            evaluated_individuals: 0,
            evaluated_actions: 0,
            last_action_improvement: 0,
            covered_targets: 0,
        }
    }

    pub fn criterion(&self) -> StoppingCriterion {
        self.criterion
    }

    pub fn evaluated_individuals(&self) -> u64 {
        self.evaluated_individuals
    }

    pub fn evaluated_actions(&self) -> u64 {
        self.evaluated_actions
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whether any budget is left.
    pub fn should_continue_search(&self) -> bool {
        self.percentage_used_budget() < 1.0
    }

    /// Fraction of the budget consumed, in `[0, 1]`.
    pub fn percentage_used_budget(&self) -> f64 {
        let used = match self.criterion {
            StoppingCriterion::ActionEvaluations => {
                if self.max_action_evaluations == 0 {
                    return 1.0;
                }
                self.evaluated_actions as f64 / self.max_action_evaluations as f64
            }
            StoppingCriterion::Time => {
                if self.max_time.is_zero() {
                    return 1.0;
                }
                self.elapsed().as_secs_f64() / self.max_time.as_secs_f64()
            }
        };
        used.min(1.0)
    }

    /// Consumed budget in the unit of the stopping criterion.
    pub fn used_budget_units(&self) -> u64 {
        match self.criterion {
            StoppingCriterion::ActionEvaluations => self.evaluated_actions,
            StoppingCriterion::Time => self.elapsed().as_secs(),
        }
    }

    /// Remaining budget in the unit of the stopping criterion.
    pub fn remaining_budget_units(&self) -> u64 {
        let max = match self.criterion {
            StoppingCriterion::ActionEvaluations => self.max_action_evaluations,
            StoppingCriterion::Time => self.max_time.as_secs(),
        };
        max.saturating_sub(self.used_budget_units())
    }

    /// Counts one evaluated individual and the actions it executed.
    pub fn report_executed_individual(&mut self, actions: usize) {
        self.evaluated_individuals += 1;
        self.evaluated_actions += actions as u64;
    }

    /// Marks the current action count as the latest improvement.
    pub fn new_action_improvement(&mut self) {
        self.last_action_improvement = self.evaluated_actions;
    }

    pub fn new_covered_target(&mut self) {
        self.covered_targets += 1;
    }

    pub fn covered_targets(&self) -> usize {
        self.covered_targets
    }

    /// Actions executed since the last archive improvement.
    pub fn actions_since_last_improvement(&self) -> u64 {
        self.evaluated_actions - self.last_action_improvement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_budget() {
        let mut t = SearchTime::new(StoppingCriterion::ActionEvaluations, 100, 0);
        assert!(t.should_continue_search());
        assert_eq!(t.remaining_budget_units(), 100);
        t.report_executed_individual(40);
        t.report_executed_individual(10);
        assert_eq!(t.evaluated_individuals(), 2);
        assert_eq!(t.used_budget_units(), 50);
        assert!((t.percentage_used_budget() - 0.5).abs() < 1e-12);
        t.report_executed_individual(60);
        assert!(!t.should_continue_search());
        assert_eq!(t.remaining_budget_units(), 0);
        assert_eq!(t.percentage_used_budget(), 1.0);
    }

    #[test]
    fn test_zero_budget_is_exhausted() {
        assert!(!SearchTime::new(StoppingCriterion::ActionEvaluations, 0, 10).should_continue_search());
        assert!(!SearchTime::new(StoppingCriterion::Time, 10, 0).should_continue_search());
    }

    #[test]
    fn test_time_budget_starts_fresh() {
        let t = SearchTime::new(StoppingCriterion::Time, 0, 3600);
        assert!(t.should_continue_search());
        assert!(t.remaining_budget_units() > 3500);
    }

    #[test]
    fn test_improvement_tracking() {
        let mut t = SearchTime::new(StoppingCriterion::ActionEvaluations, 100, 0);
        t.report_executed_individual(5);
        t.new_action_improvement();
        t.report_executed_individual(7);
        t.new_covered_target();
        assert_eq!(t.actions_since_last_improvement(), 7);
        assert_eq!(t.covered_targets(), 1);
    }
}
