//! Parameter control for archive-driven search.
//!
//! Parameters move linearly from an exploration value to an exploitation
//! value while the used budget fraction goes from 0 to the focused-search
//! activation time, then stay at the exploitation value.

/// Interpolates from `start` to `end` over `[0, activation]`.
fn interpolate(start: f64, end: f64, used: f64, activation: f64) -> f64 {
    if used >= activation || activation <= 0.0 {
        return end;
    }
    let progress = (used / activation).clamp(0.0, 1.0);
    start + (end - start) * progress
}

/// Whether the search has entered its focused phase.
pub fn is_focused(used: f64, activation: f64) -> bool {
    used >= activation
}

/// Per-target archive capacity, shrinking from `start` to 1.
pub fn archive_target_limit(start: usize, used: f64, activation: f64) -> usize {
    let v = interpolate(start as f64, 1.0, used, activation);
    (v.round() as usize).max(1)
}

/// Probability of sampling a fresh individual, shrinking from `start` to 0.
pub fn prob_random_sampling(start: f64, used: f64, activation: f64) -> f64 {
    interpolate(start, 0.0, used, activation).clamp(0.0, 1.0)
}

/// Mutations per archive sample, growing from 1 to `max`.
pub fn number_of_mutations(max: usize, used: f64, activation: f64) -> usize {
    let v = interpolate(1.0, max.max(1) as f64, used, activation);
    (v.round() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_values() {
        assert_eq!(archive_target_limit(10, 0.0, 0.8), 10);
        assert_eq!(prob_random_sampling(0.5, 0.0, 0.8), 0.5);
        assert_eq!(number_of_mutations(10, 0.0, 0.8), 1);
    }

    #[test]
    fn test_midway_values() {
        assert_eq!(archive_target_limit(11, 0.4, 0.8), 6);
        assert!((prob_random_sampling(0.5, 0.4, 0.8) - 0.25).abs() < 1e-12);
        assert_eq!(number_of_mutations(11, 0.4, 0.8), 6);
    }

    #[test]
    fn test_focused_phase() {
        assert!(is_focused(0.8, 0.8));
        assert!(!is_focused(0.79, 0.8));
        assert_eq!(archive_target_limit(10, 0.9, 0.8), 1);
        assert_eq!(prob_random_sampling(0.5, 0.9, 0.8), 0.0);
        assert_eq!(number_of_mutations(10, 0.9, 0.8), 10);
    }

    #[test]
    fn test_zero_activation_is_focused_immediately() {
        assert_eq!(archive_target_limit(10, 0.0, 0.0), 1);
        assert_eq!(prob_random_sampling(0.5, 0.0, 0.0), 0.0);
        assert_eq!(number_of_mutations(0, 0.0, 0.0), 1);
    }
}
