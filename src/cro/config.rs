//! CRO configuration.

use crate::error::{Result, SearchError};

/// Parameters of the chemical reaction optimization reactor.
///
/// # Defaults
///
/// ```
/// use u_sbst::cro::CroConfig;
///
/// let config = CroConfig::default();
/// assert_eq!(config.initial_kinetic_energy, 1000.0);
/// assert_eq!(config.decomposition_threshold, 500);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CroConfig {
    /// Kinetic energy given to every molecule of the initial population.
    pub initial_kinetic_energy: f64,

    /// Lower bound of the fraction of surplus kept as kinetic energy in an
    /// on-wall collision; the rest goes to the container.
    pub kinetic_energy_loss_rate: f64,

    /// Probability of an inter-molecular reaction (vs. uni-molecular).
    pub molecular_collision_rate: f64,

    /// A molecule with more collisions than this decomposes.
    pub decomposition_threshold: u32,

    /// Two molecules whose kinetic energies are both at most this fuse.
    pub synthesis_threshold: f64,
}

impl Default for CroConfig {
    fn default() -> Self {
        Self {
            initial_kinetic_energy: 1000.0,
            kinetic_energy_loss_rate: 0.2,
            molecular_collision_rate: 0.2,
            decomposition_threshold: 500,
            synthesis_threshold: 10.0,
        }
    }
}

impl CroConfig {
    pub fn with_initial_kinetic_energy(mut self, energy: f64) -> Self {
        self.initial_kinetic_energy = energy.max(0.0);
        self
    }

    pub fn with_kinetic_energy_loss_rate(mut self, rate: f64) -> Self {
        self.kinetic_energy_loss_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_molecular_collision_rate(mut self, rate: f64) -> Self {
        self.molecular_collision_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_decomposition_threshold(mut self, threshold: u32) -> Self {
        self.decomposition_threshold = threshold;
        self
    }

    pub fn with_synthesis_threshold(mut self, threshold: f64) -> Self {
        self.synthesis_threshold = threshold;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_kinetic_energy >= 0.0 && self.initial_kinetic_energy.is_finite()) {
            return Err(SearchError::config(format!(
                "initial_kinetic_energy must be finite and non-negative, got {}",
                self.initial_kinetic_energy
            )));
        }
        if !(0.0..=1.0).contains(&self.kinetic_energy_loss_rate) {
            return Err(SearchError::config(format!(
                "kinetic_energy_loss_rate must be in [0, 1], got {}",
                self.kinetic_energy_loss_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.molecular_collision_rate) {
            return Err(SearchError::config(format!(
                "molecular_collision_rate must be in [0, 1], got {}",
                self.molecular_collision_rate
            )));
        }
        if self.synthesis_threshold.is_nan() {
            return Err(SearchError::config("synthesis_threshold must be a number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CroConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_clamps() {
        let c = CroConfig::default()
            .with_kinetic_energy_loss_rate(3.0)
            .with_molecular_collision_rate(-1.0)
            .with_initial_kinetic_energy(-5.0);
        assert_eq!(c.kinetic_energy_loss_rate, 1.0);
        assert_eq!(c.molecular_collision_rate, 0.0);
        assert_eq!(c.initial_kinetic_energy, 0.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid_rates_rejected() {
        let mut c = CroConfig::default();
        c.molecular_collision_rate = 1.5;
        assert!(matches!(c.validate(), Err(SearchError::InvalidConfig(_))));
        let mut c = CroConfig::default();
        c.kinetic_energy_loss_rate = f64::NAN;
        assert!(c.validate().is_err());
        let mut c = CroConfig::default();
        c.initial_kinetic_energy = f64::INFINITY;
        assert!(c.validate().is_err());
    }
}
