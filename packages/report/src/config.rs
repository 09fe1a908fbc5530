//! Engine configuration loaded from TOML.
//!
//! Every field has a default equal to the named constants in the scoring
//! and aggregation crates, so an empty file (or no file) is valid:
//!
//! ```toml
//! [safety]
//! very_safe_min = 65
//!
//! [diversity]
//! mixed_max_inclusive = 0.08
//! ```

use std::path::Path;

use area_report_crime::SafetyPolicy;
use area_report_neighborhood::DiversityPolicy;
use serde::{Deserialize, Serialize};

use crate::ReportError;

/// Tunable thresholds for a report build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub safety: SafetyPolicy,
    pub diversity: DiversityPolicy,
}

impl EngineConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a policy is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ReportError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Validates both policies.
    ///
    /// # Errors
    ///
    /// Returns the first policy validation error.
    pub fn validate(&self) -> Result<(), ReportError> {
        self.safety.validate()?;
        self.diversity.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn overrides_individual_thresholds() {
        let config = EngineConfig::from_toml_str(
            r"
            [safety]
            very_safe_min = 65

            [diversity]
            mixed_max_inclusive = 0.08
            ",
        )
        .unwrap();
        assert_eq!(config.safety.very_safe_min, 65);
        assert_eq!(
            config.safety.moderate_min,
            SafetyPolicy::default().moderate_min
        );
        assert!((config.diversity.mixed_max_inclusive - 0.08).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_invalid_policies() {
        assert!(matches!(
            EngineConfig::from_toml_str("[safety]\nmoderate_min = 90"),
            Err(ReportError::SafetyPolicy(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[diversity]\nuniform_max_exclusive = 2.0"),
            Err(ReportError::DiversityPolicy(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[safety\n"),
            Err(ReportError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            EngineConfig::load(Path::new("/nonexistent/area_report.toml")),
            Err(ReportError::Io(_))
        ));
    }
}
