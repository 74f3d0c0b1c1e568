use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::intent::ClassifierConfig;
use crate::pricing::PricingConfig;

/// Tunable constants for the classification and pricing stages.
///
/// Every field has a built-in default, so a config file only needs the values it changes:
///
/// ```json
/// { "pricing": { "weekend": 1.1 }, "classifier": { "default_location": "Uttara, Dhaka" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    pub pricing: PricingConfig,
}

impl PipelineConfig {
    /// Load and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.classifier.confidence.validate()?;
        self.pricing.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceCategory;

    #[test]
    fn defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(
            r#"{
                "classifier": {
                    "default_location": "Uttara, Dhaka",
                    "confidence": { "overrides": { "plumbing": 0.7 } }
                },
                "pricing": { "weekend": 1.1 }
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.classifier.default_location, "Uttara, Dhaka");
        assert_eq!(config.classifier.confidence.get(ServiceCategory::Plumbing), 0.7);
        assert_eq!(config.classifier.confidence.get(ServiceCategory::Tutoring), 0.87);
        assert_eq!(config.pricing.weekend, 1.1);
        assert_eq!(config.pricing.urgency_high, 1.40);
    }

    #[test]
    fn empty_object_is_the_default_config() {
        let config = PipelineConfig::from_json("{}").expect("valid config");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn rejects_inverted_band() {
        let err = PipelineConfig::from_json(
            r#"{ "pricing": { "band": { "low": 0.9, "optimal": 1.3, "high": 1.2 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::PriceBandOrder { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = PipelineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/sheba-pipeline.json"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigRead { .. }));
    }
}
