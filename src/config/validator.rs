use crate::config::Config;
use crate::document::Direction;
use crate::error::{BuilderError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_index(config, &mut errors);
        Self::validate_query(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BuilderError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_index(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.index.default_type.trim().is_empty() {
            errors.push(ValidationError::new(
                "index.default_type",
                "Default document type cannot be empty",
            ));
        }
    }

    fn validate_query(config: &Config, errors: &mut Vec<ValidationError>) {
        let direction = &config.query.default_direction;
        if Direction::parse(direction).is_none() {
            errors.push(ValidationError::new(
                "query.default_direction",
                format!("Invalid sort direction: {} (must be 'asc' or 'desc')", direction),
            ));
        }
    }
}
