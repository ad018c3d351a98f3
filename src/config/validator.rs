use crate::config::{Config, SCHEMA_VERSION};
use crate::error::{NetcfgError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every problem found
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_parser(config, &mut errors);
        Self::validate_redaction(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NetcfgError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_parser(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.parser.metadata_scan_lines == 0 {
            errors.push(ValidationError::new(
                "parser.metadata_scan_lines",
                "Scan window must be greater than 0",
            ));
        }
    }

    fn validate_redaction(config: &Config, errors: &mut Vec<ValidationError>) {
        // Existence is checked when the rules are loaded
        if let Some(path) = &config.redaction.rules_file {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    "redaction.rules_file",
                    "Rules file path cannot be empty",
                ));
            }
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        let provider = &config.embedding.provider;
        let valid_providers = ["hashing", "fastembed"];
        if !valid_providers.contains(&provider.as_str()) {
            errors.push(ValidationError::new(
                "embedding.provider",
                format!(
                    "Provider must be one of {:?}, got '{}'",
                    valid_providers, provider
                ),
            ));
        }

        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Dimension must be greater than 0",
            ));
        }

        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.retrieval.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        if config.retrieval.compare_top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.compare_top_k",
                "compare_top_k must be greater than 0",
            ));
        }

        let mode = &config.retrieval.compare_mode;
        if mode != "quick" && mode != "deep" {
            errors.push(ValidationError::new(
                "retrieval.compare_mode",
                format!("Mode must be 'quick' or 'deep', got '{}'", mode),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_rules_path() {
        let mut config = Config::default();
        config.redaction.rules_file = Some(PathBuf::new());
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_invalid_provider() {
        let mut config = Config::default();
        config.embedding.provider = "openai".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_errors_are_collected() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        config.retrieval.compare_mode = "fuzzy".to_string();
        config.parser.metadata_scan_lines = 0;

        match ConfigValidator::validate(&config) {
            Err(NetcfgError::ConfigValidation { errors }) => {
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(
                    paths,
                    vec![
                        "parser.metadata_scan_lines",
                        "retrieval.top_k",
                        "retrieval.compare_mode"
                    ]
                );
            }
            other => panic!("expected validation errors, got {:?}", other.err()),
        }
    }
}
