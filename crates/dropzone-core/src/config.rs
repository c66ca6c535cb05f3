//! Configuration module
//!
//! Intake limits (size, count, allowed extensions) plus the host's clear signal.

use std::env;

use crate::error::{IntakeError, IntakeResult};

pub const DEFAULT_MAX_FILE_SIZE_MB: f64 = 10.0;
pub const DEFAULT_MAX_FILE_COUNT: usize = 5;

const RECOMMENDED_FILE_SIZE_MB: (f64, f64) = (1.0, 100.0);
const RECOMMENDED_FILE_COUNT: (usize, usize) = (1, 50);

/// Limits applied to every batch of incoming files
#[derive(Clone, Debug, PartialEq)]
pub struct IntakeConfig {
    pub max_file_size_mb: f64,
    pub max_file_count: usize,
    /// Normalized extensions (lowercase, no leading dot). Empty means unrestricted.
    pub allowed_extensions: Vec<String>,
    /// Counter owned by the host; any change of value requests a bulk clear.
    pub clear_signal: i64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            allowed_extensions: Vec::new(),
            clear_signal: 0,
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> IntakeResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup (the environment in production).
    pub fn from_vars<F>(lookup: F) -> IntakeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_file_size_mb = lookup("DROPZONE_MAX_FILE_SIZE_MB")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let max_file_count = lookup("DROPZONE_MAX_FILE_COUNT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_COUNT);

        let allowed_extensions = lookup("DROPZONE_ALLOWED_EXTENSIONS")
            .map(|s| parse_allowed_extensions(&s))
            .unwrap_or_default();

        let config = IntakeConfig {
            max_file_size_mb,
            max_file_count,
            allowed_extensions,
            clear_signal: 0,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IntakeResult<()> {
        if !self.max_file_size_mb.is_finite() || self.max_file_size_mb <= 0.0 {
            return Err(IntakeError::InvalidConfig(format!(
                "max file size must be a positive number of MB, got {}",
                self.max_file_size_mb
            )));
        }

        if self.max_file_count == 0 {
            return Err(IntakeError::InvalidConfig(
                "max file count must be at least 1".to_string(),
            ));
        }

        let (min_mb, max_mb) = RECOMMENDED_FILE_SIZE_MB;
        if self.max_file_size_mb < min_mb || self.max_file_size_mb > max_mb {
            tracing::warn!(
                max_file_size_mb = self.max_file_size_mb,
                "Max file size is outside the recommended range of {}-{} MB",
                min_mb,
                max_mb
            );
        }

        let (min_count, max_count) = RECOMMENDED_FILE_COUNT;
        if self.max_file_count < min_count || self.max_file_count > max_count {
            tracing::warn!(
                max_file_count = self.max_file_count,
                "Max file count is outside the recommended range of {}-{}",
                min_count,
                max_count
            );
        }

        Ok(())
    }

    /// Maximum accepted size in bytes (MB are binary megabytes).
    pub fn max_file_size_bytes(&self) -> u64 {
        (self.max_file_size_mb * 1024.0 * 1024.0) as u64
    }
}

/// Parse a comma-separated extension list: trimmed, lowercased, one leading dot removed.
pub fn parse_allowed_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| {
            let ext = s.trim().to_lowercase();
            match ext.strip_prefix('.') {
                Some(stripped) => stripped.to_string(),
                None => ext,
            }
        })
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = IntakeConfig::default();
        assert_eq!(config.max_file_size_mb, 10.0);
        assert_eq!(config.max_file_count, 5);
        assert!(config.allowed_extensions.is_empty());
        assert_eq!(config.clear_signal, 0);
        assert_eq!(config.max_file_size_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_parse_allowed_extensions() {
        assert_eq!(
            parse_allowed_extensions(" .PDF, docx ,.Jpg"),
            vec!["pdf", "docx", "jpg"]
        );
        assert!(parse_allowed_extensions("").is_empty());
        assert_eq!(parse_allowed_extensions("pdf,, ,png"), vec!["pdf", "png"]);
    }

    #[test]
    fn test_from_vars() {
        let env = vars(&[
            ("DROPZONE_MAX_FILE_SIZE_MB", "2.5"),
            ("DROPZONE_MAX_FILE_COUNT", "3"),
            ("DROPZONE_ALLOWED_EXTENSIONS", "pdf,.png"),
        ]);
        let config = IntakeConfig::from_vars(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.max_file_size_mb, 2.5);
        assert_eq!(config.max_file_count, 3);
        assert_eq!(config.allowed_extensions, vec!["pdf", "png"]);
        assert_eq!(config.max_file_size_bytes(), 2_621_440);
    }

    #[test]
    fn test_from_vars_unparsable_falls_back() {
        let env = vars(&[
            ("DROPZONE_MAX_FILE_SIZE_MB", "lots"),
            ("DROPZONE_MAX_FILE_COUNT", "-1"),
        ]);
        let config = IntakeConfig::from_vars(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config, IntakeConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = IntakeConfig {
            max_file_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(IntakeError::InvalidConfig(_))
        ));

        let config = IntakeConfig {
            max_file_size_mb: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_out_of_recommended_range() {
        let config = IntakeConfig {
            max_file_size_mb: 500.0,
            max_file_count: 80,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
