use regex::Regex;
use thiserror::Error;

use attendex_core::config_file::ParsingConfigFile;

use crate::patterns::{self, HEADER_GROUPS, SUBJECT_GROUPS};

/// Errors raised while building a [`ParsingConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("{kind} pattern is missing named group(s): {}", .groups.join(", "))]
    MissingGroups {
        kind: &'static str,
        groups: Vec<String>,
    },
    #[error("invalid percentage range: {min}..={max}")]
    InvalidRange { min: f64, max: f64 },
}

/// Configuration for the extraction pipeline.
///
/// Regex fields are `Option<Regex>`: `None` means "use the built-in pattern"
/// from [`patterns`]. Use [`ParsingConfigBuilder`] to construct with string
/// patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    /// Student header regex (`seq`, `reg`, `name` groups).
    pub(crate) header_re: Option<Regex>,
    /// Subject/percentage regex (`code`, `pct` groups).
    pub(crate) subject_re: Option<Regex>,
    /// Smallest accepted percentage (inclusive).
    pub(crate) min_percentage: f64,
    /// Largest accepted percentage (inclusive).
    pub(crate) max_percentage: f64,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            header_re: None,
            subject_re: None,
            min_percentage: 0.0,
            max_percentage: 100.0,
        }
    }
}

impl ParsingConfig {
    pub(crate) fn header_re(&self) -> &Regex {
        self.header_re
            .as_ref()
            .unwrap_or(&patterns::STUDENT_HEADER_RE)
    }

    pub(crate) fn subject_re(&self) -> &Regex {
        self.subject_re
            .as_ref()
            .unwrap_or(&patterns::SUBJECT_ATTENDANCE_RE)
    }

    pub fn percentage_range(&self) -> (f64, f64) {
        (self.min_percentage, self.max_percentage)
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled in [`build()`](Self::build).
/// Fails fast if a pattern is invalid or lacks a required named group.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    header_re: Option<String>,
    subject_re: Option<String>,
    min_percentage: Option<f64>,
    max_percentage: Option<f64>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[parsing]` section of a config file.
    pub fn from_config_file(section: &ParsingConfigFile) -> Self {
        Self {
            header_re: section.header_pattern.clone(),
            subject_re: section.subject_pattern.clone(),
            min_percentage: section.min_percentage,
            max_percentage: section.max_percentage,
        }
    }

    pub fn header_regex(mut self, pattern: &str) -> Self {
        self.header_re = Some(pattern.to_string());
        self
    }

    pub fn subject_regex(mut self, pattern: &str) -> Self {
        self.subject_re = Some(pattern.to_string());
        self
    }

    pub fn percentage_range(mut self, min: f64, max: f64) -> Self {
        self.min_percentage = Some(min);
        self.max_percentage = Some(max);
        self
    }

    pub fn build(self) -> Result<ParsingConfig, ConfigError> {
        let defaults = ParsingConfig::default();

        let header_re = compile(self.header_re, "header", &HEADER_GROUPS)?;
        let subject_re = compile(self.subject_re, "subject", &SUBJECT_GROUPS)?;

        let min = self.min_percentage.unwrap_or(defaults.min_percentage);
        let max = self.max_percentage.unwrap_or(defaults.max_percentage);
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(ConfigError::InvalidRange { min, max });
        }

        Ok(ParsingConfig {
            header_re,
            subject_re,
            min_percentage: min,
            max_percentage: max,
        })
    }
}

fn compile(
    pattern: Option<String>,
    kind: &'static str,
    required: &[&str],
) -> Result<Option<Regex>, ConfigError> {
    let Some(pattern) = pattern else {
        return Ok(None);
    };
    let re = Regex::new(&pattern)?;
    let missing = patterns::missing_groups(&re, required);
    if !missing.is_empty() {
        return Err(ConfigError::MissingGroups {
            kind,
            groups: missing.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(Some(re))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_builtin_patterns() {
        let config = ParsingConfigBuilder::new().build().unwrap();
        assert!(config.header_re.is_none());
        assert!(config.subject_re.is_none());
        assert_eq!(config.percentage_range(), (0.0, 100.0));
        assert!(config.header_re().is_match("1 RA1234567890123 JOHN"));
    }

    #[test]
    fn invalid_regex_fails_fast() {
        let err = ParsingConfigBuilder::new()
            .subject_regex(r"(?P<code>[A-Z")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Regex(_)));
    }

    #[test]
    fn pattern_without_required_groups_is_rejected() {
        let err = ParsingConfigBuilder::new()
            .header_regex(r"(?P<seq>\d+)\s+(?P<reg>RA\d{13})")
            .build()
            .unwrap_err();
        match err {
            ConfigError::MissingGroups { kind, groups } => {
                assert_eq!(kind, "header");
                assert_eq!(groups, vec!["name".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = ParsingConfigBuilder::new()
            .percentage_range(100.0, 0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn from_config_file_carries_overrides() {
        let section = ParsingConfigFile {
            header_pattern: None,
            subject_pattern: Some(r"(?P<code>\d{2}[A-Z]{4}\d{3})\s+(?P<pct>\d+\.\d+)".into()),
            min_percentage: None,
            max_percentage: Some(120.0),
        };
        let config = ParsingConfigBuilder::from_config_file(&section)
            .build()
            .unwrap();
        assert!(config.subject_re().is_match("22ABCD101 75.0"));
        assert_eq!(config.percentage_range(), (0.0, 120.0));
    }
}
