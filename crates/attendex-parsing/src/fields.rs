use attendex_core::AttendanceMap;

use crate::ParsingError;
use crate::config::ParsingConfig;

/// One `(subject code, percentage)` pair found in a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectField<'a> {
    pub code: &'a str,
    pub percentage: f64,
}

/// Find every subject/percentage pair in one student's segment, in match
/// order. Repeated subjects are all returned.
pub fn extract_fields(segment: &str) -> Result<Vec<SubjectField<'_>>, ParsingError> {
    extract_fields_with_config(segment, &ParsingConfig::default())
}

/// Config-aware version of [`extract_fields`].
pub(crate) fn extract_fields_with_config<'a>(
    segment: &'a str,
    config: &ParsingConfig,
) -> Result<Vec<SubjectField<'a>>, ParsingError> {
    config
        .subject_re()
        .captures_iter(segment)
        .map(|caps| {
            let code = caps.name("code").map(|m| m.as_str().trim()).unwrap_or_default();
            let raw = caps.name("pct").map(|m| m.as_str()).unwrap_or_default();
            let percentage = parse_percentage_with_config(code, raw, config)?;
            Ok(SubjectField { code, percentage })
        })
        .collect()
}

/// Parse a captured percentage, rejecting anything non-numeric, non-finite,
/// or outside 0..=100.
pub fn parse_percentage(code: &str, raw: &str) -> Result<f64, ParsingError> {
    parse_percentage_with_config(code, raw, &ParsingConfig::default())
}

pub(crate) fn parse_percentage_with_config(
    code: &str,
    raw: &str,
    config: &ParsingConfig,
) -> Result<f64, ParsingError> {
    let invalid = |reason: String| ParsingError::InvalidPercentage {
        subject: code.to_string(),
        value: raw.to_string(),
        reason,
    };

    let value: f64 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if !value.is_finite() {
        return Err(invalid("not a finite number".into()));
    }
    let (min, max) = config.percentage_range();
    if value < min || value > max {
        return Err(invalid(format!("outside {min}..={max}")));
    }
    Ok(value)
}

/// Fold pairs into an attendance map; a later duplicate overwrites an
/// earlier one.
pub fn attendance_map(fields: &[SubjectField<'_>]) -> AttendanceMap {
    let mut map = AttendanceMap::new();
    for field in fields {
        map.insert(field.code.to_string(), field.percentage);
    }
    map
}
