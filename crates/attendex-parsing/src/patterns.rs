//! Named pattern definitions for the report layout.
//!
//! Every structural assumption about the report text lives here, so a new
//! subject-code shape or registration format is a change to one constant.
//! Custom patterns supplied through [`ParsingConfig`](crate::ParsingConfig)
//! must expose the same named groups.

use once_cell::sync::Lazy;
use regex::Regex;

/// Registration id: two upper-case letters and exactly 13 digits.
///
/// Digit classes are ASCII-only throughout: `\d` would also match
/// fullwidth or Arabic-Indic digits that `str::parse` rejects.
pub const REGISTRATION_ID_PATTERN: &str = r"[A-Z]{2}[0-9]{13}";

/// Student name: upper-case words separated by single spaces.
pub const STUDENT_NAME_PATTERN: &str = r"[A-Z]+(?: [A-Z]+)*";

/// Subject code: 2-digit batch, 3-letter department, 3-digit course number,
/// optional type letter (`T`, `L`, `J`, ...), optional `(X)` elective suffix.
pub const SUBJECT_CODE_PATTERN: &str = r"[0-9]{2}[A-Z]{3}[0-9]{3}[A-Z]?(?:\([A-Z]\))?";

/// Attendance percentage as printed: 2-3 integer digits, a dot, decimals.
pub const PERCENTAGE_PATTERN: &str = r"[0-9]{2,3}\.[0-9]+";

/// Groups a header pattern must define.
pub const HEADER_GROUPS: [&str; 3] = ["seq", "reg", "name"];

/// Groups a subject pattern must define.
pub const SUBJECT_GROUPS: [&str; 2] = ["code", "pct"];

/// `<seq> <registration id> <NAME>` marking the start of a student block.
pub fn student_header_pattern() -> String {
    format!(
        r"(?P<seq>[0-9]+)\s+(?P<reg>{REGISTRATION_ID_PATTERN})\s+(?P<name>{STUDENT_NAME_PATTERN})"
    )
}

/// `<subject code> <percentage>`, separated by any whitespace including
/// line breaks. No leading word boundary: a code glued to preceding text
/// (`S21CSE101`) still counts.
pub fn subject_attendance_pattern() -> String {
    format!(r"(?P<code>{SUBJECT_CODE_PATTERN})\s+(?P<pct>{PERCENTAGE_PATTERN})")
}

pub(crate) static STUDENT_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&student_header_pattern()).unwrap());

pub(crate) static SUBJECT_ATTENDANCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&subject_attendance_pattern()).unwrap());

/// Names from `required` that `re` does not define as capture groups.
pub(crate) fn missing_groups<'a>(re: &Regex, required: &[&'a str]) -> Vec<&'a str> {
    let names: Vec<&str> = re.capture_names().flatten().collect();
    required
        .iter()
        .copied()
        .filter(|g| !names.contains(g))
        .collect()
}
