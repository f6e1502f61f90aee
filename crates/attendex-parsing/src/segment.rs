use std::ops::Range;

use crate::ParsingError;
use crate::config::ParsingConfig;

/// The identity fields captured by a student header match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentHeader<'a> {
    pub sequence_number: u32,
    pub registration_id: &'a str,
    /// Trimmed name.
    pub full_name: &'a str,
}

/// The slice of report text attributed to one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub header: StudentHeader<'a>,
    /// Byte range of the header match in the full text.
    pub header_span: Range<usize>,
    /// Text from the end of this header to the start of the next one
    /// (or the end of the text).
    pub body: &'a str,
}

/// Split report text into one segment per student header, in text order.
///
/// No header matches is not an error: the result is simply empty.
pub fn segment_students(text: &str) -> Result<Vec<Segment<'_>>, ParsingError> {
    segment_students_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`segment_students`].
pub(crate) fn segment_students_with_config<'a>(
    text: &'a str,
    config: &ParsingConfig,
) -> Result<Vec<Segment<'a>>, ParsingError> {
    let re = config.header_re();
    let matches: Vec<_> = re.captures_iter(text).collect();

    let mut segments = Vec::with_capacity(matches.len());
    for (i, caps) in matches.iter().enumerate() {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
        let group = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

        let registration_id = group("reg");
        let seq = group("seq");
        let sequence_number =
            seq.parse::<u32>()
                .map_err(|source| ParsingError::InvalidSequenceNumber {
                    registration_id: registration_id.to_string(),
                    value: seq.to_string(),
                    source,
                })?;

        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        segments.push(Segment {
            header: StudentHeader {
                sequence_number,
                registration_id,
                full_name: group("name").trim(),
            },
            body: &text[whole.end..end],
            header_span: whole,
        });
    }

    tracing::debug!(headers = segments.len(), "segmented student blocks");
    Ok(segments)
}
