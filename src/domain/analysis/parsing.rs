//! Parsers for the constrained plain-text formats the agents request.
//!
//! Model output format compliance is the fragile part of the pipeline, so
//! these are pure functions tested on their own rather than string scanning
//! inlined in agent code.

/// Extracts the value from the first line containing `marker`.
///
/// Falls back to the first line when no line carries the marker (models
/// occasionally drop the prefix but still lead with the answer). Returns
/// `None` when the extracted value is blank.
pub fn marker_line(text: &str, marker: &str) -> Option<String> {
    let line = text
        .lines()
        .find(|l| l.contains(marker))
        .map(|l| {
            let idx = l.find(marker).unwrap_or(0);
            &l[idx + marker.len()..]
        })
        .or_else(|| text.lines().next());

    line.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// ISO mappings parsed from the two-line constrained format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoMappings {
    pub iso27001: Option<String>,
    pub iso27002: Option<String>,
}

/// Parses `ISO27001:` / `ISO27002:` prefixed lines.
///
/// A missing or blank line yields `None` for that field so result assembly
/// can apply the "Non mappé" placeholder instead of an empty string.
pub fn parse_iso_lines(text: &str) -> IsoMappings {
    let field = |prefix: &str| {
        text.lines()
            .find_map(|l| l.strip_prefix(prefix))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    };

    IsoMappings {
        iso27001: field("ISO27001:"),
        iso27002: field("ISO27002:"),
    }
}
