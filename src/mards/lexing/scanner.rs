//! Line scanner
//!
//! A 4-mode character scanner over one line: `beginning` counts leading
//! whitespace (spaces 1, tabs 4), `key` accumulates the entry name,
//! `pre-value` skips separator spaces, `value` absorbs the remainder
//! verbatim. The finished value is trimmed and a single wrapping pair of
//! matching `"` or `'` quotes is dropped, which is how values keep
//! significant interior or edge whitespace.
//!
//! Strict mode is unforgiving: any whitespace other than a plain space
//! before or inside the key is an error, and the indent must be a whole
//! multiple of 4 spaces. Adaptive mode never produces an error.

use super::tab_stops::TabStops;
use thiserror::Error;

/// A problem found while scanning a single line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("non-space whitespace character found before key")]
    WhitespaceBeforeKey,
    #[error("non-space whitespace character found inside key")]
    WhitespaceInsideKey,
    #[error("indent found that is not a multiple of 4 spaces: '{snippet}'")]
    RaggedIndent { snippet: String },
}

/// The pieces of one scanned line
///
/// A blank or comment line yields all-`None`. A line that scanned with an
/// error carries the error and must not be appended to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScannedLine {
    pub indent: Option<usize>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub error: Option<ScanError>,
}

impl ScannedLine {
    fn skip() -> Self {
        ScannedLine::default()
    }

    fn fail(error: ScanError) -> Self {
        ScannedLine {
            error: Some(error),
            ..ScannedLine::default()
        }
    }
}

enum Mode {
    Beginning,
    Key,
    PreValue,
    Value,
}

/// Scan one line against the current tab stops
pub fn scan_line(line: &str, tabs: &mut TabStops, strict: bool, key_open: bool) -> ScannedLine {
    if line.trim().is_empty() {
        return ScannedLine::skip();
    }
    let mut space_ctr: usize = 0;
    let mut key = String::new();
    let mut value: Option<String> = None;
    let mut mode = Mode::Beginning;
    for c in line.chars() {
        match mode {
            Mode::Beginning => {
                if c == ' ' {
                    space_ctr += 1;
                } else if c == '\n' {
                    return ScannedLine::skip();
                } else if c == '#' && !key_open {
                    return ScannedLine::skip();
                } else if c.is_whitespace() && strict {
                    return ScannedLine::fail(ScanError::WhitespaceBeforeKey);
                } else if c == '\t' {
                    space_ctr += 4;
                } else if c.is_whitespace() {
                    space_ctr += 1;
                } else {
                    key.push(c);
                    mode = Mode::Key;
                }
            }
            Mode::Key => {
                if c == ' ' {
                    mode = Mode::PreValue;
                } else if c.is_whitespace() && strict {
                    return ScannedLine::fail(ScanError::WhitespaceInsideKey);
                } else if c.is_whitespace() {
                    mode = Mode::PreValue;
                } else {
                    key.push(c);
                }
            }
            Mode::PreValue => {
                if c != ' ' {
                    value = Some(String::from(c));
                    mode = Mode::Value;
                }
            }
            Mode::Value => {
                if let Some(ref mut v) = value {
                    v.push(c);
                }
            }
        }
    }

    let value = value.map(|v| strip_quotes(v.trim()).to_string());

    let indent = if strict {
        if space_ctr % 4 != 0 {
            let snippet: String = line.trim().chars().take(20).collect();
            return ScannedLine::fail(ScanError::RaggedIndent { snippet });
        }
        space_ctr / 4
    } else {
        tabs.resolve(space_ctr)
    };

    ScannedLine {
        indent: Some(indent),
        key: Some(key),
        value,
        error: None,
    }
}

/// Drop one wrapping pair of matching quote characters, if present
fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 {
        let double = value.starts_with('"') && value.ends_with('"');
        let single = value.starts_with('\'') && value.ends_with('\'');
        if double || single {
            return &value[1..value.len() - 1];
        }
    }
    value
}
