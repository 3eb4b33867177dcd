//! Line scanning
//!
//! Turns one line of text into `(indent, key, value)`:
//! - `scanner` - the 4-mode character scanner (beginning, key, pre-value,
//!   value) with quote stripping and strict-mode whitespace policing
//! - `tab_stops` - the adaptive indentation stack that maps raw
//!   leading-whitespace widths onto nesting levels
//!
//! Strict mode demands 4-space indents and errors on anything else;
//! adaptive mode never errors and re-bases stops as widths drift.

pub mod scanner;
pub mod tab_stops;

pub use scanner::{scan_line, ScanError, ScannedLine};
pub use tab_stops::TabStops;
