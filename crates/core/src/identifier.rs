//! Numeric identifiers embedded in asset filenames.
//!
//! Certificates and QR codes are paired by the first run of decimal digits in
//! their filenames (`CE_07.jpg` pairs with `QR_07.png`). The prefix is never
//! interpreted.

/// Identifier assigned to filenames without any digit run.
pub const UNMATCHED_ID: i64 = -1;

/// Prefix used for merged output names.
pub const OUTPUT_PREFIX: &str = "MERGED_";

/// Extract the identifier from a filename.
///
/// Scans left to right for the first maximal run of ASCII digits and parses it
/// as base 10 (`"CE_007"` is 7). Returns [`UNMATCHED_ID`] when no digit is
/// present. Runs too long for `i64` saturate to `i64::MAX`.
pub fn identifier_of(filename: &str) -> i64 {
    let digits: String = filename
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return UNMATCHED_ID;
    }

    digits.parse::<i64>().unwrap_or(i64::MAX)
}

/// Whether an identifier can take part in pairing.
pub fn is_matchable(identifier: i64) -> bool {
    identifier != UNMATCHED_ID
}

/// Output name for a merged certificate, zero-padded to at least two digits.
///
/// The archive writer appends the `.jpg` extension.
pub fn format_output_name(identifier: i64) -> String {
    format!("{OUTPUT_PREFIX}{identifier:02}")
}
