//! County identifier normalization.
//!
//! Sources spell the same county code in several ways: a five-digit string,
//! a spreadsheet float (`1073.0`), a split state/county pair, or no code at
//! all (name and state only). Everything funnels into [`CountyFips`] or a
//! [`CountyKey`] here.

use chr_model::{CountyFips, CountyKey, state_abbreviation, state_name};
use thiserror::Error;

/// Why an identifier could not be derived. Always per-row, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("empty identifier")]
    Empty,
    #[error("malformed identifier '{0}'")]
    Malformed(String),
    #[error("aggregate identifier '{0}'")]
    Aggregate(String),
    #[error("unknown state '{0}'")]
    UnknownState(String),
    #[error("empty county name")]
    EmptyName,
}

/// Strips a spreadsheet float suffix (`1073.0` → `1073`).
///
/// Returns `None` when the fractional part is not all zeros.
fn strip_float_suffix(value: &str) -> Option<&str> {
    match value.split_once('.') {
        Some((whole, fraction)) if fraction.bytes().all(|b| b == b'0') => Some(whole),
        Some(_) => None,
        None => Some(value),
    }
}

fn pad_digits(raw: &str, width: usize) -> Result<String, IdentifierError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdentifierError::Empty);
    }
    let digits = strip_float_suffix(trimmed)
        .filter(|digits| !digits.is_empty())
        .filter(|digits| digits.len() <= width)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| IdentifierError::Malformed(trimmed.to_string()))?;
    Ok(format!("{digits:0>width$}"))
}

/// Normalizes a direct county code to five zero-padded digits.
///
/// Aggregate codes are returned as-is; see [`reject_aggregate`].
pub fn normalize_fips(raw: &str) -> Result<CountyFips, IdentifierError> {
    let padded = pad_digits(raw, 5)?;
    CountyFips::new(padded).map_err(|_| IdentifierError::Malformed(raw.trim().to_string()))
}

/// Joins a state code (2 digits) and county code (3 digits).
pub fn normalize_split_fips(state: &str, county: &str) -> Result<CountyFips, IdentifierError> {
    let state = pad_digits(state, 2)?;
    let county = pad_digits(county, 3)?;
    normalize_fips(&format!("{state}{county}"))
}

/// Rejects state and national rollups unless the table is state-level.
pub fn reject_aggregate(
    fips: CountyFips,
    allow_aggregates: bool,
) -> Result<CountyFips, IdentifierError> {
    if fips.is_aggregate() && !allow_aggregates {
        return Err(IdentifierError::Aggregate(fips.into()));
    }
    Ok(fips)
}

/// Lowercase county name with whitespace collapsed and a trailing
/// `County`/`Parish` removed.
pub fn normalize_county_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = collapsed.to_ascii_lowercase();
    for suffix in [" county", " parish"] {
        if let Some(stripped) = lower.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    lower
}

/// Two-letter abbreviation for either a full state name or an abbreviation.
pub fn resolve_state_abbr(state: &str) -> Result<&'static str, IdentifierError> {
    let state = state.trim();
    if state.len() == 2
        && let Some(abbr) = state_name(state).and_then(state_abbreviation)
    {
        return Ok(abbr);
    }
    state_abbreviation(state).ok_or_else(|| IdentifierError::UnknownState(state.to_string()))
}

/// Full state name for output; falls back to the trimmed input.
pub fn display_state(state: &str) -> String {
    let state = state.trim();
    if state.len() == 2
        && let Some(name) = state_name(state)
    {
        return name.to_string();
    }
    state.to_string()
}

/// Composite join key for rows that carry no county code.
pub fn county_key(name: &str, state: &str) -> Result<CountyKey, IdentifierError> {
    let name = normalize_county_name(name);
    if name.is_empty() {
        return Err(IdentifierError::EmptyName);
    }
    let abbr = resolve_state_abbr(state)?;
    Ok(CountyKey::new(name, abbr))
}
