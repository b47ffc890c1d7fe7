//! Pure normalization functions shared by every source.

pub mod identifier;
pub mod numeric;
pub mod year;

pub use identifier::{
    IdentifierError, county_key, display_state, normalize_county_name, normalize_fips,
    normalize_split_fips, reject_aggregate, resolve_state_abbr,
};
pub use numeric::{MISSING_TOKENS, NumericError, parse_metric_value, parse_numeric};
pub use year::{ReleaseTable, YearError, parse_year_label};
