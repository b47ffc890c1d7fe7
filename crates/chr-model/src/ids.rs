#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Five-digit county identifier (2-digit state code + 3-digit county code).
///
/// Only constructed through [`CountyFips::new`], so every value in the
/// pipeline is already zero-padded and all-digit.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct CountyFips(String);

impl CountyFips {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        if value.len() != 5 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError::InvalidFips(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn state_code(&self) -> &str {
        &self.0[..2]
    }

    pub fn county_code(&self) -> &str {
        &self.0[2..]
    }

    /// State or national rollup rows use a `000` county code.
    pub fn is_aggregate(&self) -> bool {
        self.county_code() == "000"
    }
}

impl fmt::Display for CountyFips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CountyFips {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountyFips> for String {
    fn from(value: CountyFips) -> Self {
        value.0
    }
}

/// Join key for releases that carry no county code.
///
/// Holds an already-normalized county name (lowercase, suffix stripped) and a
/// 2-letter state abbreviation. Never written to output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountyKey {
    name: String,
    state_abbr: String,
}

impl CountyKey {
    pub fn new(name: impl Into<String>, state_abbr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state_abbr: state_abbr.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_abbr(&self) -> &str {
        &self.state_abbr
    }
}

impl fmt::Display for CountyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.name, self.state_abbr)
    }
}
