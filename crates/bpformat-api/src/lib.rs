//! Buildpack API versions.
//!
//! Every data-format file is read and written against a declared buildpack
//! API version (`major.minor`, optionally prefixed with `v`). Codecs compare
//! that version against a fixed threshold with [`ApiVersion::at_least`] and
//! [`ApiVersion::less_than`], which partition all versions into exactly two
//! sides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("could not parse '{0}' as version, expected <major>.<minor>")]
    Invalid(String),
}

/// A buildpack API version.
///
/// Ordering is numeric on `(major, minor)`, so `0.10 > 0.9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion {
    major: u32,
    minor: u32,
}

/// First API whose layer metadata keeps `build`, `launch` and `cache` in a `types` table.
pub const LAYER_TYPES_TABLE: ApiVersion = ApiVersion::new(0, 6);

/// First API that expects requirement versions under `metadata.version`.
pub const PLAN_METADATA_VERSION: ApiVersion = ApiVersion::new(0, 3);

/// First API whose process `command` is a list of strings and which drops `direct`.
pub const PROCESS_COMMAND_LIST: ApiVersion = ApiVersion::new(0, 9);

/// Buildpack APIs this workspace knows how to read and write.
pub const SUPPORTED_BUILDPACK_APIS: &[ApiVersion] = &[
    ApiVersion::new(0, 2),
    ApiVersion::new(0, 3),
    ApiVersion::new(0, 4),
    ApiVersion::new(0, 5),
    ApiVersion::new(0, 6),
    ApiVersion::new(0, 7),
    ApiVersion::new(0, 8),
    ApiVersion::new(0, 9),
];

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `"0.6"`, `"v0.6"` or `"1"` (minor defaults to zero).
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let invalid = || ApiError::Invalid(input.to_owned());
        let trimmed = input.strip_prefix('v').unwrap_or(input);
        let (major_raw, minor_raw) = match trimmed.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (trimmed, None),
        };
        let major = parse_component(major_raw).ok_or_else(invalid)?;
        let minor = match minor_raw {
            Some(raw) => parse_component(raw).ok_or_else(invalid)?,
            None => 0,
        };
        Ok(Self { major, minor })
    }

    /// The newest API in [`SUPPORTED_BUILDPACK_APIS`].
    pub const fn latest() -> Self {
        SUPPORTED_BUILDPACK_APIS[SUPPORTED_BUILDPACK_APIS.len() - 1]
    }

    pub fn at_least(&self, other: &ApiVersion) -> bool {
        self >= other
    }

    pub fn less_than(&self, other: &ApiVersion) -> bool {
        self < other
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_BUILDPACK_APIS.contains(self)
    }
}

fn parse_component(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApiVersion> for String {
    fn from(value: ApiVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_major_minor() {
        assert_eq!(ApiVersion::parse("0.6").unwrap(), ApiVersion::new(0, 6));
        assert_eq!(ApiVersion::parse("2.13").unwrap(), ApiVersion::new(2, 13));
    }

    #[test]
    fn parses_v_prefix_and_bare_major() {
        assert_eq!(ApiVersion::parse("v0.9").unwrap(), ApiVersion::new(0, 9));
        assert_eq!(ApiVersion::parse("1").unwrap(), ApiVersion::new(1, 0));
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["", "0.x", "1.2.3", "a.b", ".5", "1.", "-1.0", "0.+1"] {
            assert!(ApiVersion::parse(bad).is_err(), "'{bad}' must not parse");
        }
    }

    #[test]
    fn compares_numerically() {
        let v09 = ApiVersion::new(0, 9);
        let v010 = ApiVersion::parse("0.10").unwrap();
        assert!(v010.at_least(&v09));
        assert!(v09.less_than(&v010));
        assert!(ApiVersion::new(1, 0).at_least(&v010));
    }

    #[test]
    fn at_least_and_less_than_partition() {
        for minor in 0..12 {
            let v = ApiVersion::new(0, minor);
            assert_ne!(
                v.at_least(&LAYER_TYPES_TABLE),
                v.less_than(&LAYER_TYPES_TABLE),
                "{v} must fall on exactly one side"
            );
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(LAYER_TYPES_TABLE.at_least(&ApiVersion::new(0, 6)));
        assert!(!LAYER_TYPES_TABLE.less_than(&ApiVersion::new(0, 6)));
    }

    #[test]
    fn display_round_trips() {
        let v: ApiVersion = "v0.7".parse().unwrap();
        assert_eq!(v.to_string(), "0.7");
    }

    #[test]
    fn serde_as_string() {
        let v = ApiVersion::new(0, 8);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"0.8\"");
        let back: ApiVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<ApiVersion>("\"zero\"").is_err());
    }

    #[test]
    fn latest_is_newest_supported() {
        let newest = SUPPORTED_BUILDPACK_APIS.iter().max().copied().unwrap();
        assert_eq!(ApiVersion::latest(), newest);
        assert_eq!(
            Some(&ApiVersion::latest()),
            SUPPORTED_BUILDPACK_APIS.last()
        );
    }

    #[test]
    fn supported_list() {
        assert!(ApiVersion::new(0, 5).is_supported());
        assert!(ApiVersion::latest().is_supported());
        assert!(!ApiVersion::new(0, 1).is_supported());
    }
}
