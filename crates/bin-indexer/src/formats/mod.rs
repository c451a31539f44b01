//! Supported provider/version formats
//!
//! Formats are named `Provider_Version` on the command line (case does not
//! matter) and resolve to a validated [`FormatDescriptor`].

pub mod mastercard_simplified;
pub mod redsys_v3_8;

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;

use crate::descriptor::FormatDescriptor;
use crate::error::ConfigError;
use crate::models::{FieldValue, SemanticRecord, HIGH_ACCOUNT_RANGE, LOW_ACCOUNT_RANGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    RedsysV3_8,
    MastercardSimplified,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::RedsysV3_8, Format::MastercardSimplified];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::RedsysV3_8 => redsys_v3_8::NAME,
            Format::MastercardSimplified => mastercard_simplified::NAME,
        }
    }

    pub fn descriptor(&self) -> Result<FormatDescriptor, ConfigError> {
        match self {
            Format::RedsysV3_8 => redsys_v3_8::descriptor(),
            Format::MastercardSimplified => mastercard_simplified::descriptor(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        let (provider, version) = lowered
            .split_once('_')
            .ok_or_else(|| ConfigError::MalformedFormat(s.to_string()))?;

        match (provider, version) {
            ("redsys", "3.8") => Ok(Format::RedsysV3_8),
            ("mastercard", "simplified") => Ok(Format::MastercardSimplified),
            ("redsys" | "mastercard", other) => Err(ConfigError::UnsupportedVersion(other.to_string())),
            ("visa", _) => Err(ConfigError::UnsupportedFormat(provider.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Parse an account bound into an integer; unparseable text is kept so the
/// orchestrator can report it with its line number
fn account_bound(record: &SemanticRecord, field: &str) -> FieldValue {
    match record.get(field) {
        Some(FieldValue::Text(raw)) => raw
            .trim()
            .parse::<BigUint>()
            .map(FieldValue::Integer)
            .unwrap_or_else(|_| FieldValue::Text(raw.clone())),
        Some(other) => other.clone(),
        None => FieldValue::text(""),
    }
}

pub(crate) fn low_account_range(record: &SemanticRecord) -> FieldValue {
    account_bound(record, LOW_ACCOUNT_RANGE)
}

pub(crate) fn high_account_range(record: &SemanticRecord) -> FieldValue {
    account_bound(record, HIGH_ACCOUNT_RANGE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("redsys_3.8".parse::<Format>().unwrap(), Format::RedsysV3_8);
        assert_eq!("Redsys_3.8".parse::<Format>().unwrap(), Format::RedsysV3_8);
        assert_eq!(
            "mastercard_simplified".parse::<Format>().unwrap(),
            Format::MastercardSimplified
        );
    }

    #[test]
    fn test_format_errors() {
        let err = "redsys".parse::<Format>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Format 'redsys' is invalid. It should be in the form 'Provider_Version'."
        );

        let err = "redsys_4.0".parse::<Format>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported version: 4.0");

        let err = "Visa_1.0".parse::<Format>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format: visa");

        let err = "Amex_2.1".parse::<Format>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format: Amex_2.1");
    }

    #[test]
    fn test_every_descriptor_validates() {
        for format in Format::ALL {
            let descriptor = format.descriptor().unwrap();
            assert_eq!(descriptor.name, format.as_str());
            assert_eq!(format.as_str().parse::<Format>().unwrap(), format);
        }
    }

    #[test]
    fn test_account_bound() {
        let record: SemanticRecord =
            [(LOW_ACCOUNT_RANGE, "0400002000000000000"), (HIGH_ACCOUNT_RANGE, "4000x")]
                .into_iter()
                .collect();

        assert_eq!(
            low_account_range(&record),
            FieldValue::Integer(BigUint::from(400002000000000000u64))
        );
        assert_eq!(high_account_range(&record), FieldValue::text("4000x"));
    }
}
