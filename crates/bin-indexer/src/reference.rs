//! Country and currency reference data
//!
//! Codes are resolved against static ISO 3166-1 and ISO 4217 tables. A miss
//! is not an error: the normalizer substitutes an "Unknown" placeholder.

mod countries;
mod currencies;

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::FieldValue;

/// One row of an ISO table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoEntry {
    pub numeric: &'static str,
    pub alpha3: &'static str,
    pub name: &'static str,
}

impl IsoEntry {
    /// `{Code, Alpha3, Name}` object stored in the semantic record
    pub fn to_value(&self) -> FieldValue {
        FieldValue::object([
            ("Code", self.numeric),
            ("Alpha3", self.alpha3),
            ("Name", self.name),
        ])
    }
}

/// Lookup contract used by the normalizer
pub trait ReferenceData {
    /// Resolve a numeric (`"840"`, `"40"`) or alpha-3 (`"USA"`) country code
    fn lookup_country(&self, code: &str) -> Option<IsoEntry>;

    /// Resolve a numeric currency code
    fn lookup_currency(&self, code: &str) -> Option<IsoEntry>;
}

/// Built-in ISO tables
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoTables;

struct Indexed {
    by_numeric: HashMap<&'static str, IsoEntry>,
    by_alpha3: HashMap<&'static str, IsoEntry>,
}

impl Indexed {
    fn build(rows: &'static [(&'static str, &'static str, &'static str)]) -> Self {
        let entries = rows.iter().map(|&(numeric, alpha3, name)| IsoEntry {
            numeric,
            alpha3,
            name,
        });

        Self {
            by_numeric: entries.clone().map(|e| (e.numeric, e)).collect(),
            by_alpha3: entries.map(|e| (e.alpha3, e)).collect(),
        }
    }

    fn numeric(&self, code: &str) -> Option<IsoEntry> {
        let padded = pad_numeric(code)?;
        self.by_numeric.get(padded.as_str()).copied()
    }

    fn alpha3(&self, code: &str) -> Option<IsoEntry> {
        self.by_alpha3.get(code.to_ascii_uppercase().as_str()).copied()
    }
}

static COUNTRY_INDEX: LazyLock<Indexed> = LazyLock::new(|| Indexed::build(countries::COUNTRIES));
static CURRENCY_INDEX: LazyLock<Indexed> = LazyLock::new(|| Indexed::build(currencies::CURRENCIES));

/// Zero-pad an all-digit code to three characters
fn pad_numeric(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() || code.len() > 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{:0>3}", code))
}

impl ReferenceData for IsoTables {
    fn lookup_country(&self, code: &str) -> Option<IsoEntry> {
        let code = code.trim();
        if code.bytes().all(|b| b.is_ascii_digit()) {
            COUNTRY_INDEX.numeric(code)
        } else {
            COUNTRY_INDEX.alpha3(code)
        }
    }

    fn lookup_currency(&self, code: &str) -> Option<IsoEntry> {
        CURRENCY_INDEX.numeric(code)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_country_by_numeric() {
        let entry = IsoTables.lookup_country("724").unwrap();
        assert_eq!(entry.alpha3, "ESP");
        assert_eq!(entry.name, "Spain");
    }

    #[test]
    fn test_country_numeric_is_zero_padded() {
        let entry = IsoTables.lookup_country("40").unwrap();
        assert_eq!(entry.numeric, "040");
        assert_eq!(entry.alpha3, "AUT");
    }

    #[test]
    fn test_country_by_alpha3() {
        let entry = IsoTables.lookup_country("usa").unwrap();
        assert_eq!(entry.numeric, "840");
        assert_eq!(entry.name, "United States");
    }

    #[test]
    fn test_unknown_country() {
        assert!(IsoTables.lookup_country("XYZ").is_none());
        assert!(IsoTables.lookup_country("999").is_none());
        assert!(IsoTables.lookup_country("").is_none());
    }

    #[test]
    fn test_currency_lookup() {
        let entry = IsoTables.lookup_currency("978").unwrap();
        assert_eq!(entry.alpha3, "EUR");
        assert_eq!(entry.name, "Euro");

        assert!(IsoTables.lookup_currency("EUR").is_none());
        assert!(IsoTables.lookup_currency("000").is_none());
    }

    #[test]
    fn test_entry_value_shape() {
        let value = IsoTables.lookup_currency("840").unwrap().to_value();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({ "Code": "840", "Alpha3": "USD", "Name": "US Dollar" })
        );
    }
}
