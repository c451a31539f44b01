//! Conditional translation engine
//!
//! Turns raw provider codes into human-readable values. A rule targets one
//! field and carries one of three behaviors:
//!
//! - **Exact**: dictionary lookup; a miss keeps the raw value
//! - **Conditional**: exact keys first, then `>=`, `<=`, `>`, `<` thresholds
//!   in declaration order, then [`UNKNOWN`]
//! - **Derived**: a pure function of the record translated so far
//!
//! Rules are applied as a fold: every rule sees the snapshot produced by the
//! rules declared before it.

use std::collections::HashMap;
use std::fmt;

use num_bigint::{BigInt, ParseBigIntError};

use crate::error::ConfigError;
use crate::models::{FieldValue, SemanticRecord};

/// Fallback for conditional tables and derived lookups that find nothing
pub const UNKNOWN: &str = "Unknown";

/// Pure function computing a field value from the current record
pub type DeriveFn = fn(&SemanticRecord) -> FieldValue;

/// One translation step
#[derive(Debug, Clone)]
pub struct TranslationRule {
    pub field: String,
    pub behavior: RuleBehavior,
}

impl TranslationRule {
    pub fn exact(field: &str, table: ExactTable) -> Self {
        Self {
            field: field.to_string(),
            behavior: RuleBehavior::Exact(table),
        }
    }

    pub fn conditional(field: &str, table: ConditionalTable) -> Self {
        Self {
            field: field.to_string(),
            behavior: RuleBehavior::Conditional(table),
        }
    }

    pub fn derived(field: &str, derive: DeriveFn) -> Self {
        Self {
            field: field.to_string(),
            behavior: RuleBehavior::Derived(derive),
        }
    }
}

#[derive(Clone)]
pub enum RuleBehavior {
    Exact(ExactTable),
    Conditional(ConditionalTable),
    Derived(DeriveFn),
}

impl fmt::Debug for RuleBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleBehavior::Exact(table) => f.debug_tuple("Exact").field(table).finish(),
            RuleBehavior::Conditional(table) => f.debug_tuple("Conditional").field(table).finish(),
            RuleBehavior::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Raw code to translated value
#[derive(Debug, Clone, Default)]
pub struct ExactTable {
    entries: HashMap<String, FieldValue>,
}

impl ExactTable {
    pub fn from_pairs<V>(pairs: &[(&str, V)]) -> Self
    where
        V: Clone + Into<FieldValue>,
    {
        Self {
            entries: pairs
                .iter()
                .map(|(code, value)| (code.to_string(), value.clone().into()))
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&FieldValue> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtLeast,
    AtMost,
    GreaterThan,
    LessThan,
}

impl Comparison {
    fn holds(self, value: &BigInt, threshold: &BigInt) -> bool {
        match self {
            Comparison::AtLeast => value >= threshold,
            Comparison::AtMost => value <= threshold,
            Comparison::GreaterThan => value > threshold,
            Comparison::LessThan => value < threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Exact(String),
    Threshold(Comparison, BigInt),
}

impl Condition {
    /// Parse a table key such as `"00"` or `">=50"`
    fn parse(key: &str) -> Result<Self, ParseBigIntError> {
        // Two-character operators must be tried before their one-character prefixes
        let threshold = [
            (">=", Comparison::AtLeast),
            ("<=", Comparison::AtMost),
            (">", Comparison::GreaterThan),
            ("<", Comparison::LessThan),
        ]
        .into_iter()
        .find_map(|(prefix, cmp)| key.strip_prefix(prefix).map(|rest| (cmp, rest)));

        match threshold {
            Some((cmp, rest)) => Ok(Condition::Threshold(cmp, rest.trim().parse()?)),
            None => Ok(Condition::Exact(key.to_string())),
        }
    }
}

/// Ordered `(condition, value)` entries
#[derive(Debug, Clone, Default)]
pub struct ConditionalTable {
    entries: Vec<(Condition, String)>,
}

impl ConditionalTable {
    /// Build from declaration-ordered pairs; a malformed threshold is a
    /// configuration error
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, ConfigError> {
        let entries = pairs
            .iter()
            .map(|(key, value)| {
                Condition::parse(key)
                    .map(|condition| (condition, value.to_string()))
                    .map_err(|e| {
                        ConfigError::invalid_descriptor(
                            "conditional table",
                            format!("threshold '{}' is not an integer: {}", key, e),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Resolve a raw value: exact keys win over thresholds regardless of
    /// declaration order
    pub fn resolve(&self, value: &str) -> &str {
        let exact = self.entries.iter().find_map(|(condition, translated)| match condition {
            Condition::Exact(key) if key == value => Some(translated.as_str()),
            _ => None,
        });
        if let Some(translated) = exact {
            return translated;
        }

        // Non-integer input matches no threshold
        let Ok(number) = value.trim().parse::<BigInt>() else {
            return UNKNOWN;
        };

        self.entries
            .iter()
            .find_map(|(condition, translated)| match condition {
                Condition::Threshold(cmp, threshold) if cmp.holds(&number, threshold) => {
                    Some(translated.as_str())
                },
                _ => None,
            })
            .unwrap_or(UNKNOWN)
    }
}

/// Evaluate one rule against the current record
///
/// Returns `None` when the rule leaves the record untouched (an exact rule
/// whose field is absent).
pub fn translate(rule: &TranslationRule, record: &SemanticRecord) -> Option<FieldValue> {
    match &rule.behavior {
        RuleBehavior::Exact(table) => {
            let current = record.get(&rule.field)?;
            let translated = current
                .as_text()
                .and_then(|code| table.get(code))
                .unwrap_or(current);
            Some(translated.clone())
        },
        RuleBehavior::Conditional(table) => {
            Some(FieldValue::text(table.resolve(record.text(&rule.field))))
        },
        RuleBehavior::Derived(derive) => Some(derive(record)),
    }
}

/// Fold every rule over the record, in order
pub fn apply_rules(rules: &[TranslationRule], record: SemanticRecord) -> SemanticRecord {
    rules.iter().fold(record, |snapshot, rule| match translate(rule, &snapshot) {
        Some(value) => snapshot.with_field(&rule.field, value),
        None => snapshot,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn issuer_types() -> ConditionalTable {
        ConditionalTable::from_pairs(&[
            ("00", "NATIONAL"),
            ("10", "NON-FINANCIAL"),
            ("20", "ANDORRAN"),
            (">=50", "FOREIGN"),
        ])
        .unwrap()
    }

    fn record(pairs: &[(&str, &str)]) -> SemanticRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_conditional_exact_and_threshold() {
        let table = issuer_types();
        assert_eq!(table.resolve("00"), "NATIONAL");
        assert_eq!(table.resolve("20"), "ANDORRAN");
        assert_eq!(table.resolve("50"), "FOREIGN");
        assert_eq!(table.resolve("75"), "FOREIGN");
        assert_eq!(table.resolve("30"), UNKNOWN);
    }

    #[test]
    fn test_exact_wins_over_threshold_declared_first() {
        let table = ConditionalTable::from_pairs(&[(">=50", "FOREIGN"), ("60", "SPECIAL")]).unwrap();
        assert_eq!(table.resolve("60"), "SPECIAL");
        assert_eq!(table.resolve("61"), "FOREIGN");
    }

    #[test]
    fn test_thresholds_resolve_in_declaration_order() {
        let table = ConditionalTable::from_pairs(&[(">10", "ABOVE TEN"), (">5", "ABOVE FIVE")]).unwrap();
        assert_eq!(table.resolve("20"), "ABOVE TEN");
        assert_eq!(table.resolve("7"), "ABOVE FIVE");

        let table = ConditionalTable::from_pairs(&[("<5", "LOW"), ("<=5", "AT MOST FIVE")]).unwrap();
        assert_eq!(table.resolve("5"), "AT MOST FIVE");
        assert_eq!(table.resolve("4"), "LOW");
    }

    #[test]
    fn test_non_integer_value_is_unknown() {
        assert_eq!(issuer_types().resolve("XX"), UNKNOWN);
        assert_eq!(issuer_types().resolve(""), UNKNOWN);
    }

    #[test]
    fn test_values_wider_than_64_bits_still_compare() {
        let table = issuer_types();
        assert_eq!(table.resolve("99999999999999999999"), "FOREIGN");
        assert_eq!(table.resolve("-99999999999999999999"), UNKNOWN);

        let table = ConditionalTable::from_pairs(&[(">18446744073709551616", "HUGE"), (">=0", "SMALL")]).unwrap();
        assert_eq!(table.resolve("18446744073709551617"), "HUGE");
        assert_eq!(table.resolve("18446744073709551616"), "SMALL");
    }

    #[test]
    fn test_malformed_threshold_is_config_error() {
        let err = ConditionalTable::from_pairs(&[(">=fifty", "FOREIGN")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_exact_miss_keeps_raw_value() {
        let rule = TranslationRule::exact("Brand", ExactTable::from_pairs(&[("01", "VISA")]));
        let out = translate(&rule, &record(&[("Brand", "77")]));
        assert_eq!(out, Some(FieldValue::text("77")));
    }

    #[test]
    fn test_exact_absent_field_is_untouched() {
        let rule = TranslationRule::exact("Brand", ExactTable::from_pairs(&[("01", "VISA")]));
        assert_eq!(translate(&rule, &SemanticRecord::new()), None);

        let out = apply_rules(&[rule], SemanticRecord::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_exact_table_with_flags() {
        let rule = TranslationRule::exact("Token", ExactTable::from_pairs(&[("0", false), ("1", true)]));
        assert_eq!(translate(&rule, &record(&[("Token", "1")])), Some(FieldValue::Flag(true)));
    }

    #[test]
    fn test_later_rules_observe_earlier_outputs() {
        fn describe(record: &SemanticRecord) -> FieldValue {
            FieldValue::text(format!("{} card", record.text("Brand")))
        }

        let rules = vec![
            TranslationRule::exact("Brand", ExactTable::from_pairs(&[("01", "VISA")])),
            TranslationRule::derived("Description", describe),
        ];

        let out = apply_rules(&rules, record(&[("Brand", "01")]));
        assert_eq!(out.text("Description"), "VISA card");
    }

    #[test]
    fn test_derived_sees_raw_value_of_later_field() {
        fn before(record: &SemanticRecord) -> FieldValue {
            FieldValue::text(record.text("Brand"))
        }

        let rules = vec![
            TranslationRule::derived("RawBrand", before),
            TranslationRule::exact("Brand", ExactTable::from_pairs(&[("01", "VISA")])),
        ];

        let out = apply_rules(&rules, record(&[("Brand", "01")]));
        assert_eq!(out.text("RawBrand"), "01");
        assert_eq!(out.text("Brand"), "VISA");
    }

    proptest! {
        #[test]
        fn prop_conditional_never_returns_raw_input(value in "[0-9A-Z]{0,4}") {
            let resolved = issuer_types().resolve(&value).to_string();
            let allowed = ["NATIONAL", "NON-FINANCIAL", "ANDORRAN", "FOREIGN", UNKNOWN];
            prop_assert!(allowed.contains(&resolved.as_str()));
        }

        #[test]
        fn prop_threshold_matches_integer_comparison(n in 0i64..1000) {
            let expected = match n {
                0 => "NATIONAL",
                10 => "NON-FINANCIAL",
                20 => "ANDORRAN",
                n if n >= 50 => "FOREIGN",
                _ => UNKNOWN,
            };
            let table = issuer_types();
            prop_assert_eq!(table.resolve(&format!("{:02}", n)), expected);
        }
    }
}
