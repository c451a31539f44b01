//! Mastercard simplified BIN account range table
//!
//! UTF-8 CSV with a header row. Countries are given as ISO alpha-3 codes.

use super::{high_account_range, low_account_range};
use crate::descriptor::{ColumnMapping, Enrichment, FormatDescriptor, Layout, ReferenceKind};
use crate::error::ConfigError;
use crate::models::{HIGH_ACCOUNT_RANGE, LOW_ACCOUNT_RANGE};
use crate::translate::{ExactTable, TranslationRule};

pub const NAME: &str = "mastercard_simplified";
pub const INDEX_FILE_NAME: &str = "mastercard.index";

/// `(CSV column, semantic field)` in file order
const COLUMNS: &[(&str, &str)] = &[
    ("COMPANY_NAME", "IssuerName"),
    ("ICA", "ICA"),
    ("ACCOUNT_RANGE_FROM", LOW_ACCOUNT_RANGE),
    ("ACCOUNT_RANGE_TO", HIGH_ACCOUNT_RANGE),
    ("BRAND_PRODUCT_CODE", "CardName"),
    ("BRAND_PRODUCT_NAME", "CardDescription"),
    ("ACCEPTANCE_BRAND", "Brand"),
    ("COUNTRY", "CountryAlpha3"),
];

/// Acceptance brand codes
const ACCEPTANCE_BRANDS: &[(&str, &str)] = &[
    ("MCC", "MASTERCARD"),
    ("DMC", "DEBIT MASTERCARD"),
    ("MSI", "MAESTRO"),
    ("CIR", "CIRRUS"),
    ("PVL", "PRIVATE LABEL"),
];

pub fn descriptor() -> Result<FormatDescriptor, ConfigError> {
    let columns = COLUMNS
        .iter()
        .map(|&(source, target)| ColumnMapping::new(source, target))
        .collect();

    FormatDescriptor::new(
        NAME,
        Layout::Delimited {
            columns,
            has_header: true,
        },
        INDEX_FILE_NAME,
    )
    .with_rules(vec![
        TranslationRule::exact("Brand", ExactTable::from_pairs(ACCEPTANCE_BRANDS)),
        TranslationRule::derived(LOW_ACCOUNT_RANGE, low_account_range),
        TranslationRule::derived(HIGH_ACCOUNT_RANGE, high_account_range),
    ])
    .with_enrichment(Enrichment::new("CountryAlpha3", "Country", ReferenceKind::Country))
    .validate()
}
