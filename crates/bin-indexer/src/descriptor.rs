//! Format descriptors
//!
//! A [`FormatDescriptor`] is the static declaration of one provider/version:
//! how to cut a physical line into named fields, which translation rules to
//! run, which fields to discard, how to group and enrich the rest, when to
//! drop a record, how the file ends and where the index goes.
//!
//! Descriptors are assembled with `with_*` builders and checked once by
//! [`FormatDescriptor::validate`]; after that they are read-only.

use std::collections::BTreeSet;
use std::ops::Range;

use encoding_rs::Encoding;

use crate::error::ConfigError;
use crate::translate::TranslationRule;

/// Byte span `[start, end)` of a fixed-width field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalField {
    pub start: usize,
    pub end: usize,
    pub name: String,
}

impl PositionalField {
    pub fn new(start: usize, end: usize, name: &str) -> Self {
        Self {
            start,
            end,
            name: name.to_string(),
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Delimited column renamed to its semantic field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: String,
    pub target: String,
}

impl ColumnMapping {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Physical layout of a record line
#[derive(Debug, Clone)]
pub enum Layout {
    Positional {
        fields: Vec<PositionalField>,
        encoding: &'static Encoding,
    },
    Delimited {
        columns: Vec<ColumnMapping>,
        has_header: bool,
    },
}

impl Layout {
    /// Field names produced by the decoder, in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Layout::Positional { fields, .. } => fields.iter().map(|f| f.name.as_str()).collect(),
            Layout::Delimited { columns, .. } => {
                columns.iter().map(|c| c.target.as_str()).collect()
            },
        }
    }

    pub fn has_header(&self) -> bool {
        matches!(self, Layout::Delimited { has_header: true, .. })
    }
}

/// Flat fields folded into one nested object, e.g. `IssuerCode` into
/// `Issuer.Code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    pub target: String,
    /// `(flat field, key inside the object)`
    pub members: Vec<(String, String)>,
}

impl FieldGroup {
    pub fn new(target: &str, members: &[(&str, &str)]) -> Self {
        Self {
            target: target.to_string(),
            members: members
                .iter()
                .map(|(field, key)| (field.to_string(), key.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Country,
    Currency,
}

/// Replace a code with its `{Code, Alpha3, Name}` reference entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub source: String,
    pub target: String,
    pub kind: ReferenceKind,
}

impl Enrichment {
    pub fn new(source: &str, target: &str, kind: ReferenceKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            kind,
        }
    }
}

/// Records whose translated `field` equals `value` are discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRule {
    pub field: String,
    pub value: String,
}

/// Structure of the closing line of a fixed-width file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerSpec {
    /// Bytes holding the structure code of every line
    pub structure_code: Range<usize>,
    pub data_code: String,
    pub trailer_code: String,
    /// Bytes of the trailer holding the declared record count
    pub count_field: Range<usize>,
    /// Lines counted by the provider that are not data records
    pub allowance: i64,
}

/// Everything the pipeline needs to know about one provider/version
#[derive(Debug, Clone)]
pub struct FormatDescriptor {
    pub name: String,
    pub layout: Layout,
    pub rules: Vec<TranslationRule>,
    pub excluded_fields: BTreeSet<String>,
    pub groups: Vec<FieldGroup>,
    pub enrichments: Vec<Enrichment>,
    pub drop_rule: Option<DropRule>,
    pub trailer: Option<TrailerSpec>,
    pub index_file_name: String,
}

impl FormatDescriptor {
    pub fn new(name: &str, layout: Layout, index_file_name: &str) -> Self {
        Self {
            name: name.to_string(),
            layout,
            rules: Vec::new(),
            excluded_fields: BTreeSet::new(),
            groups: Vec::new(),
            enrichments: Vec::new(),
            drop_rule: None,
            trailer: None,
            index_file_name: index_file_name.to_string(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<TranslationRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_excluded_fields(mut self, fields: &[&str]) -> Self {
        self.excluded_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_group(mut self, group: FieldGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichments.push(enrichment);
        self
    }

    pub fn with_drop_rule(mut self, field: &str, value: &str) -> Self {
        self.drop_rule = Some(DropRule {
            field: field.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_trailer(mut self, trailer: TrailerSpec) -> Self {
        self.trailer = Some(trailer);
        self
    }

    /// Shortest line the positional layout can decode; zero for delimited
    pub fn required_width(&self) -> usize {
        match &self.layout {
            Layout::Positional { fields, .. } => fields.iter().map(|f| f.end).max().unwrap_or(0),
            Layout::Delimited { .. } => 0,
        }
    }

    /// Check layout invariants
    ///
    /// Positional spans must satisfy `start < end` and be non-overlapping and
    /// increasing. Field names must be unique in every layout.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if let Layout::Positional { fields, .. } = &self.layout {
            let mut previous_end = 0;
            for field in fields {
                if field.start >= field.end {
                    return Err(ConfigError::invalid_descriptor(
                        &self.name,
                        format!("field {} has empty span {}..{}", field.name, field.start, field.end),
                    ));
                }
                if field.start < previous_end {
                    return Err(ConfigError::invalid_descriptor(
                        &self.name,
                        format!(
                            "field {} at {}..{} overlaps or precedes the previous field ending at {}",
                            field.name, field.start, field.end, previous_end
                        ),
                    ));
                }
                previous_end = field.end;
            }
        }

        if let Layout::Delimited { columns, .. } = &self.layout {
            let mut sources = BTreeSet::new();
            for column in columns {
                if !sources.insert(column.source.as_str()) {
                    return Err(ConfigError::invalid_descriptor(
                        &self.name,
                        format!("duplicate column {}", column.source),
                    ));
                }
            }
        }

        let mut names = BTreeSet::new();
        for name in self.layout.field_names() {
            if !names.insert(name) {
                return Err(ConfigError::invalid_descriptor(
                    &self.name,
                    format!("duplicate field name {}", name),
                ));
            }
        }

        if let Some(trailer) = &self.trailer {
            if trailer.structure_code.is_empty() || trailer.count_field.is_empty() {
                return Err(ConfigError::invalid_descriptor(
                    &self.name,
                    "trailer spans must not be empty",
                ));
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn positional(fields: Vec<PositionalField>) -> FormatDescriptor {
        FormatDescriptor::new(
            "test_1.0",
            Layout::Positional {
                fields,
                encoding: encoding_rs::WINDOWS_1252,
            },
            "test.index",
        )
    }

    #[test]
    fn test_valid_positional_layout() {
        let descriptor = positional(vec![
            PositionalField::new(0, 2, "StructureCode"),
            PositionalField::new(2, 20, "LowAccountRange"),
            PositionalField::new(22, 30, "Gap"),
        ])
        .validate()
        .unwrap();

        assert_eq!(descriptor.required_width(), 30);
    }

    #[test]
    fn test_rejects_overlapping_offsets() {
        let err = positional(vec![
            PositionalField::new(0, 4, "A"),
            PositionalField::new(3, 6, "B"),
        ])
        .validate()
        .unwrap_err();

        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_rejects_decreasing_offsets() {
        let result = positional(vec![
            PositionalField::new(10, 12, "A"),
            PositionalField::new(0, 2, "B"),
        ])
        .validate();

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_span() {
        let result = positional(vec![PositionalField::new(5, 5, "A")]).validate();
        assert!(matches!(result, Err(ConfigError::InvalidDescriptor { .. })));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = positional(vec![
            PositionalField::new(0, 2, "Brand"),
            PositionalField::new(2, 4, "Brand"),
        ])
        .validate()
        .unwrap_err();

        assert!(err.to_string().contains("duplicate field name Brand"));
    }

    #[test]
    fn test_rejects_duplicate_delimited_targets() {
        let descriptor = FormatDescriptor::new(
            "csv_1.0",
            Layout::Delimited {
                columns: vec![ColumnMapping::new("A", "Name"), ColumnMapping::new("B", "Name")],
                has_header: true,
            },
            "csv.index",
        );

        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_delimited_has_no_required_width() {
        let descriptor = FormatDescriptor::new(
            "csv_1.0",
            Layout::Delimited {
                columns: vec![ColumnMapping::new("A", "Name")],
                has_header: true,
            },
            "csv.index",
        );

        assert_eq!(descriptor.required_width(), 0);
        assert!(descriptor.layout.has_header());
    }
}
