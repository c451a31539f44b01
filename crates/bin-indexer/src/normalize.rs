//! Raw record normalization
//!
//! `translate -> exclude -> group -> enrich -> drop`, driven entirely by the
//! format descriptor.

use crate::descriptor::{FormatDescriptor, ReferenceKind};
use crate::models::{FieldValue, RawRecord, SemanticRecord};
use crate::reference::ReferenceData;
use crate::translate::apply_rules;

/// Placeholder name for any coded field missing from the reference tables
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

/// Outcome of normalizing one raw record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Retained(SemanticRecord),
    /// Matched the descriptor's drop rule
    Dropped { field: String, value: String },
}

pub struct Normalizer<'a, R> {
    descriptor: &'a FormatDescriptor,
    reference: &'a R,
}

impl<'a, R: ReferenceData> Normalizer<'a, R> {
    pub fn new(descriptor: &'a FormatDescriptor, reference: &'a R) -> Self {
        Self {
            descriptor,
            reference,
        }
    }

    pub fn normalize(&self, raw: RawRecord) -> Normalized {
        let mut record = apply_rules(&self.descriptor.rules, SemanticRecord::from(raw));

        for field in &self.descriptor.excluded_fields {
            record.remove(field);
        }

        self.group(&mut record);
        self.enrich(&mut record);

        match &self.descriptor.drop_rule {
            Some(rule) if record.text(&rule.field) == rule.value => Normalized::Dropped {
                field: rule.field.clone(),
                value: rule.value.clone(),
            },
            Some(rule) => {
                record.remove(&rule.field);
                Normalized::Retained(record)
            },
            None => Normalized::Retained(record),
        }
    }

    fn group(&self, record: &mut SemanticRecord) {
        for group in &self.descriptor.groups {
            let members: Vec<(String, FieldValue)> = group
                .members
                .iter()
                .map(|(field, key)| {
                    let value = record.remove(field).unwrap_or_else(|| FieldValue::text(""));
                    (key.clone(), value)
                })
                .collect();

            if members.iter().any(|(_, value)| !value.is_empty()) {
                record.insert(group.target.as_str(), FieldValue::object(members));
            }
        }
    }

    fn enrich(&self, record: &mut SemanticRecord) {
        for enrichment in &self.descriptor.enrichments {
            let code = record.text(&enrichment.source).trim().to_string();
            if enrichment.source != enrichment.target {
                record.remove(&enrichment.source);
            }
            if code.is_empty() {
                continue;
            }

            let entry = match enrichment.kind {
                ReferenceKind::Country => self.reference.lookup_country(&code),
                ReferenceKind::Currency => self.reference.lookup_currency(&code),
            };

            let value = match entry {
                Some(entry) => entry.to_value(),
                None => FieldValue::object([("Code", ""), ("Alpha3", code.as_str()), ("Name", UNKNOWN_COUNTRY)]),
            };
            record.insert(enrichment.target.as_str(), value);
        }
    }
}
