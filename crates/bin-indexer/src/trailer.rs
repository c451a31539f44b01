//! Trailer reconciliation for fixed-width files
//!
//! Every line of a fixed-width file starts with a structure code. Data lines
//! are counted as they stream past; the trailer line declares how many lines
//! the provider wrote, and the two are compared once the trailer arrives.
//! Problems are logged and reported, never raised.

use std::fmt;

use serde::Serialize;
use tracing::{error, info, Span};

use crate::descriptor::TrailerSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Data,
    Trailer,
    Unrecognized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrailerCounters {
    pub records_seen: u64,
    pub records_dropped: u64,
}

/// Result of comparing the trailer against what was read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    Matched { seen: u64, dropped: u64, retained: u64 },
    Mismatch { declared: i64, seen: u64 },
    UnreadableTrailer { raw: String },
    MissingTrailer { seen: u64, dropped: u64 },
}

impl Reconciliation {
    pub fn is_success(&self) -> bool {
        matches!(self, Reconciliation::Matched { .. })
    }
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciliation::Matched { seen, dropped, retained } => write!(
                f,
                "matched ({} seen, {} dropped, {} retained)",
                seen, dropped, retained
            ),
            Reconciliation::Mismatch { declared, seen } => {
                write!(f, "mismatch (trailer declares {}, {} seen)", declared, seen)
            },
            Reconciliation::UnreadableTrailer { raw } => {
                write!(f, "unreadable trailer count '{}'", raw)
            },
            Reconciliation::MissingTrailer { seen, dropped } => {
                write!(f, "missing trailer ({} seen, {} dropped)", seen, dropped)
            },
        }
    }
}

/// Counts data lines of one file and reconciles them with its trailer
#[derive(Debug)]
pub struct TrailerValidator<'a> {
    spec: &'a TrailerSpec,
    counters: TrailerCounters,
    span: Span,
}

impl<'a> TrailerValidator<'a> {
    /// `span` is the owner's logging context
    pub fn new(spec: &'a TrailerSpec, span: Span) -> Self {
        Self {
            spec,
            counters: TrailerCounters::default(),
            span,
        }
    }

    pub fn classify(&self, line: &[u8]) -> LineClass {
        match line.get(self.spec.structure_code.clone()) {
            Some(code) if code == self.spec.data_code.as_bytes() => LineClass::Data,
            Some(code) if code == self.spec.trailer_code.as_bytes() => LineClass::Trailer,
            _ => LineClass::Unrecognized,
        }
    }

    /// Count one data line; `dropped` when the drop rule discarded it
    pub fn record_data(&mut self, dropped: bool) {
        self.counters.records_seen += 1;
        if dropped {
            self.counters.records_dropped += 1;
        }
    }

    pub fn counters(&self) -> TrailerCounters {
        self.counters
    }

    /// Compare the trailer's declared count with the data lines seen
    pub fn reconcile(self, trailer: &[u8]) -> Reconciliation {
        let TrailerCounters {
            records_seen: seen,
            records_dropped: dropped,
        } = self.counters;

        // A short trailer yields whatever part of the count field it has
        let start = self.spec.count_field.start.min(trailer.len());
        let end = self.spec.count_field.end.min(trailer.len());
        let raw = String::from_utf8_lossy(&trailer[start..end]).trim().to_string();

        let declared: i64 = match raw.parse() {
            Ok(declared) => declared,
            Err(_) => {
                error!(parent: &self.span, raw = %raw, "Trailer record count is not a number");
                return Reconciliation::UnreadableTrailer { raw };
            },
        };

        let expected = declared - self.spec.allowance;
        if i64::try_from(seen).is_ok_and(|seen| seen == expected) {
            let retained = seen - dropped;
            info!(
                parent: &self.span,
                processed = seen,
                dropped,
                retained,
                "All records have been processed successfully"
            );
            Reconciliation::Matched {
                seen,
                dropped,
                retained,
            }
        } else {
            error!(
                parent: &self.span,
                declared,
                expected,
                processed = seen,
                "Some records could not be processed"
            );
            Reconciliation::Mismatch { declared, seen }
        }
    }

    /// Input ended before any trailer line
    pub fn finish_without_trailer(self) -> Reconciliation {
        let TrailerCounters {
            records_seen: seen,
            records_dropped: dropped,
        } = self.counters;

        error!(
            parent: &self.span,
            processed = seen,
            dropped,
            "Input ended without a trailer record"
        );
        Reconciliation::MissingTrailer { seen, dropped }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn spec() -> TrailerSpec {
        TrailerSpec {
            structure_code: 0..2,
            data_code: "10".to_string(),
            trailer_code: "90".to_string(),
            count_field: 28..38,
            allowance: 2,
        }
    }

    fn trailer(count: &str) -> Vec<u8> {
        format!("90{}{:<10}{}", " ".repeat(26), count, " ".repeat(20)).into_bytes()
    }

    #[test]
    fn test_classify() {
        let spec = spec();
        let validator = TrailerValidator::new(&spec, Span::none());

        assert_eq!(validator.classify(b"10ABCDEF"), LineClass::Data);
        assert_eq!(validator.classify(b"90"), LineClass::Trailer);
        assert_eq!(validator.classify(b"00HEADER"), LineClass::Unrecognized);
        assert_eq!(validator.classify(b"1"), LineClass::Unrecognized);
    }

    #[test]
    fn test_matched_when_declared_equals_seen_plus_allowance() {
        let spec = spec();
        let mut validator = TrailerValidator::new(&spec, Span::none());
        validator.record_data(false);

        let outcome = validator.reconcile(&trailer("000003"));
        assert_eq!(
            outcome,
            Reconciliation::Matched {
                seen: 1,
                dropped: 0,
                retained: 1
            }
        );
        assert!(outcome.is_success());
    }

    #[test]
    fn test_dropped_records_count_as_seen() {
        let spec = spec();
        let mut validator = TrailerValidator::new(&spec, Span::none());
        validator.record_data(true);
        validator.record_data(false);

        assert_eq!(validator.counters().records_dropped, 1);
        let outcome = validator.reconcile(&trailer("4"));
        assert_eq!(
            outcome,
            Reconciliation::Matched {
                seen: 2,
                dropped: 1,
                retained: 1
            }
        );
    }

    #[test]
    fn test_mismatch_carries_both_numbers() {
        let spec = spec();
        let mut validator = TrailerValidator::new(&spec, Span::none());
        validator.record_data(false);

        let outcome = validator.reconcile(&trailer("000010"));
        assert_eq!(
            outcome,
            Reconciliation::Mismatch {
                declared: 10,
                seen: 1
            }
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_unreadable_trailer() {
        let spec = spec();
        let validator = TrailerValidator::new(&spec, Span::none());

        let outcome = validator.reconcile(&trailer("ABC"));
        assert_eq!(
            outcome,
            Reconciliation::UnreadableTrailer {
                raw: "ABC".to_string()
            }
        );

        let validator = TrailerValidator::new(&spec, Span::none());
        let outcome = validator.reconcile(b"90");
        assert_eq!(outcome, Reconciliation::UnreadableTrailer { raw: String::new() });
    }

    #[test]
    fn test_missing_trailer() {
        let spec = spec();
        let mut validator = TrailerValidator::new(&spec, Span::none());
        validator.record_data(true);

        let outcome = validator.finish_without_trailer();
        assert_eq!(outcome, Reconciliation::MissingTrailer { seen: 1, dropped: 1 });
        assert_eq!(outcome.to_string(), "missing trailer (1 seen, 1 dropped)");
    }
}
