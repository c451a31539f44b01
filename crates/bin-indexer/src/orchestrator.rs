//! Ingestion orchestrator
//!
//! Streams the lines of one input file through decode and normalize, gives
//! every retained record a fresh [`RangeKey`], and writes it to both the
//! range index and the detail store before moving to the next line.
//!
//! # Pipeline
//! 1. Skip blank lines, and the header line for header-bearing layouts
//! 2. For fixed-width formats, classify by structure code; the trailer ends
//!    the file
//! 3. Decode and normalize
//! 4. Key, index insert, store
//! 5. Reconcile counters with the trailer
//! 6. Serialize the index and publish it

use num_bigint::BigUint;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn, Span};

use bin_indexer_common::checksum::sha256_hex;

use crate::decode::{Decoder, RecordDecoder};
use crate::descriptor::FormatDescriptor;
use crate::error::{DecodeError, IndexerError, LocationError, Result};
use crate::index::RangeIndex;
use crate::key::RangeKey;
use crate::location::{Location, LocationIo};
use crate::models::{FieldValue, SemanticRecord, HIGH_ACCOUNT_RANGE, LOW_ACCOUNT_RANGE};
use crate::normalize::{Normalized, Normalizer};
use crate::reference::ReferenceData;
use crate::storage::RecordStore;
use crate::trailer::{LineClass, Reconciliation, TrailerValidator};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Non-blank physical lines consumed, header and trailer included
    pub lines_read: u64,
    pub records_seen: u64,
    pub records_dropped: u64,
    /// Retained records; each one is both indexed and stored
    pub records_stored: u64,
    /// `None` for formats without a trailer
    pub reconciliation: Option<Reconciliation>,
    /// Where the index was published
    pub output: Option<String>,
}

/// Drives one ingestion run
pub struct IngestionOrchestrator<'a, S, I, R> {
    descriptor: &'a FormatDescriptor,
    store: &'a S,
    index: I,
    reference: &'a R,
    span: Span,
}

impl<'a, S, I, R> IngestionOrchestrator<'a, S, I, R>
where
    S: RecordStore,
    I: RangeIndex,
    R: ReferenceData,
{
    /// `span` carries the run's logging context into every event
    pub fn new(
        descriptor: &'a FormatDescriptor,
        store: &'a S,
        index: I,
        reference: &'a R,
        span: Span,
    ) -> Self {
        Self {
            descriptor,
            store,
            index,
            reference,
            span,
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn into_index(self) -> I {
        self.index
    }

    /// Read `input`, ingest it and publish the index under `output`
    pub async fn run(
        &mut self,
        io: &LocationIo,
        input: &Location,
        output: &Location,
    ) -> Result<IngestSummary> {
        info!(parent: &self.span, input = %input, format = %self.descriptor.name, "Starting ingestion");

        let reader = io.open(input).await?;
        let mut summary = self.ingest(reader).await?;

        let published = self.publish(io, output).await?;
        summary.output = Some(published.to_string());

        info!(
            parent: &self.span,
            lines_read = summary.lines_read,
            records_seen = summary.records_seen,
            records_dropped = summary.records_dropped,
            records_stored = summary.records_stored,
            output = %published,
            "Ingestion complete"
        );

        Ok(summary)
    }

    /// Ingest one input stream, line by line
    ///
    /// Each line is decoded, normalized and written before the next one is
    /// read.
    pub async fn ingest<B>(&mut self, mut input: B) -> Result<IngestSummary>
    where
        B: AsyncBufRead + Unpin,
    {
        let descriptor = self.descriptor;
        let decoder = Decoder::for_descriptor(descriptor);
        let normalizer = Normalizer::new(descriptor, self.reference);
        let mut validator = descriptor
            .trailer
            .as_ref()
            .map(|spec| TrailerValidator::new(spec, self.span.clone()));

        let mut summary = IngestSummary::default();
        let mut header_pending = descriptor.layout.has_header();
        let mut trailer_reached = false;
        let mut ignored = 0usize;
        let mut line_number = 0usize;
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let read = input
                .read_until(b'\n', &mut buffer)
                .await
                .map_err(|source| LocationError::Read {
                    line: line_number,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let line = strip_line_ending(&buffer);
            if is_blank(line) {
                continue;
            }
            if trailer_reached {
                ignored += 1;
                continue;
            }
            summary.lines_read += 1;

            if header_pending {
                header_pending = false;
                debug!(parent: &self.span, line = line_number, "Skipped header line");
                continue;
            }

            let class = validator.as_ref().map(|v| v.classify(line));
            match class {
                Some(LineClass::Trailer) => {
                    if let Some(v) = validator.take() {
                        summary.reconciliation = Some(v.reconcile(line));
                    }
                    trailer_reached = true;
                    continue;
                },
                Some(LineClass::Unrecognized) => {
                    debug!(parent: &self.span, line = line_number, "Skipped line with unknown structure code");
                    continue;
                },
                Some(LineClass::Data) | None => {},
            }

            let raw = decoder
                .decode(line)
                .map_err(|e| IndexerError::decode(line_number, e))?;
            summary.records_seen += 1;

            match normalizer.normalize(raw) {
                Normalized::Dropped { field, value } => {
                    summary.records_dropped += 1;
                    if let Some(v) = validator.as_mut() {
                        v.record_data(true);
                    }
                    debug!(parent: &self.span, line = line_number, field = %field, value = %value, "Dropped record");
                },
                Normalized::Retained(record) => {
                    if let Some(v) = validator.as_mut() {
                        v.record_data(false);
                    }
                    self.write(line_number, &record).await?;
                    summary.records_stored += 1;
                },
            }
        }

        if ignored > 0 {
            warn!(parent: &self.span, ignored, "Ignored lines after the trailer record");
        }

        if let Some(v) = validator {
            summary.reconciliation = Some(v.finish_without_trailer());
        }

        Ok(summary)
    }

    /// Key the record, index its range and store it
    async fn write(&mut self, line_number: usize, record: &SemanticRecord) -> Result<()> {
        let key = RangeKey::generate().to_string();

        let low = account_bound(record, LOW_ACCOUNT_RANGE)
            .map_err(|e| IndexerError::decode(line_number, e))?;
        let high = account_bound(record, HIGH_ACCOUNT_RANGE)
            .map_err(|e| IndexerError::decode(line_number, e))?;
        if low > high {
            return Err(IndexerError::decode(
                line_number,
                DecodeError::InvertedRange {
                    low: low.to_string(),
                    high: high.to_string(),
                },
            ));
        }

        self.index.insert(low, high, key.clone())?;
        self.store.store(&key, record).await?;

        debug!(parent: &self.span, line = line_number, key = %key, "Stored range");
        Ok(())
    }

    /// Serialize the index and write it to `output`
    ///
    /// Directory-like outputs receive the descriptor's index file name.
    /// Returns the location actually written.
    pub async fn publish(&self, io: &LocationIo, output: &Location) -> Result<Location> {
        let target = output.index_target(&self.descriptor.index_file_name);

        let serialized = self.index.serialize(&|key| key.to_string())?;
        let checksum = sha256_hex(serialized.as_bytes());
        let size = serialized.len();

        io.write(&target, serialized.into_bytes()).await?;

        info!(
            parent: &self.span,
            location = %target,
            entries = self.index.len(),
            size,
            sha256 = %checksum,
            "Published range index"
        );

        Ok(target)
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

fn account_bound(record: &SemanticRecord, field: &str) -> std::result::Result<BigUint, DecodeError> {
    match record.get(field) {
        Some(FieldValue::Integer(value)) => Ok(value.clone()),
        Some(FieldValue::Text(raw)) => raw.trim().parse().map_err(|_| DecodeError::InvalidBound {
            field: field.to_string(),
            value: raw.clone(),
        }),
        Some(_) => Err(DecodeError::InvalidBound {
            field: field.to_string(),
            value: String::new(),
        }),
        None => Err(DecodeError::MissingField(field.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::descriptor::{ColumnMapping, Layout};
    use crate::index::IntervalIndex;
    use crate::reference::IsoTables;
    use crate::storage::MemoryStore;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, BufReader, ReadBuf};

    fn ranges_only() -> FormatDescriptor {
        FormatDescriptor::new(
            "ranges_1.0",
            Layout::Delimited {
                columns: vec![
                    ColumnMapping::new("FROM", LOW_ACCOUNT_RANGE),
                    ColumnMapping::new("TO", HIGH_ACCOUNT_RANGE),
                ],
                has_header: false,
            },
            "ranges.index",
        )
    }

    #[tokio::test]
    async fn test_text_bounds_are_parsed() {
        let descriptor = ranges_only();
        let store = MemoryStore::new();
        let mut orchestrator =
            IngestionOrchestrator::new(&descriptor, &store, IntervalIndex::new(), &IsoTables, Span::none());

        let summary = orchestrator.ingest(&b"100,199\r\n\r\n200,299"[..]).await.unwrap();

        assert_eq!(summary.lines_read, 2);
        assert_eq!(summary.records_stored, 2);
        assert_eq!(summary.reconciliation, None);
        assert_eq!(store.len(), 2);
        assert_eq!(orchestrator.index().len(), 2);

        let tree = orchestrator.into_index().build_tree();
        assert_eq!(tree.stab(&BigUint::from(150u32)).len(), 1);
    }

    #[tokio::test]
    async fn test_inverted_range_reports_line() {
        let descriptor = ranges_only();
        let store = MemoryStore::new();
        let mut orchestrator =
            IngestionOrchestrator::new(&descriptor, &store, IntervalIndex::new(), &IsoTables, Span::none());

        let err = orchestrator.ingest(&b"100,199\n300,200\n"[..]).await.unwrap_err();
        match err {
            IndexerError::Decode {
                line,
                source: DecodeError::InvertedRange { .. },
            } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_bound() {
        let descriptor = ranges_only();
        let store = MemoryStore::new();
        let mut orchestrator =
            IngestionOrchestrator::new(&descriptor, &store, IntervalIndex::new(), &IsoTables, Span::none());

        let err = orchestrator.ingest(&b"abc,199\n"[..]).await.unwrap_err();
        assert!(matches!(
            err,
            IndexerError::Decode {
                line: 1,
                source: DecodeError::InvalidBound { .. }
            }
        ));
        assert!(store.is_empty());
    }

    /// Input that fails on every read
    struct BrokenPipe;

    impl AsyncRead for BrokenPipe {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection reset")))
        }
    }

    #[tokio::test]
    async fn test_each_line_is_written_before_the_next_is_read() {
        let descriptor = ranges_only();
        let store = MemoryStore::new();
        let mut orchestrator =
            IngestionOrchestrator::new(&descriptor, &store, IntervalIndex::new(), &IsoTables, Span::none());

        let input = BufReader::new((&b"100,199\n"[..]).chain(BrokenPipe));
        let err = orchestrator.ingest(input).await.unwrap_err();

        assert!(matches!(
            err,
            IndexerError::Location(LocationError::Read { line: 1, .. })
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(orchestrator.index().len(), 1);
    }

    #[test]
    fn test_account_bound_missing_field() {
        let err = account_bound(&SemanticRecord::new(), LOW_ACCOUNT_RANGE).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField(_)));
    }
}
