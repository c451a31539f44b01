//! Record decoders
//!
//! A decoder turns one physical line into a [`RawRecord`]. Two layouts are
//! supported:
//!
//! - Positional: fixed byte spans decoded from a single-byte codepage
//! - Delimited: one CSV-quoted line whose values are zipped with the
//!   declared column order
//!
//! Decoders hold no per-file state. Header skipping and line numbering are
//! the caller's business.

use encoding_rs::Encoding;

use crate::descriptor::{ColumnMapping, FormatDescriptor, Layout, PositionalField};
use crate::error::DecodeError;
use crate::models::RawRecord;

/// Decode one physical line (without its line terminator)
pub trait RecordDecoder {
    fn decode(&self, line: &[u8]) -> Result<RawRecord, DecodeError>;
}

/// Fixed-width decoder
#[derive(Debug, Clone)]
pub struct PositionalDecoder<'a> {
    fields: &'a [PositionalField],
    encoding: &'static Encoding,
    required: usize,
}

impl<'a> PositionalDecoder<'a> {
    pub fn new(fields: &'a [PositionalField], encoding: &'static Encoding) -> Self {
        let required = fields.iter().map(|f| f.end).max().unwrap_or(0);
        Self {
            fields,
            encoding,
            required,
        }
    }
}

impl RecordDecoder for PositionalDecoder<'_> {
    fn decode(&self, line: &[u8]) -> Result<RawRecord, DecodeError> {
        if line.len() < self.required {
            return Err(DecodeError::LineTooShort {
                required: self.required,
                actual: line.len(),
            });
        }

        let record = self
            .fields
            .iter()
            .map(|field| {
                let (text, _) = self.encoding.decode_without_bom_handling(&line[field.span()]);
                (field.name.clone(), text.trim().to_string())
            })
            .collect();

        Ok(record)
    }
}

/// CSV decoder for a single record line
#[derive(Debug, Clone)]
pub struct DelimitedDecoder<'a> {
    columns: &'a [ColumnMapping],
}

impl<'a> DelimitedDecoder<'a> {
    pub fn new(columns: &'a [ColumnMapping]) -> Self {
        Self { columns }
    }
}

impl RecordDecoder for DelimitedDecoder<'_> {
    fn decode(&self, line: &[u8]) -> Result<RawRecord, DecodeError> {
        if let Err(e) = std::str::from_utf8(line) {
            return Err(DecodeError::InvalidUtf8 {
                valid_up_to: e.valid_up_to(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line);

        let mut values = csv::StringRecord::new();
        if !reader.read_record(&mut values)? {
            return Err(DecodeError::FieldCountMismatch {
                expected: self.columns.len(),
                actual: 0,
            });
        }

        if values.len() != self.columns.len() {
            return Err(DecodeError::FieldCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        Ok(self
            .columns
            .iter()
            .zip(values.iter())
            .map(|(column, value)| (column.target.clone(), value.to_string()))
            .collect())
    }
}

/// Decoder selected by a descriptor's layout
#[derive(Debug, Clone)]
pub enum Decoder<'a> {
    Positional(PositionalDecoder<'a>),
    Delimited(DelimitedDecoder<'a>),
}

impl<'a> Decoder<'a> {
    pub fn for_descriptor(descriptor: &'a FormatDescriptor) -> Self {
        match &descriptor.layout {
            Layout::Positional { fields, encoding } => {
                Decoder::Positional(PositionalDecoder::new(fields, *encoding))
            },
            Layout::Delimited { columns, .. } => Decoder::Delimited(DelimitedDecoder::new(columns)),
        }
    }
}

impl RecordDecoder for Decoder<'_> {
    fn decode(&self, line: &[u8]) -> Result<RawRecord, DecodeError> {
        match self {
            Decoder::Positional(decoder) => decoder.decode(line),
            Decoder::Delimited(decoder) => decoder.decode(line),
        }
    }
}
