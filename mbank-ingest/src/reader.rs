//! Source reader: strict legacy-encoding decode, then a `;`-delimited,
//! quote-aware row split.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{IngestError, Result};

/// One physical CSV line split into fields
pub type RawRow = Vec<String>;

/// Lazy row sequence over a decoded export. Not restartable.
pub struct RowReader {
    records: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
}

impl RowReader {
    /// Split already decoded text.
    pub fn from_text(text: String) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .quote(b'"')
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(text.into_bytes()));
        Self {
            records: rdr.into_records(),
        }
    }
}

impl Iterator for RowReader {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(IngestError::from),
        )
    }
}

/// Decode `bytes` under `encoding`, refusing malformed input instead of
/// substituting replacement characters.
///
/// WHATWG maps the holes of single-byte code pages (0x81, 0x83, 0x88, 0x90
/// and 0x98 in windows-1250) to C1 controls; those count as undecodable too.
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
    if encoding.is_single_byte() && text.chars().any(is_c1_control) {
        return None;
    }
    Some(text.into_owned())
}

fn is_c1_control(c: char) -> bool {
    ('\u{80}'..='\u{9f}').contains(&c)
}

/// Read and decode the whole file, then hand out its rows.
///
/// The file handle is closed before this returns.
pub fn read_rows(path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<RowReader> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_strict(&bytes, encoding).ok_or_else(|| IngestError::Decode {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    })?;
    log::trace!("decoded {} ({} bytes, {})", path.display(), bytes.len(), encoding.name());
    Ok(RowReader::from_text(text))
}
