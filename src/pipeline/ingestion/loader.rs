use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::observability::metrics;

/// Text encodings tried, in order, when reading an export table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Strict UTF-8; a leading byte-order mark is left for `Utf8Sig`
    Utf8,
    /// UTF-8 with the byte-order mark stripped
    Utf8Sig,
    /// ISO-8859-1, which maps every byte and so never fails to decode
    Latin1,
}

pub const ENCODING_ORDER: [TextEncoding; 3] =
    [TextEncoding::Utf8, TextEncoding::Utf8Sig, TextEncoding::Latin1];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> std::result::Result<String, String> {
        match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return Err("input starts with a byte-order mark".to_string());
                }
                String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
            }
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(body.to_vec()).map_err(|e| e.to_string())
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
        };
        write!(f, "{name}")
    }
}

/// Rows parsed from one table, plus the rows rejected for a missing key
#[derive(Debug)]
pub struct ParsedRows<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

/// Parse CSV text into typed rows. Ragged rows are accepted; a row whose key
/// cell is blank or unparseable is skipped. Any other reader error fails the
/// whole table.
pub fn parse_rows<T: DeserializeOwned>(text: &str) -> std::result::Result<ParsedRows<T>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedRows { rows: Vec::new(), skipped: 0 };
    for result in reader.deserialize() {
        match result {
            Ok(row) => parsed.rows.push(row),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                debug!("Skipping row: {}", e);
                parsed.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(parsed)
}

/// Reads one export table, trying each encoding in [`ENCODING_ORDER`] until
/// the text decodes and the reader accepts it.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let started = Instant::now();
    let bytes = fs::read(path).map_err(|e| CatalogError::Load {
        path: path.to_path_buf(),
        attempts: format!("read failed: {e}"),
    })?;

    let mut failures = Vec::new();
    for encoding in ENCODING_ORDER {
        let parsed = encoding
            .decode(&bytes)
            .and_then(|text| parse_rows::<T>(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(ParsedRows { rows, skipped }) => {
                info!("Loaded {} rows from {} ({})", rows.len(), path.display(), encoding);
                if skipped > 0 {
                    warn!("Skipped {} rows without a usable key in {}", skipped, path.display());
                    metrics::loader::rows_skipped(skipped);
                }
                metrics::loader::table_loaded(rows.len(), started.elapsed().as_secs_f64());
                if !failures.is_empty() {
                    metrics::loader::encoding_fallback();
                }
                return Ok(rows);
            }
            Err(reason) => {
                debug!("{} did not parse as {}: {}", path.display(), encoding, reason);
                failures.push(format!("{encoding}: {reason}"));
            }
        }
    }

    metrics::loader::table_failed();
    Err(CatalogError::Load {
        path: path.to_path_buf(),
        attempts: failures.join("; "),
    })
}
