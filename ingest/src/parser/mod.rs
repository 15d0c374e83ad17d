//! Delimited source reader with encoding and delimiter auto-detection.
//!
//! Turns a spreadsheet export into a headerless [`RawGrid`]. Nothing here
//! knows about logical tables; headers are the normalizer's job.

use csv::ReaderBuilder;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::models::RawGrid;

/// Result of reading a source, with the settings that were used.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    /// Raw cells, no header interpretation
    pub grid: RawGrid,
    /// Detected encoding
    pub encoding: String,
    /// Detected or configured delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding, dropping a UTF-8 BOM.
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        // Latin-1 labels decode as windows-1252, the WHATWG mapping.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(SourceError::Encoding(format!(
                        "invalid {} byte sequence",
                        enc.name()
                    )));
                }
                text.to_string()
            }
            None => String::from_utf8_lossy(bytes).to_string(),
        },
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first non-blank line.
///
/// Comma wins ties; spreadsheet exports default to it.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into a raw grid.
///
/// No header row is assumed and rows may have different lengths. Quoted
/// fields keep embedded delimiters (`"1,234"` stays one cell). Entirely
/// empty lines are skipped by the reader; blank spreadsheet rows export as
/// delimiters only and therefore keep their position.
pub fn parse_grid(content: &str, delimiter: char) -> SourceResult<RawGrid> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| SourceError::Csv {
            record: 0,
            message: format!("delimiter {:?} is not a single byte", delimiter),
        })?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| SourceError::Csv {
            record: idx + 1,
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(SourceError::Empty);
    }

    Ok(RawGrid::new(rows))
}

/// Parse bytes with auto-detected encoding and, unless given, delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> SourceResult<ParsedSource> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let grid = parse_grid(&content, delimiter)?;

    Ok(ParsedSource {
        grid,
        encoding,
        delimiter,
    })
}

/// Read and parse a source file.
///
/// The file is read in one call, so its handle is closed before parsing
/// starts and on every error path.
pub fn read_source<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> SourceResult<ParsedSource> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    parse_bytes(&bytes, delimiter)
}
