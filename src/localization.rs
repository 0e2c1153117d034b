//! Hash to display string lookup from the game's localization CSV.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::data::StringLookup;
use crate::error::{ErrorKind, IResult};

const HASH_COLUMN: &str = "Hash";
const STRING_COLUMN: &str = "String";

/// Decodes the file as UTF-8, falling back to Windows-1252 for files the
/// game tools wrote in the legacy code page.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{FEFF}').to_string(),
        Err(_) => encoding_rs::WINDOWS_1252
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Localization {
    strings: HashMap<String, String>,
}

impl Localization {
    pub fn load(path: &Path) -> IResult<Self> {
        let bytes = std::fs::read(path).map_err(|err| ErrorKind::io(path, err))?;
        let localization = Self::from_text(path, &decode_text(&bytes))?;
        debug!(path = %path.display(), strings = localization.len(), "loaded localization");
        Ok(localization)
    }

    /// Parses CSV text with `Hash` and `String` columns. Other columns, such
    /// as a written-out row index, are ignored. The first entry for a hash
    /// wins.
    pub fn from_text(path: &Path, text: &str) -> IResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ErrorKind::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let hash_idx = column(HASH_COLUMN)?;
        let string_idx = column(STRING_COLUMN)?;

        let mut strings = HashMap::new();
        for record in reader.records() {
            let record = record?;
            if let (Some(hash), Some(string)) = (record.get(hash_idx), record.get(string_idx)) {
                strings
                    .entry(hash.trim().to_string())
                    .or_insert_with(|| string.to_string());
            }
        }
        Ok(Self { strings })
    }

    pub fn get(&self, hash: &str) -> Option<&str> {
        self.strings.get(hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl StringLookup for Localization {
    fn localized(&self, hash: &str) -> Option<&str> {
        self.get(hash)
    }
}

/// Looks up an optional hash, warning when it is present but unknown.
pub fn localize<'a, L: StringLookup + ?Sized>(strings: &'a L, hash: Option<&str>) -> Option<&'a str> {
    let hash = hash?;
    let found = strings.localized(hash);
    if found.is_none() {
        warn!(hash, "localization hash failed to match");
    }
    found
}
