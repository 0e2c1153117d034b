use std::path::PathBuf;

use thiserror::Error;

use crate::game_types::UnitId;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
}

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },
    #[error("I/O error on {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("Malformed XML in {path}: {detail}")]
    Xml { path: PathBuf, detail: String },
    #[error("{path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },
    #[error("Required table {kind} was not loaded")]
    MissingTable { kind: String },
    #[error("Unresolvable reference `{reference}` in {owner}.{attribute}")]
    UnresolvedReference {
        owner: String,
        attribute: String,
        reference: String,
    },
    #[error("Upgrade cycle detected at unit {unit}: {}", format_path(.path))]
    UpgradeCycle { unit: UnitId, path: Vec<UnitId> },
    #[error("Version {version} not found under {root}. Available versions: [{available}]")]
    VersionNotFound {
        root: PathBuf,
        version: String,
        available: String,
    },
    #[error("Exporter failed on table {table}: {status}")]
    Exporter { table: String, status: String },
    #[error("Error reading or writing CSV: {err}")]
    Csv {
        #[from]
        err: csv::Error,
    },
    #[cfg(feature = "json")]
    #[error("Error serializing or deserializing json: {err}")]
    SerdeJson {
        #[from]
        err: serde_json::Error,
    },
}

fn format_path(path: &[UnitId]) -> String {
    itertools::join(path, " -> ")
}

impl ErrorKind {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::InputNotFound { path }
        } else {
            ErrorKind::Io { path, err }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind }
    }
}

impl From<csv::Error> for Error {
    fn from(x: csv::Error) -> Error {
        Error { kind: x.into() }
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(x: serde_json::Error) -> Error {
        Error { kind: x.into() }
    }
}

pub type IResult<T> = Result<T, Error>;
