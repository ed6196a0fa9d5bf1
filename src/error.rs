use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid Excel file: {path} ({details})")]
    InvalidExcel { path: PathBuf, details: String },

    #[error("sheet \"{name}\" not found (available: {available})")]
    SheetNotFound { name: String, available: String },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("invalid profile {path}: {source}")]
    InvalidProfile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write workbook {path}: {details}")]
    WorkbookWrite { path: PathBuf, details: String },

    #[error("failed to fetch user data: {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("failed to fetch user data: {0}")]
    Transport(String),

    #[error("malformed response from {url}: {details}")]
    MalformedResponse { url: String, details: String },

    #[error("failed to write CSV: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileNotFound(_) => 1,
            Error::InvalidExcel { .. } => 2,
            Error::SheetNotFound { .. } => 3,
            Error::UnsupportedFormat(_) => 3,
            Error::InvalidCellRef(_) => 3,
            Error::InvalidProfile { .. } => 3,
            Error::WorkbookWrite { .. } => 4,
            Error::CsvWrite(_) => 4,
            Error::Json(_) => 4,
            Error::Http { .. } => 5,
            Error::Transport(_) => 5,
            Error::MalformedResponse { .. } => 5,
            Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
