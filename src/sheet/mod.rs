//! The bucket list CSV format: a fixed seven-column header followed by one
//! fully quoted row per item.

pub mod parser;
pub mod writer;

use thiserror::Error;

pub use parser::{parse_document, parse_row};
pub use writer::{CsvWriter, Row, HEADER};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush CSV writer: {0}")]
    Flush(String),
    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("Unexpected CSV header: {0}")]
    Header(String),
    #[error("Expected 7 fields, found {0}")]
    Width(usize),
}
