use csv::ReaderBuilder;

use super::SheetError;
use super::writer::{Row, COLUMNS};

/// Parse a whole bucket list CSV document. The header must match the
/// expected columns exactly.
pub fn parse_document(text: &str) -> Result<Vec<Row>, SheetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let found: Vec<&str> = headers.iter().collect();
    if found != COLUMNS {
        return Err(SheetError::Header(found.join(",")));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(row_from_record(&record?)?);
    }
    Ok(rows)
}

/// Parse a single data line (no header).
pub fn parse_row(line: &str) -> Result<Row, SheetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(record) => row_from_record(&record?),
        None => Err(SheetError::Width(0)),
    }
}

fn row_from_record(record: &csv::StringRecord) -> Result<Row, SheetError> {
    if record.len() != COLUMNS.len() {
        return Err(SheetError::Width(record.len()));
    }
    let field = |i: usize| record.get(i).unwrap_or_default().to_string();
    Ok(Row {
        title: field(0),
        category: field(1),
        description: field(2),
        scheduled: field(3),
        completed: record.get(4) == Some("Yes"),
        created_at: field(5),
        created_by: field(6),
    })
}
