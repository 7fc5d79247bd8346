use chrono::FixedOffset;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::SheetError;
use crate::core::item::Item;
use crate::core::time::csv_timestamp;

/// First line of every bucket list CSV file.
pub const HEADER: &str =
    "Title,Category,Description,Scheduled Date,Completed,Created At,Created By\n";

pub const COLUMNS: [&str; 7] = [
    "Title",
    "Category",
    "Description",
    "Scheduled Date",
    "Completed",
    "Created At",
    "Created By",
];

/// The seven rendered columns of one CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    pub category: String,
    pub description: String,
    pub scheduled: String,
    pub completed: bool,
    pub created_at: String,
    pub created_by: String,
}

impl Row {
    pub fn from_item(item: &Item, offset: FixedOffset) -> Self {
        Self {
            title: item.title.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
            scheduled: item
                .scheduled_date
                .as_ref()
                .map(|dt| csv_timestamp(dt, offset))
                .unwrap_or_default(),
            completed: item.completed,
            created_at: csv_timestamp(&item.created_at, offset),
            created_by: item.created_by.clone(),
        }
    }

    fn fields(&self) -> [&str; 7] {
        [
            self.title.as_str(),
            self.category.as_str(),
            self.description.as_str(),
            self.scheduled.as_str(),
            if self.completed { "Yes" } else { "No" },
            self.created_at.as_str(),
            self.created_by.as_str(),
        ]
    }
}

pub struct CsvWriter;

impl CsvWriter {
    /// Write rows with every field quoted and embedded quotes doubled, each
    /// terminated by `\n`. No header.
    pub fn write_rows<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Result<String, SheetError> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        for row in rows {
            writer.write_record(row.fields())?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| SheetError::Flush(e.error().to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    pub fn write_row(row: &Row) -> Result<String, SheetError> {
        Self::write_rows([row])
    }

    /// A full document: header followed by one row per item.
    pub fn write_document(items: &[Item], offset: FixedOffset) -> Result<String, SheetError> {
        let rows: Vec<Row> = items.iter().map(|i| Row::from_item(i, offset)).collect();
        let mut out = String::from(HEADER);
        out.push_str(&Self::write_rows(&rows)?);
        Ok(out)
    }

    /// Content of a freshly created file holding a single row.
    pub fn new_file(row: &str) -> String {
        format!("{}{}", HEADER, row)
    }

    /// Append a rendered row to existing file content.
    pub fn append(existing: &str, row: &str) -> String {
        let mut out = String::with_capacity(existing.len() + row.len() + 1);
        out.push_str(existing);
        if !existing.is_empty() && !existing.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(row);
        out
    }
}
