use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;

use super::item::Item;
use super::time::{at_offset, input_value, parse_input};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in the title and category!")]
    MissingFields,
    #[error("Invalid scheduled date '{0}'")]
    InvalidSchedule(String),
}

/// Raw values of the "add item" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItemForm {
    pub title: String,
    pub category: String,
    pub description: String,
    /// `datetime-local` value, blank for "not scheduled".
    pub scheduled: String,
    pub created_by: String,
}

impl NewItemForm {
    /// An empty form with the scheduled field preset to "now".
    pub fn fresh(now: DateTime<Utc>, offset: FixedOffset, created_by: &str) -> Self {
        Self {
            scheduled: input_value(now, offset),
            created_by: created_by.to_string(),
            ..Self::default()
        }
    }

    /// Clear the form after a submission and advance the scheduled field to
    /// `now`. The selected user is kept.
    pub fn reset(&mut self, now: DateTime<Utc>, offset: FixedOffset) {
        let created_by = std::mem::take(&mut self.created_by);
        *self = Self::fresh(now, offset, &created_by);
    }

    /// Validate the form and build the item it describes.
    ///
    /// The id is the creation instant in epoch milliseconds and `created_at`
    /// is that instant expressed at the display offset.
    pub fn build(&self, now: DateTime<Utc>, offset: FixedOffset) -> Result<Item, FormError> {
        let title = self.title.trim();
        let category = self.category.trim();
        if title.is_empty() || category.is_empty() {
            return Err(FormError::MissingFields);
        }

        let scheduled = parse_input(&self.scheduled, offset)
            .map_err(|_| FormError::InvalidSchedule(self.scheduled.clone()))?;

        let mut item = Item::new(now.timestamp_millis(), title, category, at_offset(now, offset));
        item.description = self.description.trim().to_string();
        item.scheduled_date = scheduled;
        item.created_by = self.created_by.clone();
        Ok(item)
    }
}
