//! Dinner log feature: validated submission, immutable append, and the
//! sort/fetch cycle of the list view. Ordering is delegated entirely to the
//! store; this module never re-sorts what comes back.

mod record;
pub mod suggest;

pub use record::{DinnerForm, DinnerRecord, Money, Rating};

use std::sync::Arc;

use chrono::Utc;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::identity::Principal;
use crate::store::{paths, to_fields, Direction, DocumentStore, Query};

/// Columns the list view can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Restaurant,
    Date,
    Cost,
}

impl SortField {
    pub fn field_name(self) -> &'static str {
        match self {
            SortField::Restaurant => "restaurant",
            SortField::Date => "date",
            SortField::Cost => "cost",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "restaurant" => Some(SortField::Restaurant),
            "date" => Some(SortField::Date),
            "cost" => Some(SortField::Cost),
            _ => None,
        }
    }
}

/// Current list ordering. Toggling the active column flips its direction;
/// choosing a different column starts over ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: Direction,
}

impl Default for SortState {
    fn default() -> Self {
        Self { field: SortField::Date, direction: Direction::Desc }
    }
}

impl SortState {
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flip();
        } else {
            self.field = field;
            self.direction = Direction::Asc;
        }
    }
}

/// The dinner log over a principal's partition of the store.
pub struct DinnerLog {
    store: Arc<dyn DocumentStore>,
    sort: SortState,
}

impl DinnerLog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, sort: SortState::default() }
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
    }

    /// Validate and append one immutable record.
    ///
    /// Validation failures carry the inline message and nothing is written.
    /// A store failure is logged and returned as a write error; the caller
    /// keeps the form contents for a manual retry.
    pub async fn submit(&self, principal: &Principal, form: &DinnerForm) -> AppResult<DinnerRecord> {
        let now = Utc::now();
        let record = form.validate(now.date_naive(), now)?;
        let fields = to_fields(&record)
            .map_err(|e| AppError::internal("encode_failed", e.to_string()))?;
        self.store
            .add(&paths::dinners(&principal.uid), fields)
            .await
            .map_err(|e| {
                error!(restaurant = %record.restaurant, "dinner append failed: {e}");
                AppError::write("append_failed", format!("Could not save the visit: {e}"))
            })?;
        Ok(record)
    }

    /// Re-query the full partition under the current sort order.
    pub async fn list(&self, principal: &Principal) -> AppResult<Vec<DinnerRecord>> {
        let query = Query::new().order_by(self.sort.field.field_name(), self.sort.direction);
        let docs = self
            .store
            .query(&paths::dinners(&principal.uid), query)
            .await
            .map_err(|e| {
                error!("dinner query failed: {e}");
                AppError::store("query_failed", e.to_string())
            })?;
        docs.iter()
            .map(|d| d.parse::<DinnerRecord>().map_err(|e| AppError::store("bad_document", e.to_string())))
            .collect()
    }
}
