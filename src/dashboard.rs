//! Home-view aggregate: how many restaurants were visited in a calendar
//! year. The store answers a date range query; the count is just the size
//! of the result set.

use serde_json::json;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::identity::Principal;
use crate::store::{paths, DocumentStore, Query};

/// Count the principal's dinner records dated within `year`
/// (`{year}-01-01` through `{year}-12-31`, inclusive).
pub async fn visits_in_year(store: &dyn DocumentStore, principal: &Principal, year: i32) -> AppResult<usize> {
    let query = Query::new().where_range(
        "date",
        json!(format!("{year}-01-01")),
        json!(format!("{year}-12-31")),
    );
    let docs = store
        .query(&paths::dinners(&principal.uid), query)
        .await
        .map_err(|e| {
            error!(year, "restaurant count query failed: {e}");
            AppError::store("count_failed", e.to_string())
        })?;
    Ok(docs.len())
}
