//! ASCII rendering for the shell's list views.

use crate::dinners::{DinnerRecord, SortField, SortState};
use crate::store::Direction;

const HEADERS: [&str; 4] = ["Restaurant", "Date Visited", "Meal Cost ($)", "Rating"];
const SORTABLE: [Option<SortField>; 4] =
    [Some(SortField::Restaurant), Some(SortField::Date), Some(SortField::Cost), None];

/// Render the dinner list as an ASCII table, marking the active sort column.
/// Returns the full table as one string so views can print it atomically.
pub fn render_dinner_table(dinners: &[DinnerRecord], sort: SortState) -> String {
    if dinners.is_empty() {
        return "No restaurants added yet.\n".to_string();
    }

    let headers: Vec<String> = HEADERS
        .iter()
        .zip(SORTABLE.iter())
        .map(|(h, field)| match field {
            Some(f) if *f == sort.field => match sort.direction {
                Direction::Asc => format!("{h} ^"),
                Direction::Desc => format!("{h} v"),
            },
            _ => (*h).to_string(),
        })
        .collect();

    let rows: Vec<[String; 4]> = dinners
        .iter()
        .map(|d| {
            [
                d.restaurant.clone(),
                d.date.to_string(),
                d.cost.to_string(),
                format!("{:.1}", d.rating.stars()),
            ]
        })
        .collect();

    // Column widths from headers and cells
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let sep = build_separator(&widths);
    let mut out = String::new();
    out.push_str(&sep);
    out.push_str(&build_row(&headers, &widths));
    out.push_str(&sep);
    for row in &rows {
        out.push_str(&build_row(row, &widths));
    }
    out.push_str(&sep);
    out.push_str(&format!("rows: {}\n", rows.len()));
    out
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
    }
    s.push('\n');
    s
}

fn build_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (cell, w) in cells.iter().zip(widths) {
        s.push_str(&format!(" {:<width$} |", cell.as_ref(), width = w));
    }
    s.push('\n');
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dinners::DinnerForm;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(restaurant: &str, date: &str, cost: &str, rating: f64) -> DinnerRecord {
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        DinnerForm { restaurant: restaurant.into(), date: date.into(), cost: cost.into(), rating }
            .validate(today, now)
            .unwrap()
    }

    #[test]
    fn empty_list_renders_placeholder() {
        assert_eq!(render_dinner_table(&[], SortState::default()), "No restaurants added yet.\n");
    }

    #[test]
    fn table_marks_active_sort_column_and_counts_rows() {
        let rows = [record("Noma", "2025-06-15", "250.00", 4.5), record("Per Se", "2025-06-01", "310", 4.0)];
        let out = render_dinner_table(&rows, SortState::default());
        assert!(out.contains("Date Visited v"));
        assert!(out.contains("| Noma"));
        assert!(out.contains("250.00"));
        assert!(out.contains("310.00"));
        assert!(out.ends_with("rows: 2\n"));
    }
}
