use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Fixed-point currency amount stored as integer cents, so two fractional
/// digits are exact and store-side ordering on the raw value is consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Star rating in half-step units: 0, 0.5, .. 5.0.
/// Serialized as the 0-5 float the store keeps; anything off the half-step
/// grid is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(u8);

impl Rating {
    pub fn stars(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let steps = value * 2.0;
        if !(0.0..=10.0).contains(&steps) || steps.fract() != 0.0 {
            return Err(format!("rating {value} is not a half-step value in [0, 5]"));
        }
        Ok(Rating(steps as u8))
    }
}

impl From<Rating> for f64 {
    fn from(r: Rating) -> f64 {
        r.stars()
    }
}

/// One restaurant visit. Immutable once appended; there is no edit or
/// delete path anywhere in the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DinnerRecord {
    pub restaurant: String,
    pub date: NaiveDate,
    pub cost: Money,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

/// Raw form input as typed at the prompt. Kept by the caller across a
/// failed submit so the user can retry without re-entering everything.
#[derive(Debug, Clone, Default)]
pub struct DinnerForm {
    pub restaurant: String,
    pub date: String,
    pub cost: String,
    pub rating: f64,
}

impl DinnerForm {
    /// Apply all validation rules and produce the record to append.
    /// Any failure yields a user-visible message and performs no write.
    pub fn validate(&self, today: NaiveDate, created_at: DateTime<Utc>) -> AppResult<DinnerRecord> {
        let restaurant = self.restaurant.trim();
        if restaurant.is_empty() {
            return Err(AppError::validation("bad_restaurant", "A restaurant name is required."));
        }

        let date = parse_visit_date(&self.date, today)?;
        let cost = parse_cost(&self.cost)?;
        let rating = Rating::try_from(self.rating)
            .map_err(|_| AppError::validation("bad_rating", "The rating must be between 0 and 5 in half-star steps."))?;

        Ok(DinnerRecord { restaurant: restaurant.to_string(), date, cost, rating, created_at })
    }
}

/// The visit date must be a calendar date no later than today.
fn parse_visit_date(input: &str, today: NaiveDate) -> AppResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation("bad_date", "The date visited must be a calendar date (YYYY-MM-DD)."))?;
    if date > today {
        return Err(AppError::validation("bad_date", "The date visited cannot be in the future."));
    }
    Ok(date)
}

/// The cost must be a number whose value is unchanged when rounded to two
/// decimal places; "12" normalizes to 12.00, "12.345" is rejected.
fn parse_cost(input: &str) -> AppResult<Money> {
    let invalid =
        || AppError::validation("bad_cost", "The total meal cost must be a valid number with two decimal places.");
    let value: f64 = input.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    let cents = (value * 100.0).round();
    if cents / 100.0 != value || cents.abs() >= i64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Money::from_cents(cents as i64))
}
