use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Inclusive range constraint on a single field.
#[derive(Debug, Clone)]
pub struct RangeFilter {
    pub field: String,
    pub low: Value,
    pub high: Value,
}

/// Declarative query handed to the store: optional ordering plus an optional
/// inclusive range. Filtering and ordering happen store-side.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub order_by: Option<(String, Direction)>,
    pub range: Option<RangeFilter>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn where_range(mut self, field: impl Into<String>, low: Value, high: Value) -> Self {
        self.range = Some(RangeFilter { field: field.into(), low, high });
        self
    }
}
