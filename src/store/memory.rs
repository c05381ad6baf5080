//! In-process store adapter.
//! Backs the shell and the test suite. This is deliberately not a
//! persistence engine: collections live in a lock-guarded map for the
//! lifetime of the process, and the query semantics mirror what the
//! external store contract promises (inclusive ranges, store-side ordering,
//! documents missing the ordered field sorted last).

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use super::{Document, DocumentData, DocumentStore, Query, StoreError};
use crate::store::Direction;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let map = self.collections.read();
        Ok(map
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == key))
            .cloned())
    }

    async fn set(&self, collection: &str, key: &str, fields: DocumentData) -> Result<(), StoreError> {
        let mut map = self.collections.write();
        let docs = map.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == key) {
            Some(existing) => existing.fields = fields,
            None => docs.push(Document::new(key, fields)),
        }
        Ok(())
    }

    async fn add(&self, collection: &str, fields: DocumentData) -> Result<Document, StoreError> {
        let doc = Document::new(Uuid::new_v4().to_string(), fields);
        let mut map = self.collections.write();
        map.entry(collection.to_string()).or_default().push(doc.clone());
        Ok(doc)
    }

    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        let map = self.collections.read();
        let mut docs: Vec<Document> = map.get(collection).cloned().unwrap_or_default();

        if let Some(range) = &query.range {
            docs.retain(|d| match d.field(&range.field) {
                Some(v) => {
                    compare_values(v, &range.low) != Ordering::Less
                        && compare_values(v, &range.high) != Ordering::Greater
                }
                None => false,
            });
        }

        if let Some((field, direction)) = &query.order_by {
            docs.sort_by(|a, b| ordered_cmp(a.field(field), b.field(field), *direction));
        }

        Ok(docs)
    }
}

/// Compare two documents on an order-by field. Documents missing the field
/// sort after those that carry it, in either direction.
fn ordered_cmp(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // Mixed or unordered types: keep a deterministic rank so sorts are stable
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> DocumentData {
        let mut m = DocumentData::new();
        for (k, v) in pairs {
            m.insert((*k).to_string(), v.clone());
        }
        m
    }

    #[tokio::test]
    async fn set_then_get_round_trips_and_upserts() {
        let store = MemoryStore::new();
        store.set("allowedUsers", "a@example.com", fields(&[("seeded", json!(true))])).await.unwrap();
        let doc = store.get("allowedUsers", "a@example.com").await.unwrap().unwrap();
        assert_eq!(doc.field("seeded"), Some(&json!(true)));

        store.set("allowedUsers", "a@example.com", fields(&[("seeded", json!(false))])).await.unwrap();
        let doc = store.get("allowedUsers", "a@example.com").await.unwrap().unwrap();
        assert_eq!(doc.field("seeded"), Some(&json!(false)));
        assert!(store.get("allowedUsers", "b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.add("c", fields(&[("n", json!(1))])).await.unwrap();
        let b = store.add("c", fields(&[("n", json!(2))])).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.query("c", Query::new()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn query_orders_strings_and_numbers() {
        let store = MemoryStore::new();
        for (name, cost) in [("beta", 20.0), ("alpha", 30.0), ("gamma", 10.0)] {
            store.add("d", fields(&[("restaurant", json!(name)), ("cost", json!(cost))])).await.unwrap();
        }

        let by_name = store
            .query("d", Query::new().order_by("restaurant", Direction::Asc))
            .await
            .unwrap();
        let names: Vec<_> = by_name.iter().map(|d| d.field("restaurant").unwrap().clone()).collect();
        assert_eq!(names, vec![json!("alpha"), json!("beta"), json!("gamma")]);

        let by_cost = store
            .query("d", Query::new().order_by("cost", Direction::Desc))
            .await
            .unwrap();
        let costs: Vec<_> = by_cost.iter().map(|d| d.field("cost").unwrap().clone()).collect();
        assert_eq!(costs, vec![json!(30.0), json!(20.0), json!(10.0)]);
    }

    #[tokio::test]
    async fn query_range_is_inclusive() {
        let store = MemoryStore::new();
        for date in ["2024-12-31", "2025-01-01", "2025-06-15", "2025-12-31", "2026-01-01"] {
            store.add("d", fields(&[("date", json!(date))])).await.unwrap();
        }
        let hits = store
            .query(
                "d",
                Query::new().where_range("date", json!("2025-01-01"), json!("2025-12-31")),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn missing_order_field_sorts_last() {
        let store = MemoryStore::new();
        store.add("d", fields(&[("other", json!(1))])).await.unwrap();
        store.add("d", fields(&[("date", json!("2025-01-01"))])).await.unwrap();
        let docs = store.query("d", Query::new().order_by("date", Direction::Desc)).await.unwrap();
        assert!(docs[0].field("date").is_some());
        assert!(docs[1].field("date").is_none());
    }
}
