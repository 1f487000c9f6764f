//! In-memory resource implementation for testing and development

use crate::core::resource::{GetOperation, PageOperation, ResourceError, SearchOperation};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

/// In-memory resource holding a list of JSON items
///
/// Implements every operation, so it can back any descriptor:
/// - `page` returns a 1-based slice of the items
/// - `search` filters on equality with each criteria member, sorts, then pages
/// - `get` looks an item up by its `uid` (or `id`) member
///
/// Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryResource {
    items: Arc<RwLock<Vec<Value>>>,
}

impl InMemoryResource {
    /// Create a new in-memory resource
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Append an item
    pub fn insert(&self, item: Value) -> Result<(), ResourceError> {
        self.items
            .write()
            .map_err(|e| ResourceError::other(format!("Failed to acquire write lock: {}", e)))?
            .push(item);
        Ok(())
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Result<Vec<Value>, ResourceError> {
        self.items
            .read()
            .map(|items| items.clone())
            .map_err(|e| ResourceError::other(format!("Failed to acquire read lock: {}", e)))
    }
}

#[async_trait]
impl PageOperation for InMemoryResource {
    async fn page(&self, page: u64, size: u64) -> Result<Value, ResourceError> {
        Ok(Value::Array(paginate(self.snapshot()?, page, size)))
    }
}

#[async_trait]
impl SearchOperation for InMemoryResource {
    async fn search(
        &self,
        page: u64,
        size: u64,
        sort: &str,
        criteria: Value,
    ) -> Result<Value, ResourceError> {
        let criteria = match criteria {
            Value::Object(criteria) => criteria,
            Value::Null => Map::new(),
            _ => {
                return Err(ResourceError::response(
                    400,
                    Some(json!({"error": "search criteria must be an object"})),
                ));
            }
        };

        let mut matches: Vec<Value> = self
            .snapshot()?
            .into_iter()
            .filter(|item| matches_criteria(item, &criteria))
            .collect();

        let (field, descending) = match sort.strip_prefix('-') {
            Some(field) => (field, true),
            None => (sort, false),
        };
        matches.sort_by(|a, b| compare_field(a.get(field), b.get(field), descending));

        Ok(Value::Array(paginate(matches, page, size)))
    }
}

#[async_trait]
impl GetOperation for InMemoryResource {
    async fn get(&self, id: &str) -> Result<Value, ResourceError> {
        self.snapshot()?
            .into_iter()
            .find(|item| {
                ["uid", "id"]
                    .iter()
                    .any(|key| item.get(*key).is_some_and(|value| loosely_equals(value, id)))
            })
            .ok_or_else(|| {
                ResourceError::response(404, Some(json!({"error": format!("no item with uid '{}'", id)})))
            })
    }
}

fn paginate(items: Vec<Value>, page: u64, size: u64) -> Vec<Value> {
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    let start = usize::try_from(page.saturating_sub(1))
        .unwrap_or(usize::MAX)
        .saturating_mul(size);

    items.into_iter().skip(start).take(size).collect()
}

fn matches_criteria(item: &Value, criteria: &Map<String, Value>) -> bool {
    criteria.iter().all(|(key, expected)| match (item.get(key), expected) {
        (Some(actual), Value::String(expected)) => loosely_equals(actual, expected),
        (Some(actual), expected) => actual == expected,
        (None, _) => false,
    })
}

/// Form-encoded criteria arrive as strings; compare them to the rendered field
fn loosely_equals(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::String(actual) => actual == expected,
        Value::Number(_) | Value::Bool(_) => actual.to_string() == expected,
        _ => false,
    }
}

/// Missing fields always sort last, whatever the direction
fn compare_field(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            if descending { ordering.reverse() } else { ordering }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
