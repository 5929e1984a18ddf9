//! Persistence boundary for consultants.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// One row of the consultant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consultant {
    /// Primary key.
    pub id: u32,
    /// Display name.
    pub name: String,
}

impl Consultant {
    /// Builds a row.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Failures reported by a [`ConsultantStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store connection failed: {message}")]
    Connection {
        /// Backend detail, for logs only.
        message: String,
    },
    /// The store was reached but the query failed.
    #[error("store query failed: {message}")]
    Execution {
        /// Backend detail, for logs only.
        message: String,
    },
}

impl StoreError {
    /// Message sent to clients in the error envelope.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "Connection error",
            Self::Execution { .. } => "Execution error",
        }
    }
}

/// Consultant persistence used by the booking handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultantStore: Send + Sync {
    /// All consultants in id order.
    async fn list(&self) -> Result<Vec<Consultant>, StoreError>;

    /// Inserts every name not already present and returns how many rows were
    /// added. Repeats within `names` are inserted once.
    async fn insert_missing(&self, names: &[String]) -> Result<u32, StoreError>;
}

/// Names the store starts with.
pub const FIXTURE_NAMES: [&str; 5] = [
    "Bruce Wayne",
    "Clark Kent",
    "Diana Prince",
    "Barry Allen",
    "Arthur Curry",
];

#[derive(Debug, Default)]
struct Rows {
    consultants: Vec<Consultant>,
    next_id: u32,
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Rows>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding [`FIXTURE_NAMES`] with ids `1..=5`.
    pub fn seeded() -> Self {
        let consultants: Vec<Consultant> = (1..)
            .zip(FIXTURE_NAMES)
            .map(|(id, name)| Consultant::new(id, name))
            .collect();
        let next_id = consultants.last().map_or(1, |last| last.id + 1);
        Self {
            rows: Mutex::new(Rows {
                consultants,
                next_id,
            }),
        }
    }

    fn with_rows<T>(&self, apply: impl FnOnce(&mut Rows) -> T) -> Result<T, StoreError> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::Execution {
            message: "consultant table lock poisoned".to_owned(),
        })?;
        Ok(apply(&mut rows))
    }
}

#[async_trait]
impl ConsultantStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Consultant>, StoreError> {
        self.with_rows(|rows| rows.consultants.clone())
    }

    async fn insert_missing(&self, names: &[String]) -> Result<u32, StoreError> {
        self.with_rows(|rows| {
            let mut known: HashSet<String> = rows
                .consultants
                .iter()
                .map(|consultant| consultant.name.clone())
                .collect();
            let mut inserted = 0;
            for name in names {
                if known.insert(name.clone()) {
                    let id = rows.next_id.max(1);
                    rows.next_id = id + 1;
                    rows.consultants.push(Consultant::new(id, name.clone()));
                    inserted += 1;
                }
            }
            inserted
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn seeded_store_lists_fixtures_in_order() {
        let rows = MemoryStore::seeded().list().await.expect("list");
        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, FIXTURE_NAMES);
        assert_eq!(rows.first().map(|row| row.id), Some(1));
    }

    #[rstest]
    #[tokio::test]
    async fn insert_skips_existing_and_repeated_names() {
        let store = MemoryStore::seeded();
        let names = vec![
            "Clark Kent".to_owned(),
            "Hal Jordan".to_owned(),
            "Hal Jordan".to_owned(),
        ];

        assert_eq!(store.insert_missing(&names).await.expect("insert"), 1);
        let rows = store.list().await.expect("list");
        assert_eq!(rows.last(), Some(&Consultant::new(6, "Hal Jordan")));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_store_starts_at_one() {
        let store = MemoryStore::new();
        store
            .insert_missing(&["Oliver Queen".to_owned()])
            .await
            .expect("insert");
        assert_eq!(
            store.list().await.expect("list"),
            vec![Consultant::new(1, "Oliver Queen")]
        );
    }
}
