use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::time::{Duration, timeout};

const OPERATION_TIMEOUT: Duration = Duration::from_secs(5);
const BUSY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub chat_id: i64,
    pub display_name: Option<String>,
}

/// Durable registry of every chat that ever issued `/start`.
///
/// No connection is held between calls: each operation opens the database
/// file on a blocking worker, runs, and drops the connection before
/// returning, whatever the outcome.
pub struct SubscriberStore {
    path: PathBuf,
    op_timeout: Duration,
}

impl SubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            op_timeout: OPERATION_TIMEOUT,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the database file, its directory and the schema if absent.
    pub fn init(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = open_connection(&self.path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS subscribers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL UNIQUE,
                display_name TEXT,
                joined_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        )?;
        Ok(())
    }

    async fn execute_with_timeout<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<T, StoreError> {
            let conn = open_connection(&path)?;
            Ok(f(&conn)?)
        });

        match timeout(self.op_timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(StoreError::Timeout(self.op_timeout)),
        }
    }

    /// Inserts the chat unless it is already known. Returns `true` when a new
    /// row was created. An existing row is never updated.
    pub async fn register(&self, chat_id: i64, display_name: Option<String>) -> Result<bool, StoreError> {
        self.execute_with_timeout(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO subscribers (chat_id, display_name) VALUES (?1, ?2)",
                params![chat_id, display_name],
            )?;
            Ok(inserted == 1)
        })
        .await
    }

    /// All subscriber chat ids in registration order.
    pub async fn list_ids(&self) -> Result<Vec<i64>, StoreError> {
        self.execute_with_timeout(|conn| {
            let mut stmt = conn.prepare("SELECT chat_id FROM subscribers ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids)
        })
        .await
    }

    pub async fn list_with_names(&self) -> Result<Vec<Subscriber>, StoreError> {
        self.execute_with_timeout(|conn| {
            let mut stmt =
                conn.prepare("SELECT chat_id, display_name FROM subscribers ORDER BY id")?;
            let subscribers = stmt
                .query_map([], |row| {
                    Ok(Subscriber {
                        chat_id: row.get(0)?,
                        display_name: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(subscribers)
        })
        .await
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        self.execute_with_timeout(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM subscribers", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

fn open_connection(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, SubscriberStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SubscriberStore::new(dir.path().join("nested").join("subscribers.db"));
        store.init().unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_register_is_idempotent_and_keeps_first_name() {
        let (_dir, store) = temp_store();

        assert!(store.register(111, Some("alice".to_string())).await.unwrap());
        assert!(!store.register(111, Some("alice_renamed".to_string())).await.unwrap());

        let subscribers = store.list_with_names().await.unwrap();
        assert_eq!(
            subscribers,
            vec![Subscriber {
                chat_id: 111,
                display_name: Some("alice".to_string())
            }]
        );
    }

    #[tokio::test]
    async fn test_list_ids_follows_registration_order() {
        let (_dir, store) = temp_store();

        for id in [333, 111, -100222] {
            store.register(id, None).await.unwrap();
        }
        store.register(111, None).await.unwrap();

        assert_eq!(store.list_ids().await.unwrap(), vec![333, 111, -100222]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_count_never_decreases() {
        let (_dir, store) = temp_store();
        let mut last = 0;
        for id in [1, 2, 2, 3, 1, 4] {
            store.register(id, None).await.unwrap();
            let count = store.list_ids().await.unwrap().len();
            assert!(count >= last);
            last = count;
        }
        assert_eq!(last, 4);
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let (dir, store) = temp_store();
        store.register(555, Some("bob".to_string())).await.unwrap();
        drop(store);

        let reopened = SubscriberStore::new(dir.path().join("nested").join("subscribers.db"));
        reopened.init().unwrap();
        let subscribers = reopened.list_with_names().await.unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].chat_id, 555);
        assert_eq!(subscribers[0].display_name.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_concurrent_register_same_chat() {
        let (_dir, store) = temp_store();
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.register(900, Some(format!("name{}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list_ids().await.unwrap(), vec![900]);
    }

    #[tokio::test]
    async fn test_uninitialized_store_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubscriberStore::new(dir.path().join("empty.db"));
        let err = store.list_ids().await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
