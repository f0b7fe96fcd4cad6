use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;

use tubesignal_common::TubeSignalError;

/// Backing store for durable actor slots. One opaque JSON record per
/// (kind, key); serialisation is the slot's concern.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    async fn read(&self, kind: &str, key: &str) -> Result<Option<serde_json::Value>>;
    async fn write(&self, kind: &str, key: &str, state: serde_json::Value) -> Result<()>;
}

/// A mounted durable state slot: read once at activation, written through on
/// explicit `commit`. Unknown stored shapes fall back to the default value so
/// per-field evolution never blocks activation.
pub struct DurableSlot<T> {
    kind: &'static str,
    key: String,
    store: Arc<dyn StateStore>,
    state: T,
}

impl<T> DurableSlot<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    pub async fn mount(
        store: Arc<dyn StateStore>,
        kind: &'static str,
        key: &str,
    ) -> Result<Self, TubeSignalError> {
        let state = match store.read(kind, key).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(kind, key, error = %e, "Durable slot held an unreadable record, starting fresh");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                return Err(TubeSignalError::RouteUnavailable(format!(
                    "state store unreachable mounting {kind}/{key}: {e}"
                )))
            }
        };
        Ok(Self {
            kind,
            key: key.to_string(),
            store,
            state,
        })
    }

    pub fn get(&self) -> &T {
        &self.state
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.state
    }

    /// Write the current value through to the store.
    pub async fn commit(&self) -> Result<(), TubeSignalError> {
        let value = serde_json::to_value(&self.state)
            .map_err(|e| TubeSignalError::Persist(format!("{}/{}: {e}", self.kind, self.key)))?;
        self.store
            .write(self.kind, &self.key, value)
            .await
            .map_err(|e| TubeSignalError::Persist(format!("{}/{}: {e}", self.kind, self.key)))
    }
}

/// In-process store for tests and DB-less runs. Slots do not survive restart.
#[derive(Default)]
pub struct MemoryStateStore {
    records: std::sync::Mutex<HashMap<(String, String), serde_json::Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read(&self, kind: &str, key: &str) -> Result<Option<serde_json::Value>> {
        let records = self.records.lock().expect("state store lock poisoned");
        Ok(records.get(&(kind.to_string(), key.to_string())).cloned())
    }

    async fn write(&self, kind: &str, key: &str, state: serde_json::Value) -> Result<()> {
        let mut records = self.records.lock().expect("state store lock poisoned");
        records.insert((kind.to_string(), key.to_string()), state);
        Ok(())
    }
}

/// Postgres-backed store: one upsert table keyed by (kind, key).
pub struct PostgresStateStore {
    pool: PgPool,
}

impl PostgresStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table if this is a fresh database.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS actor_state (
                 kind TEXT NOT NULL,
                 key TEXT NOT NULL,
                 state JSONB NOT NULL,
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                 PRIMARY KEY (kind, key)
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for PostgresStateStore {
    async fn read(&self, kind: &str, key: &str) -> Result<Option<serde_json::Value>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM actor_state WHERE kind = $1 AND key = $2")
                .bind(kind)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(state,)| state))
    }

    async fn write(&self, kind: &str, key: &str, state: serde_json::Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO actor_state (kind, key, state, updated_at)
             VALUES ($1, $2, $3, now())
             ON CONFLICT (kind, key)
             DO UPDATE SET state = EXCLUDED.state, updated_at = now()",
        )
        .bind(kind)
        .bind(key)
        .bind(state)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct SlotState {
        count: u32,
        label: String,
    }

    #[tokio::test]
    async fn slot_round_trips_through_memory_store() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());

        let mut slot = DurableSlot::<SlotState>::mount(store.clone(), "test", "k")
            .await
            .unwrap();
        assert_eq!(*slot.get(), SlotState::default());

        slot.get_mut().count = 7;
        slot.get_mut().label = "warm".to_string();
        slot.commit().await.unwrap();

        let reloaded = DurableSlot::<SlotState>::mount(store, "test", "k")
            .await
            .unwrap();
        assert_eq!(reloaded.get().count, 7);
        assert_eq!(reloaded.get().label, "warm");
    }

    #[tokio::test]
    async fn uncommitted_changes_are_not_persisted() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());

        let mut slot = DurableSlot::<SlotState>::mount(store.clone(), "test", "k")
            .await
            .unwrap();
        slot.get_mut().count = 42;
        drop(slot);

        let reloaded = DurableSlot::<SlotState>::mount(store, "test", "k")
            .await
            .unwrap();
        assert_eq!(reloaded.get().count, 0);
    }

    #[tokio::test]
    async fn slots_are_isolated_by_kind_and_key() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStateStore::new());

        let mut a = DurableSlot::<SlotState>::mount(store.clone(), "alpha", "k")
            .await
            .unwrap();
        a.get_mut().count = 1;
        a.commit().await.unwrap();

        let b = DurableSlot::<SlotState>::mount(store.clone(), "beta", "k")
            .await
            .unwrap();
        assert_eq!(b.get().count, 0);

        let other = DurableSlot::<SlotState>::mount(store, "alpha", "other")
            .await
            .unwrap();
        assert_eq!(other.get().count, 0);
    }
}
