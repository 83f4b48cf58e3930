use crate::{
    config::{RuntimeConfiguration, StoreConfig},
    error::ApiResult,
    routes::sse::StudentChange,
    store::{StudentStore, memory::InMemoryStudentStore, postgres::PostgresStudentStore},
};
use sqlx::postgres::PgPoolOptions;
use std::{ops::Deref, sync::Arc};
use tokio::sync::broadcast::{Receiver, Sender, channel};

const CHANGE_FEED_CAPACITY: usize = 64;

#[derive(Clone, Debug)]
pub struct AppState {
    store: Arc<dyn StudentStore>,
    change_sender: Sender<StudentChange>,
}

impl AppState {
    pub async fn new(options: PgPoolOptions, config: &RuntimeConfiguration) -> ApiResult<Self> {
        let store: Arc<dyn StudentStore> = match config.store_config() {
            StoreConfig::InMemory => {
                info!("Using in-memory student store");
                Arc::new(InMemoryStudentStore::default())
            }
            StoreConfig::Postgres(db_config) => {
                info!("Using postgres student store");
                Arc::new(PostgresStudentStore::connect(options, &db_config).await?)
            }
        };

        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<dyn StudentStore>) -> Self {
        let (tx, _rx) = channel(CHANGE_FEED_CAPACITY);

        Self {
            store,
            change_sender: tx,
        }
    }

    pub fn subscribe_to_changes(&self) -> Receiver<StudentChange> {
        self.change_sender.subscribe()
    }

    pub fn announce(&self, change: StudentChange) {
        // no subscribers is fine
        let _ = self.change_sender.send(change);
    }

    pub async fn sensible_shutdown(&self) -> ApiResult<()> {
        self.store.close().await;
        Ok(())
    }
}

impl Deref for AppState {
    type Target = dyn StudentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
