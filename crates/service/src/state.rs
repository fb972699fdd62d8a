use annex_store::{AnnotationStore, BlobStore, Store, StoreError};

use crate::config::Config;

/// Main service state - owns the injected store adapters.
#[derive(Clone)]
pub struct State {
    store: Store,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let store = match config.data_dir {
            Some(ref dir) => {
                tracing::info!(data_dir = %dir.display(), "opening local store");
                Store::new_local(dir).await?
            }
            // otherwise run fully ephemeral
            None => {
                tracing::info!("no data directory configured, using an ephemeral store");
                Store::new_ephemeral().await?
            }
        };

        Ok(Self { store })
    }

    /// Build state around an existing store (lets tests substitute
    /// ephemeral instances).
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn blobs(&self) -> &BlobStore {
        self.store.blobs()
    }

    pub fn annotations(&self) -> &AnnotationStore {
        self.store.annotations()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("store setup error: {0}")]
    Store(#[from] StoreError),
}
