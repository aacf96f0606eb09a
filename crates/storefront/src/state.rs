//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::cart_store::CartStore;
use crate::catalog::{CatalogState, load_catalog};
use crate::config::ShopConfig;
use crate::persistence::FileSnapshotStore;
use crate::session::ShopSession;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The shop session sits behind a
/// single mutex so shopper actions run one at a time to completion.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    catalog: RwLock<CatalogState>,
    session: Mutex<ShopSession>,
}

impl AppState {
    /// Create state with a file-backed cart under `config.data_dir`.
    ///
    /// The cart snapshot is restored immediately; the catalog starts in
    /// [`CatalogState::Loading`] until [`Self::start_catalog_load`] finishes.
    #[must_use]
    pub fn new(config: ShopConfig) -> Self {
        let cart = CartStore::open(FileSnapshotStore::new(&config.data_dir));
        Self::with_cart(config, cart)
    }

    /// Create state around an existing cart store.
    #[must_use]
    pub fn with_cart(config: ShopConfig, cart: CartStore) -> Self {
        let session = ShopSession::new(cart, config.continue_delay);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: RwLock::new(CatalogState::Loading),
                session: Mutex::new(session),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// The catalog load state.
    #[must_use]
    pub fn catalog(&self) -> &RwLock<CatalogState> {
        &self.inner.catalog
    }

    /// The shopper session.
    #[must_use]
    pub fn session(&self) -> &Mutex<ShopSession> {
        &self.inner.session
    }

    /// Replace the catalog state.
    pub async fn set_catalog(&self, state: CatalogState) {
        *self.inner.catalog.write().await = state;
    }

    /// Load the catalog once and record the outcome.
    pub async fn load_catalog(&self) {
        let result = load_catalog(&self.inner.config.catalog_path).await;
        self.set_catalog(CatalogState::from_result(result)).await;
    }

    /// Spawn a background task that loads the catalog.
    ///
    /// Until it completes, the catalog reports `Loading`.
    pub fn start_catalog_load(&self) -> tokio::task::JoinHandle<()> {
        info!(
            path = %self.inner.config.catalog_path.display(),
            "Spawning background catalog load task"
        );
        let state = self.clone();
        tokio::spawn(async move {
            state.load_catalog().await;
        })
    }
}
