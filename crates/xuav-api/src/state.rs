use crate::{ApiError, ApiResult};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};
use xuav_catalog::Catalog;
use xuav_core::Settings;
use xuav_graph::{init_schema, GraphStore, ImportService, QueryService};

/// Shared handler state.
///
/// The catalog is a path to a SQLite file and costs nothing to hold. The graph
/// store connects on first use, so the flat catalog API keeps working when no
/// graph server is reachable.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub catalog: Catalog,
    graph: Arc<OnceCell<GraphStore>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let catalog = Catalog::new(&settings.database.catalog.path);
        Self {
            settings: Arc::new(settings),
            catalog,
            graph: Arc::new(OnceCell::new()),
        }
    }

    /// State backed by an already connected graph store.
    pub fn with_graph(settings: Settings, store: GraphStore) -> Self {
        let mut state = Self::new(settings);
        state.graph = Arc::new(OnceCell::from(store));
        state
    }

    pub async fn graph(&self) -> ApiResult<&GraphStore> {
        self.graph
            .get_or_try_init(|| async {
                let config = &self.settings.database.graph;
                let store = GraphStore::connect(config).await?;
                init_schema(&store).await?;
                info!("Graph store connected at {}", config.connection);
                Ok::<_, xuav_core::XuavError>(store)
            })
            .await
            .map_err(|e| {
                error!("Graph store unavailable: {}", e);
                ApiError::ServiceUnavailable(format!("Graph database unavailable: {}", e))
            })
    }

    pub async fn queries(&self) -> ApiResult<QueryService> {
        Ok(QueryService::new(self.graph().await?.clone()))
    }

    pub async fn importer(&self) -> ApiResult<ImportService> {
        Ok(ImportService::new(self.graph().await?.clone()))
    }

    /// Run a blocking catalog call off the async runtime.
    pub async fn with_catalog<T, F>(&self, context: &'static str, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Catalog) -> xuav_core::Result<T> + Send + 'static,
    {
        let catalog = self.catalog.clone();
        tokio::task::spawn_blocking(move || f(&catalog))
            .await
            .map_err(|e| ApiError::Internal(format!("{}: {}", context, e)))?
            .map_err(|e| ApiError::from_store(context, e))
    }
}
