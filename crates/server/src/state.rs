use std::sync::Arc;

use podscout_core::{
    Config, ContentProvider, DiscoveryService, PodcastCatalog, PodcastSynchronizer,
    SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn PodcastCatalog>,
    discovery: DiscoveryService,
}

impl AppState {
    /// Wire the discovery service from an injected provider and catalog.
    pub fn new(
        config: Config,
        provider: Arc<dyn ContentProvider>,
        catalog: Arc<dyn PodcastCatalog>,
    ) -> Self {
        let synchronizer =
            PodcastSynchronizer::new(Arc::clone(&catalog), config.database.operation_timeout());
        let discovery = DiscoveryService::new(provider, synchronizer);

        Self {
            config,
            catalog,
            discovery,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn catalog(&self) -> Arc<dyn PodcastCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn discovery(&self) -> &DiscoveryService {
        &self.discovery
    }
}
