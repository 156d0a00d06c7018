pub mod catalog;
pub mod config;
pub mod discovery;
pub mod metrics;
pub mod podcast;
pub mod provider;
pub mod sync;
pub mod testing;

pub use catalog::{
    CatalogError, CatalogSearchQuery, CatalogStats, PodcastCatalog, SqliteCatalog, UpsertOutcome,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    ProviderConfig, SanitizedConfig, ServerConfig,
};
pub use discovery::{DiscoveryError, DiscoveryService, IngestReport};
pub use podcast::{
    derive_collection_id, CollectionId, ItemShape, MappingError, Podcast, StoredPodcast,
};
pub use provider::{ContentProvider, FeedPayload, ItunesClient, ProviderError, SearchPayload};
pub use sync::{PodcastSynchronizer, SyncError, SyncFailure, SyncOutcome};
