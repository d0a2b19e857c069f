//! imgnorm core - embeddable batch image normalization.
//!
//! Takes in-memory image blobs and returns normalized, consistently named
//! outputs plus an optional zip archive. Every step is optional and driven by
//! a per-batch [`ProcessingConfig`]:
//!
//! ```text
//! bytes → Decode → Trim → Square-pad → Letterbox → Logo → Encode → Name → Zip
//! ```
//!
//! Items are processed concurrently on a bounded worker pool. A failing item
//! is recorded and never aborts its siblings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use imgnorm_core::{Config, InputItem, Normalizer, Preset};
//!
//! #[tokio::main]
//! async fn main() -> imgnorm_core::Result<()> {
//!     let normalizer = Normalizer::new(Config::load()?)?;
//!     let items = vec![InputItem::new("shoe.png", std::fs::read("shoe.png")?)];
//!
//!     let result = normalizer.process(items, Preset::Trim.config()).await?;
//!     for output in &result.succeeded {
//!         println!("{} ({} bytes)", output.name, output.bytes.len());
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod presets;
pub mod report;
pub mod types;

use std::sync::Arc;

// Re-exports for convenient access
pub use archive::{Archive, ArchiveBuilder, DEFAULT_ARCHIVE_NAME};
pub use cache::ResultCache;
pub use config::{Canvas, Config, Logo, LogoSettings, ProcessingConfig};
pub use error::{ConfigError, ItemError, ItemResult, NormalizeError, Result};
pub use pipeline::{
    Anchor, BatchCoordinator, CancelToken, FormatRegistry, ImageDecoder, ItemProcessor,
    NamingMode, OutputFormat,
};
pub use presets::Preset;
pub use report::{BatchReport, ReportFormat, ReportWriter};
pub use types::{BatchResult, BatchStats, FailedItem, InputItem, OutputItem, Progress};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The main entry point: owns the format registry, the worker pool settings
/// and the result cache for the lifetime of the process.
pub struct Normalizer {
    config: Config,
    registry: Arc<FormatRegistry>,
    decoder: ImageDecoder,
    coordinator: BatchCoordinator,
    cache: Option<ResultCache>,
}

impl Normalizer {
    /// Create a normalizer from a configuration.
    ///
    /// Fails with a [`ConfigError`] if the configuration is out of range.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        tracing::debug!("Initializing imgnorm v{}", VERSION);

        let registry = Arc::new(FormatRegistry::from_config(&config.processing));
        tracing::debug!(
            "Registered {} input formats",
            registry.formats().len()
        );

        let decoder = ImageDecoder::new(registry.clone(), config.limits.clone());
        let processor = Arc::new(ItemProcessor::new(ImageDecoder::new(
            registry.clone(),
            config.limits.clone(),
        )));
        let coordinator = BatchCoordinator::new(
            processor,
            config.processing.parallel_workers,
            config.processing.max_items,
        );
        tracing::debug!(
            "Batches run on {} workers, capped at {} items",
            coordinator.workers(),
            coordinator.max_items()
        );
        let cache = ResultCache::from_config(&config.cache);

        Ok(Self {
            config,
            registry,
            decoder,
            coordinator,
            cache,
        })
    }

    /// Create a normalizer from the config file at the default location.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Self::new(config)
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Decode a logo image with the same registry and limits as batch items.
    pub fn load_logo(&self, bytes: &[u8], name: &str) -> Result<Arc<Logo>> {
        let decoded = self
            .decoder
            .decode(bytes, name)
            .map_err(NormalizeError::Logo)?;
        tracing::debug!(
            "Loaded logo {:?} ({}x{})",
            name,
            decoded.width(),
            decoded.height()
        );
        Ok(Arc::new(Logo::new(decoded.image)))
    }

    /// Run a batch with no progress reporting and no cancellation.
    pub async fn process(
        &self,
        items: Vec<InputItem>,
        job: ProcessingConfig,
    ) -> Result<Arc<BatchResult>> {
        self.process_with(items, Arc::new(job), |_| {}, &CancelToken::new())
            .await
    }

    /// Run a batch.
    ///
    /// The job is validated before anything is dispatched. An identical
    /// earlier batch still in the cache is returned as is, and `progress`
    /// then sees a single completed update.
    pub async fn process_with<F>(
        &self,
        items: Vec<InputItem>,
        job: Arc<ProcessingConfig>,
        mut progress: F,
        cancel: &CancelToken,
    ) -> Result<Arc<BatchResult>>
    where
        F: FnMut(Progress),
    {
        job.validate()?;

        let key = match &self.cache {
            Some(_) => Some(pipeline::Hasher::batch_key(
                &items,
                &job,
                self.coordinator.max_items(),
            )?),
            None => None,
        };

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                tracing::info!("Returning cached result for {} items", items.len());
                progress(Progress {
                    completed: hit.stats.total,
                    total: hit.stats.total,
                });
                return Ok(hit);
            }
        }

        let result = Arc::new(
            self.coordinator
                .run(items, job, &mut progress, cancel)
                .await,
        );

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, result.clone());
        }

        Ok(result)
    }

    /// Package a batch's outputs into a zip archive when there is more than
    /// one.
    pub fn package(&self, result: &BatchResult, archive_name: &str) -> Result<Option<Archive>> {
        ArchiveBuilder::build(&result.succeeded, archive_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_normalizer_new() {
        let normalizer = Normalizer::new(Config::default()).unwrap();
        assert_eq!(normalizer.config().processing.parallel_workers, 8);
        assert!(normalizer.registry().supports_extension("png"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.processing.parallel_workers = 0;
        assert!(matches!(
            Normalizer::new(config),
            Err(NormalizeError::Config(ConfigError::ValidationError(_)))
        ));
    }

    #[tokio::test]
    async fn test_logo_preset_without_logo_fails_before_dispatch() {
        let normalizer = Normalizer::new(Config::default()).unwrap();
        let items = vec![InputItem::new("a.png", vec![1, 2, 3])];
        let err = normalizer
            .process(items, Preset::Logo.config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::Config(ConfigError::MissingLogo)
        ));
    }

    #[test]
    fn test_load_logo_rejects_garbage() {
        let normalizer = Normalizer::new(Config::default()).unwrap();
        let err = normalizer.load_logo(b"not a logo", "logo.png").unwrap_err();
        assert!(matches!(err, NormalizeError::Logo(_)));
    }
}
