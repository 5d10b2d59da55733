//! CLI subcommand implementations for the peermatch binary.

pub mod cache_cmd;
pub mod compare_cmd;
pub mod import_cmd;
pub mod neighbors_cmd;
pub mod output;
pub mod recommend_cmd;
pub mod vector_cmd;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::EngineConfig;
use crate::recommend::assembler::Recommender;
use crate::similarity::cache::PairwiseCache;
use crate::similarity::knn::KnnSearch;
use crate::storage::sqlite::SqliteStore;
use crate::storage::SimilarityCacheStore;
use crate::vector::builder::VectorBuilder;

/// Default data directory (`~/.peermatch`).
pub fn peermatch_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".peermatch")
}

/// Database path: explicit flag, or `~/.peermatch/peermatch.db`.
pub fn database_path(db: Option<&Path>) -> PathBuf {
    db.map(Path::to_path_buf)
        .unwrap_or_else(|| peermatch_home().join("peermatch.db"))
}

/// Everything a subcommand needs, wired over one SQLite store.
pub struct Engine {
    pub store: Arc<SqliteStore>,
    pub builder: Arc<VectorBuilder>,
    pub knn: Arc<KnnSearch>,
    pub recommender: Recommender,
    pub config: EngineConfig,
}

impl Engine {
    pub fn open(db: Option<&Path>) -> Result<Self> {
        let path = database_path(db);
        let store = Arc::new(
            SqliteStore::open(&path)
                .with_context(|| format!("opening database at {}", path.display()))?,
        );
        Ok(Self::over(store))
    }

    pub fn over(store: Arc<SqliteStore>) -> Self {
        let config = EngineConfig::default();
        let builder = Arc::new(VectorBuilder::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let cache = Arc::new(PairwiseCache::new(
            store.clone() as Arc<dyn SimilarityCacheStore>
        ));
        let knn = Arc::new(KnnSearch::new(
            builder.clone(),
            store.clone(),
            cache,
            config.clone(),
        ));
        let recommender = Recommender::new(
            knn.clone(),
            builder.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            config.clone(),
        );
        Self {
            store,
            builder,
            knn,
            recommender,
            config,
        }
    }
}
