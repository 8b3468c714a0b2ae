//! Global CLI options.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gconst_merge::{CollectionPolicy, EngineConfig};
use gconst_types::SchemaIndex;

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Schema document (`{"records": [...]}`) (env: GCONST_SCHEMAS)
    #[arg(short = 's', long, global = true, env = "GCONST_SCHEMAS")]
    pub schemas: Option<PathBuf>,

    /// Collection policy: whole_value or element_aware (env: GCONST_COLLECTION_POLICY)
    #[arg(long, global = true)]
    pub policy: Option<CollectionPolicy>,

    /// Deepest record nesting followed when planning (env: GCONST_MAX_DEPTH)
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl GlobalOpts {
    pub fn load_schemas(&self) -> Result<SchemaIndex> {
        let path = self
            .schemas
            .as_ref()
            .context("no schema document given (use --schemas or GCONST_SCHEMAS)")?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schemas: {}", path.display()))?;
        SchemaIndex::from_json_str(&text)
            .with_context(|| format!("invalid schemas: {}", path.display()))
    }

    /// Environment defaults overridden by explicit flags.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::from_env().context("engine config from environment")?;
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        Ok(config)
    }
}
