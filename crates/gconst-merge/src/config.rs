use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const POLICY_ENV: &str = "GCONST_COLLECTION_POLICY";
pub const MAX_DEPTH_ENV: &str = "GCONST_MAX_DEPTH";

/// How list and map fields are planned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPolicy {
    /// A collection is one opaque leaf: donated whole into an empty target,
    /// cleared whole when equal to the reference.
    #[default]
    WholeValue,
    /// Maps donate missing keys and merge record entries present on both
    /// sides. Lists and reduce still act on the whole collection.
    ElementAware,
}

impl CollectionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WholeValue => "whole_value",
            Self::ElementAware => "element_aware",
        }
    }
}

impl FromStr for CollectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "whole_value" | "whole" => Ok(Self::WholeValue),
            "element_aware" | "element" => Ok(Self::ElementAware),
            other => Err(ConfigError::Policy(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown collection policy '{0}' (expected whole_value or element_aware)")]
    Policy(String),
    #[error("invalid max depth '{0}'")]
    MaxDepth(String),
}

/// Plan construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub policy: CollectionPolicy,
    /// Deepest record nesting the shape walker will follow.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: CollectionPolicy::WholeValue,
            max_depth: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_policy(mut self, policy: CollectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Defaults overridden by `GCONST_COLLECTION_POLICY` / `GCONST_MAX_DEPTH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(policy) = lookup(POLICY_ENV) {
            config.policy = policy.parse()?;
        }
        if let Some(depth) = lookup(MAX_DEPTH_ENV) {
            config.max_depth = depth
                .trim()
                .parse()
                .map_err(|_| ConfigError::MaxDepth(depth.clone()))?;
        }
        Ok(config)
    }
}
