use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::metadata::LevelFilter;

use crate::client::{InvalidationPolicy, RetryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "sqlite" => Ok(Backend::Sqlite),
            other => bail!("unknown backend {other:?} (expected memory or sqlite)"),
        }
    }
}

/// Runtime settings, read from `GRADEBOOKD_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub workspace: Option<PathBuf>,
    pub latency: Duration,
    pub seed: bool,
    pub invalidation: InvalidationPolicy,
    pub retry: RetryPolicy,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::Memory,
            workspace: None,
            latency: Duration::from_millis(500),
            seed: true,
            invalidation: InvalidationPolicy::ClearOnMutate,
            retry: RetryPolicy::default(),
            log_level: LevelFilter::INFO,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Config::default();

        if let Some(v) = lookup("GRADEBOOKD_BACKEND") {
            cfg.backend = v.parse().context("GRADEBOOKD_BACKEND")?;
        }
        cfg.workspace = lookup("GRADEBOOKD_WORKSPACE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        if let Some(v) = lookup("GRADEBOOKD_LATENCY_MS") {
            cfg.latency = Duration::from_millis(parse_num(&v).context("GRADEBOOKD_LATENCY_MS")?);
        }
        if let Some(v) = lookup("GRADEBOOKD_SEED") {
            cfg.seed = parse_bool(&v).context("GRADEBOOKD_SEED")?;
        }
        if let Some(v) = lookup("GRADEBOOKD_INVALIDATION") {
            cfg.invalidation = parse_invalidation(&v).context("GRADEBOOKD_INVALIDATION")?;
        }
        if let Some(v) = lookup("GRADEBOOKD_RETRY_ATTEMPTS") {
            let n: u64 = parse_num(&v).context("GRADEBOOKD_RETRY_ATTEMPTS")?;
            if n == 0 {
                bail!("GRADEBOOKD_RETRY_ATTEMPTS must be at least 1");
            }
            cfg.retry.max_attempts = u32::try_from(n).context("GRADEBOOKD_RETRY_ATTEMPTS")?;
        }
        if let Some(v) = lookup("GRADEBOOKD_RETRY_BACKOFF_MS") {
            cfg.retry.initial_backoff =
                Duration::from_millis(parse_num(&v).context("GRADEBOOKD_RETRY_BACKOFF_MS")?);
        }
        if let Some(v) = lookup("GRADEBOOKD_LOG") {
            cfg.log_level = v
                .trim()
                .parse::<LevelFilter>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .context("GRADEBOOKD_LOG")?;
        }

        if cfg.backend == Backend::Sqlite && cfg.workspace.is_none() {
            bail!("GRADEBOOKD_BACKEND=sqlite requires GRADEBOOKD_WORKSPACE");
        }
        Ok(cfg)
    }
}

fn parse_num(v: &str) -> Result<u64> {
    v.trim()
        .parse::<u64>()
        .with_context(|| format!("not a non-negative integer: {v:?}"))
}

fn parse_bool(v: &str) -> Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other:?}"),
    }
}

fn parse_invalidation(v: &str) -> Result<InvalidationPolicy> {
    match v.trim().to_ascii_lowercase().as_str() {
        "clear" => Ok(InvalidationPolicy::ClearOnMutate),
        "patch" => Ok(InvalidationPolicy::PatchInPlace),
        other => bail!("unknown invalidation policy {other:?} (expected clear or patch)"),
    }
}
