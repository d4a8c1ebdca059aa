//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use dawa_auth::{AuthApi, AuthStore};
use dawa_cache::Cache;
use dawa_commerce::cart::CartStore;
use dawa_data::{ApiClient, OrdersApi, ReqwestTransport, RetryPolicy, TimeoutConfig};

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    pub config: CliConfig,
    /// File the config was read from, if any.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&Path>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(path.to_path_buf())),
            None => match find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory holding the cart and the session.
    pub fn data_dir(&self) -> PathBuf {
        match &self.config.storage.dir {
            Some(dir) => expand_home(dir),
            None => dirs_path().join("dawa"),
        }
    }

    pub fn cache(&self) -> Result<Cache> {
        let dir = self.data_dir();
        Cache::open_dir(&dir).with_context(|| format!("Failed to open storage in {}", dir.display()))
    }

    pub fn cart_store(&self) -> Result<CartStore> {
        Ok(CartStore::load(self.cache()?))
    }

    pub fn auth_store(&self) -> Result<Arc<AuthStore>> {
        Ok(Arc::new(AuthStore::load(self.cache()?)))
    }

    /// API client carrying the persisted session's tokens.
    pub fn api_client(&self, auth: Arc<AuthStore>) -> Result<ApiClient> {
        let api = &self.config.api;
        let transport = ReqwestTransport::new(TimeoutConfig::from_millis(api.timeout_ms))
            .context("Failed to build HTTP client")?;
        let client = ApiClient::new(&api.base_url, Arc::new(transport))
            .with_context(|| format!("Invalid API base URL: {}", api.base_url))?
            .with_tokens(auth)
            .with_retry(RetryPolicy::new(api.max_retries));
        Ok(client)
    }

    pub fn auth_api(&self) -> Result<AuthApi> {
        let store = self.auth_store()?;
        Ok(AuthApi::new(self.api_client(store.clone())?, store))
    }

    pub fn orders_api(&self, auth: Arc<AuthStore>) -> Result<OrdersApi> {
        Ok(OrdersApi::new(self.api_client(auth)?))
    }

    pub fn order_timeout(&self) -> Option<Duration> {
        self.config.checkout.order_timeout_ms.map(Duration::from_millis)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find config file in directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_FILE_NAMES {
            let path = current.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => home_dir().map(|h| h.join(rest)).unwrap_or_else(|| PathBuf::from(dir)),
        None => PathBuf::from(dir),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".local").join("share"),
        None => std::env::temp_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("dawa.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(root.path().join("dawa.toml")));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("shop");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("dawa.toml"), "").unwrap();
        std::fs::write(nested.join("dawa.json"), "{}").unwrap();

        assert_eq!(find_config(&nested), Some(nested.join("dawa.json")));
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/var/lib/dawa"), PathBuf::from("/var/lib/dawa"));
    }
}
