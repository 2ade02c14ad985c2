//! The connection manager.
//!
//! [`ConnectionManager`] ties the pipeline together: descriptor config →
//! parsed descriptors → credential overlay → optional rewriter → query
//! resolution. Every stage is computed at most once (also under concurrent
//! first use) and resolved query results are cached by query value, so
//! repeated lookups share one `Arc`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::{CredentialConfig, DescriptorConfig};
use crate::configured::CredentialSet;
use crate::descriptor::{ConnectorDescriptor, DescriptorQuery};
use crate::error::ConnectionError;

/// Hook rewriting the fully-overlaid descriptor set before resolution;
/// deployments use it to redirect hosts or inject tags.
pub type Rewriter =
    Box<dyn Fn(BTreeSet<ConnectorDescriptor>) -> BTreeSet<ConnectorDescriptor> + Send + Sync>;

type ResultSet = Arc<BTreeSet<ConnectorDescriptor>>;

/// Resolves connection descriptors from configuration, with memoized
/// initialization and a per-query result cache.
pub struct ConnectionManager {
    descriptor_config: DescriptorConfig,
    credential_config: CredentialConfig,
    default_query: DescriptorQuery,
    rewriter: Option<Rewriter>,
    raw: OnceCell<BTreeSet<ConnectorDescriptor>>,
    credentials: OnceCell<CredentialSet>,
    overlaid: OnceCell<BTreeSet<ConnectorDescriptor>>,
    cache: Mutex<HashMap<DescriptorQuery, ResultSet>>,
}

impl ConnectionManager {
    /// Creates a manager over explicit config sources.
    #[must_use]
    pub fn new(
        descriptor_config: DescriptorConfig,
        credential_config: CredentialConfig,
    ) -> ConnectionManager {
        ConnectionManager {
            descriptor_config,
            credential_config,
            default_query: DescriptorQuery::default(),
            rewriter: None,
            raw: OnceCell::new(),
            credentials: OnceCell::new(),
            overlaid: OnceCell::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a manager over the process environment and the default
    /// secret directory.
    #[must_use]
    pub fn from_env() -> ConnectionManager {
        ConnectionManager::new(DescriptorConfig::from_env(), CredentialConfig::from_env())
    }

    /// Sets a query ANDed into every [`ConnectionManager::resolve`] call
    /// (typically the active profile).
    #[must_use]
    pub fn with_default_query(mut self, query: DescriptorQuery) -> ConnectionManager {
        self.default_query = query;
        self
    }

    /// Installs a rewriter applied to the overlaid descriptor set.
    #[must_use]
    pub fn with_rewriter<F>(mut self, rewriter: F) -> ConnectionManager
    where
        F: Fn(BTreeSet<ConnectorDescriptor>) -> BTreeSet<ConnectorDescriptor>
            + Send
            + Sync
            + 'static,
    {
        self.rewriter = Some(Box::new(rewriter));
        self
    }

    /// The descriptors as parsed from configuration, before the credential
    /// overlay. Built at most once.
    ///
    /// # Errors
    ///
    /// Descriptor-config build failures.
    pub fn raw_descriptors(&self) -> Result<&BTreeSet<ConnectorDescriptor>, ConnectionError> {
        self.raw.get_or_try_init(|| self.descriptor_config.build())
    }

    /// The configured credential patterns. Built at most once.
    ///
    /// # Errors
    ///
    /// Credential-config build failures.
    pub fn credential_set(&self) -> Result<&CredentialSet, ConnectionError> {
        self.credentials
            .get_or_try_init(|| self.credential_config.build())
    }

    /// The effective descriptors: raw set with credentials overlaid and the
    /// rewriter applied. Built at most once.
    ///
    /// # Errors
    ///
    /// Failures from either config build.
    pub fn descriptors(&self) -> Result<&BTreeSet<ConnectorDescriptor>, ConnectionError> {
        self.overlaid.get_or_try_init(|| {
            let credentials = self.credential_set()?;
            let overlaid: BTreeSet<ConnectorDescriptor> = self
                .raw_descriptors()?
                .iter()
                .map(|descriptor| credentials.apply_to(descriptor))
                .collect();
            debug!(count = overlaid.len(), "initialized descriptor set");
            Ok(match &self.rewriter {
                Some(rewrite) => rewrite(overlaid),
                None => overlaid,
            })
        })
    }

    /// Descriptors satisfying both the default query and `query`. Results
    /// are cached by query value; repeated calls return the same `Arc`.
    ///
    /// # Errors
    ///
    /// Failures from either config build (first call only).
    pub fn resolve(&self, query: &DescriptorQuery) -> Result<ResultSet, ConnectionError> {
        let descriptors = self.descriptors()?;
        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(query) {
            return Ok(Arc::clone(hit));
        }
        let result: ResultSet = Arc::new(
            descriptors
                .iter()
                .filter(|d| d.matches(&self.default_query) && d.matches(query))
                .cloned()
                .collect(),
        );
        cache.insert(query.clone(), Arc::clone(&result));
        Ok(result)
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("descriptor_config", &self.descriptor_config)
            .field("credential_config", &self.credential_config)
            .field("default_query", &self.default_query)
            .field("rewriter", &self.rewriter.as_ref().map(|_| "<fn>"))
            .field("initialized", &self.overlaid.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::secrets::SecretFileSystem;
    use std::collections::BTreeMap;

    fn manager(entries: &[(&str, &str)]) -> ConnectionManager {
        let map: BTreeMap<String, String> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ConnectionManager::new(
            DescriptorConfig::new(map.clone()),
            CredentialConfig::new(map, SecretFileSystem::new("/nonexistent/secret/dir", "X")),
        )
    }

    fn platform_query(platform: Platform) -> DescriptorQuery {
        DescriptorQuery {
            platforms: [platform].into(),
            ..DescriptorQuery::default()
        }
    }

    #[test]
    fn test_resolve_filters_by_query() {
        let manager = manager(&[(
            "CONNECTIONS",
            "jdbc:postgres://pg-1/db|rabbit://rbt-1",
        )]);
        let result = manager.resolve(&platform_query(Platform::PostgreSql)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.iter().next().unwrap().platform, Platform::PostgreSql);
    }

    #[test]
    fn test_resolve_overlays_credentials() {
        let manager = manager(&[
            ("CONNECTIONS", "jdbc:postgres://pg-1/db"),
            ("CONNECTION_CREDENTIALS", "u:p@pg-*"),
        ]);
        let result = manager.resolve(&DescriptorQuery::default()).unwrap();
        assert_eq!(result.iter().next().unwrap().credentials.user, "u");
    }

    #[test]
    fn test_default_query_is_conjoined() {
        let manager = manager(&[(
            "CONNECTIONS",
            "jdbc:postgres://pg-1/db|rabbit://rbt-1",
        )])
        .with_default_query(platform_query(Platform::RabbitMq));
        assert!(manager
            .resolve(&platform_query(Platform::PostgreSql))
            .unwrap()
            .is_empty());
        assert_eq!(
            manager.resolve(&platform_query(Platform::RabbitMq)).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_cache_returns_same_arc() {
        let manager = manager(&[("CONNECTIONS", "rabbit://rbt-1")]);
        let query = platform_query(Platform::RabbitMq);
        let first = manager.resolve(&query).unwrap();
        let second = manager.resolve(&query).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let other = manager.resolve(&DescriptorQuery::default()).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_rewriter_applied_after_overlay() {
        let manager = manager(&[("CONNECTIONS", "rabbit://rbt-1")]).with_rewriter(|set| {
            set.into_iter()
                .map(|mut descriptor| {
                    descriptor.tags.insert("rewritten".to_string());
                    descriptor
                })
                .collect()
        });
        let result = manager.resolve(&DescriptorQuery::default()).unwrap();
        assert!(result.iter().next().unwrap().tags.contains("rewritten"));
    }

    #[test]
    fn test_malformed_config_surfaces_on_resolve() {
        let manager = manager(&[("CONNECTIONS", "gopher://nope")]);
        assert!(manager.resolve(&DescriptorQuery::default()).is_err());
    }

    #[test]
    fn test_debug_never_renders_configured_secrets() {
        let manager = manager(&[
            ("CONNECTIONS", "jdbc:postgres://pg-1/db"),
            ("CONNECTION_CREDENTIALS", "pguser:topsecret@pg-*"),
        ]);
        let rendered = format!("{manager:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("pguser"));
    }
}
