//! # Connection Publishers
//!
//! Fan-out publishing across several publishers, and the secret store backed
//! publisher that writes an allow-listed subset of the details.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ControllerConfig;
use crate::connection::{ConnectionDetails, ConnectionError, ConnectionPublisher, PublishError};
use crate::context::Context;
use crate::observability::metrics;
use crate::resource::ConnectionSecretOwner;
use crate::store::SecretStore;

/// Chains multiple publishers. Stops at the first error; publishers that
/// already ran are not rolled back.
#[derive(Clone, Default)]
pub struct ConnectionPublisherChain {
    publishers: Vec<Arc<dyn ConnectionPublisher>>,
}

impl std::fmt::Debug for ConnectionPublisherChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPublisherChain")
            .field("publishers", &self.publishers.len())
            .finish()
    }
}

impl ConnectionPublisherChain {
    #[must_use]
    pub fn new(publishers: Vec<Arc<dyn ConnectionPublisher>>) -> Self {
        Self { publishers }
    }

    #[must_use]
    pub fn with(mut self, publisher: Arc<dyn ConnectionPublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }
}

#[async_trait]
impl ConnectionPublisher for ConnectionPublisherChain {
    async fn publish_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
        details: &ConnectionDetails,
    ) -> Result<bool, PublishError> {
        let mut published = false;
        for publisher in &self.publishers {
            if let Err(source) = ctx.ensure_active() {
                return Err(PublishError { published, source });
            }

            match publisher.publish_connection(ctx, owner, details).await {
                Ok(p) => published |= p,
                Err(e) => {
                    return Err(PublishError {
                        published: published || e.published,
                        source: e.source,
                    });
                }
            }
        }
        Ok(published)
    }
}

/// Publishes connection details to the secret store named by the owner's
/// publish destination
#[derive(Clone)]
pub struct SecretStoreConnectionPublisher {
    store: Arc<dyn SecretStore>,
    filter: HashSet<String>,
}

impl std::fmt::Debug for SecretStoreConnectionPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStoreConnectionPublisher")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl SecretStoreConnectionPublisher {
    /// Publisher writing only the keys in `filter`; an empty filter allows
    /// every key.
    #[must_use]
    pub fn new<I, S>(store: Arc<dyn SecretStore>, filter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            filter: filter.into_iter().map(Into::into).collect(),
        }
    }

    /// Publisher using the configured connection details filter
    #[must_use]
    pub fn from_config(store: Arc<dyn SecretStore>, config: &ControllerConfig) -> Self {
        Self::new(store, config.connection_details_filter.iter().cloned())
    }

    fn allows(&self, key: &str) -> bool {
        self.filter.is_empty() || self.filter.contains(key)
    }
}

#[async_trait]
impl ConnectionPublisher for SecretStoreConnectionPublisher {
    async fn publish_connection(
        &self,
        ctx: &Context,
        owner: &dyn ConnectionSecretOwner,
        details: &ConnectionDetails,
    ) -> Result<bool, PublishError> {
        // This resource does not want to expose a connection secret.
        let Some(dest) = owner.publish_connection_details_to() else {
            debug!(
                "{} has no publish destination, skipping store publish",
                owner.name()
            );
            return Ok(false);
        };

        let data: ConnectionDetails = details
            .iter()
            .filter(|(key, _)| self.allows(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        // TODO: set the owner reference on the secret and refuse to publish to
        // a secret controlled by another resource once unpublish exists.
        let written = ctx
            .run(self.store.write_connection(ctx, owner, &data))
            .await?
            .map_err(|e| ConnectionError::from_collaborator(e, ConnectionError::Publish));
        if let Err(e) = written {
            if !e.is_cancelled() {
                metrics::increment_publish_errors();
            }
            return Err(e.into());
        }

        info!(
            "Published {} connection detail(s) of {} to secret '{}'",
            data.len(),
            owner.name(),
            dest.name
        );
        metrics::increment_connection_details_published(data.len());

        // Whether the store content actually changed is not tracked.
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::PublishConnectionDetailsTo;
    use crate::resource::Unstructured;
    use crate::store::InMemorySecretStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn details(pairs: &[(&str, &str)]) -> ConnectionDetails {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.as_bytes().to_vec()))
            .collect()
    }

    fn owner_with_destination() -> Unstructured {
        let mut xr = Unstructured::new("database.example.org/v1alpha1", "XPostgreSQLInstance", "db");
        xr.set_publish_connection_details_to(Some(PublishConnectionDetailsTo::new(
            "db-conn", "default",
        )));
        xr
    }

    enum Outcome {
        Published(bool),
        Fail,
        /// Publishes, then cancels the caller's context
        PublishAndCancel,
    }

    struct StaticPublisher {
        outcome: Outcome,
        calls: AtomicU32,
    }

    impl StaticPublisher {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ConnectionPublisher for StaticPublisher {
        async fn publish_connection(
            &self,
            ctx: &Context,
            _owner: &dyn ConnectionSecretOwner,
            _details: &ConnectionDetails,
        ) -> Result<bool, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Published(p) => Ok(p),
                Outcome::Fail => Err(ConnectionError::Publish(anyhow::anyhow!("denied")).into()),
                Outcome::PublishAndCancel => {
                    ctx.cancel();
                    Ok(true)
                }
            }
        }
    }

    mod chain_tests {
        use super::*;

        #[tokio::test]
        async fn test_any_publish_counts() {
            let chain = ConnectionPublisherChain::default()
                .with(StaticPublisher::new(Outcome::Published(false)))
                .with(StaticPublisher::new(Outcome::Published(true)))
                .with(StaticPublisher::new(Outcome::Published(false)));

            let published = chain
                .publish_connection(&Context::new(), &owner_with_destination(), &details(&[]))
                .await
                .expect("no error");
            assert!(published);
        }

        #[tokio::test]
        async fn test_no_publishers_is_noop() {
            let published = ConnectionPublisherChain::default()
                .publish_connection(&Context::new(), &owner_with_destination(), &details(&[]))
                .await
                .expect("no error");
            assert!(!published);
        }

        #[tokio::test]
        async fn test_error_stops_chain_and_keeps_published() {
            let last = StaticPublisher::new(Outcome::Published(true));
            let publishers: Vec<Arc<dyn ConnectionPublisher>> = vec![
                StaticPublisher::new(Outcome::Published(true)),
                StaticPublisher::new(Outcome::Fail),
                Arc::clone(&last) as Arc<dyn ConnectionPublisher>,
            ];
            let chain = ConnectionPublisherChain::new(publishers);

            let err = chain
                .publish_connection(&Context::new(), &owner_with_destination(), &details(&[]))
                .await
                .expect_err("second publisher fails");

            assert!(err.published);
            assert!(matches!(err.source, ConnectionError::Publish(_)));
            assert_eq!(last.calls.load(Ordering::SeqCst), 0);
        }

        #[tokio::test]
        async fn test_cancellation_stops_chain() {
            let last = StaticPublisher::new(Outcome::Published(true));
            let publishers: Vec<Arc<dyn ConnectionPublisher>> = vec![
                StaticPublisher::new(Outcome::PublishAndCancel),
                Arc::clone(&last) as Arc<dyn ConnectionPublisher>,
            ];
            let chain = ConnectionPublisherChain::new(publishers);

            let err = chain
                .publish_connection(&Context::new(), &owner_with_destination(), &details(&[]))
                .await
                .expect_err("cancelled mid-chain");

            assert!(err.source.is_cancelled());
            assert!(err.published);
            assert_eq!(last.calls.load(Ordering::SeqCst), 0);
        }

        #[tokio::test]
        async fn test_cancelled_context_publishes_nothing() {
            let only = StaticPublisher::new(Outcome::Published(true));
            let chain = ConnectionPublisherChain::new(vec![
                Arc::clone(&only) as Arc<dyn ConnectionPublisher>
            ]);
            let ctx = Context::new();
            ctx.cancel();

            let err = chain
                .publish_connection(&ctx, &owner_with_destination(), &details(&[]))
                .await
                .expect_err("cancelled");

            assert!(err.source.is_cancelled());
            assert!(!err.published);
            assert_eq!(only.calls.load(Ordering::SeqCst), 0);
        }

        #[tokio::test]
        async fn test_first_error_reports_not_published() {
            let chain = ConnectionPublisherChain::default()
                .with(StaticPublisher::new(Outcome::Fail))
                .with(StaticPublisher::new(Outcome::Published(true)));

            let err = chain
                .publish_connection(&Context::new(), &owner_with_destination(), &details(&[]))
                .await
                .expect_err("first publisher fails");
            assert!(!err.published);
        }
    }

    mod secret_store_tests {
        use super::*;

        #[tokio::test]
        async fn test_filter_restricts_keys() {
            let store = Arc::new(InMemorySecretStore::new());
            let publisher = SecretStoreConnectionPublisher::new(Arc::clone(&store) as _, ["host", "port"]);
            let owner = owner_with_destination();

            let published = publisher
                .publish_connection(
                    &Context::new(),
                    &owner,
                    &details(&[("host", "h"), ("port", "5432"), ("password", "p")]),
                )
                .await
                .expect("no error");

            assert!(published);
            let stored = store
                .read_connection(&Context::new(), &owner)
                .await
                .expect("read");
            assert_eq!(stored, Some(details(&[("host", "h"), ("port", "5432")])));
        }

        #[tokio::test]
        async fn test_empty_filter_allows_all() {
            let store = Arc::new(InMemorySecretStore::new());
            let publisher =
                SecretStoreConnectionPublisher::new(Arc::clone(&store) as _, Vec::<String>::new());
            let owner = owner_with_destination();
            let all = details(&[("host", "h"), ("port", "5432"), ("password", "p")]);

            publisher
                .publish_connection(&Context::new(), &owner, &all)
                .await
                .expect("no error");

            let stored = store
                .read_connection(&Context::new(), &owner)
                .await
                .expect("read");
            assert_eq!(stored, Some(all));
        }

        #[tokio::test]
        async fn test_no_destination_is_noop() {
            let store = Arc::new(InMemorySecretStore::new());
            let publisher =
                SecretStoreConnectionPublisher::new(Arc::clone(&store) as _, Vec::<String>::new());
            let owner = Unstructured::new("example.org/v1", "XBucket", "bucket");

            let published = publisher
                .publish_connection(&Context::new(), &owner, &details(&[("a", "1")]))
                .await
                .expect("no error");

            assert!(!published);
            assert_eq!(store.len().await, 0);
        }

        #[tokio::test]
        async fn test_publish_is_additive() {
            let store = Arc::new(InMemorySecretStore::new());
            let publisher =
                SecretStoreConnectionPublisher::new(Arc::clone(&store) as _, Vec::<String>::new());
            let owner = owner_with_destination();
            let ctx = Context::new();

            publisher
                .publish_connection(&ctx, &owner, &details(&[("a", "1"), ("b", "2")]))
                .await
                .expect("first publish");
            publisher
                .publish_connection(&ctx, &owner, &details(&[("b", "3"), ("c", "4")]))
                .await
                .expect("second publish");

            let stored = store.read_connection(&ctx, &owner).await.expect("read");
            assert_eq!(stored, Some(details(&[("a", "1"), ("b", "3"), ("c", "4")])));
        }

        /// Serialises tests that observe `connection_publish_errors_total`
        static PUBLISH_ERRORS: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

        enum Write {
            Fail(&'static str),
            ObserveCancellation,
            Hang,
        }

        /// Store whose writes never succeed
        struct BrokenStore(Write);

        #[async_trait]
        impl SecretStore for BrokenStore {
            async fn read_connection(
                &self,
                _ctx: &Context,
                _owner: &dyn ConnectionSecretOwner,
            ) -> anyhow::Result<Option<ConnectionDetails>> {
                Ok(None)
            }

            async fn write_connection(
                &self,
                _ctx: &Context,
                _owner: &dyn ConnectionSecretOwner,
                _details: &ConnectionDetails,
            ) -> anyhow::Result<()> {
                match self.0 {
                    Write::Fail(msg) => Err(anyhow::anyhow!(msg)),
                    Write::ObserveCancellation => Err(ConnectionError::Cancelled.into()),
                    Write::Hang => {
                        std::future::pending::<()>().await;
                        Ok(())
                    }
                }
            }
        }

        #[tokio::test]
        async fn test_store_failure_is_wrapped() {
            let _guard = PUBLISH_ERRORS.lock().await;
            let before = metrics::publish_errors_total();
            let publisher = SecretStoreConnectionPublisher::new(
                Arc::new(BrokenStore(Write::Fail("secrets is forbidden"))),
                ["host"],
            );

            let err = publisher
                .publish_connection(
                    &Context::new(),
                    &owner_with_destination(),
                    &details(&[("host", "h")]),
                )
                .await
                .expect_err("write fails");

            assert!(!err.published);
            assert_eq!(
                err.to_string(),
                "cannot publish connection details: secrets is forbidden"
            );
            assert_eq!(metrics::publish_errors_total(), before + 1);
        }

        #[tokio::test]
        async fn test_cancelled_pending_write() {
            let _guard = PUBLISH_ERRORS.lock().await;
            let before = metrics::publish_errors_total();
            let publisher = SecretStoreConnectionPublisher::new(
                Arc::new(BrokenStore(Write::Hang)),
                Vec::<String>::new(),
            );
            let ctx = Context::new();
            let canceller = ctx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                canceller.cancel();
            });

            let err = publisher
                .publish_connection(&ctx, &owner_with_destination(), &details(&[("host", "h")]))
                .await
                .expect_err("cancelled");

            assert!(err.source.is_cancelled());
            assert!(!err.published);
            assert_eq!(metrics::publish_errors_total(), before);
        }

        #[tokio::test]
        async fn test_store_observed_cancellation_is_not_a_publish_error() {
            let _guard = PUBLISH_ERRORS.lock().await;
            let before = metrics::publish_errors_total();
            let publisher = SecretStoreConnectionPublisher::new(
                Arc::new(BrokenStore(Write::ObserveCancellation)),
                Vec::<String>::new(),
            );

            let err = publisher
                .publish_connection(
                    &Context::new(),
                    &owner_with_destination(),
                    &details(&[("host", "h")]),
                )
                .await
                .expect_err("cancelled");

            assert!(matches!(err.source, ConnectionError::Cancelled));
            assert_eq!(metrics::publish_errors_total(), before);
        }

        #[tokio::test]
        async fn test_filter_from_config() {
            let store = Arc::new(InMemorySecretStore::new());
            let config = ControllerConfig {
                connection_details_filter: vec!["endpoint".to_string()],
                ..ControllerConfig::default()
            };
            let publisher = SecretStoreConnectionPublisher::from_config(Arc::clone(&store) as _, &config);
            let owner = owner_with_destination();

            publisher
                .publish_connection(
                    &Context::new(),
                    &owner,
                    &details(&[("endpoint", "db.internal"), ("password", "p")]),
                )
                .await
                .expect("no error");

            let stored = store
                .read_connection(&Context::new(), &owner)
                .await
                .expect("read");
            assert_eq!(stored, Some(details(&[("endpoint", "db.internal")])));
        }
    }
}
