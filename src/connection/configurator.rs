//! # Connection Details Configurator
//!
//! Gives a composite resource a default publish destination taken from its
//! composition, once, before anything is published for it.

use tracing::info;

use crate::connection::ConnectionError;
use crate::context::Context;
use crate::crd::{Composition, PublishConnectionDetailsTo};
use crate::observability::metrics;
use crate::resource::{Composite, CompositeUpdater};

/// Configures a composite resource using its composition
#[derive(Debug, Clone)]
pub struct ConnectionDetailsConfigurator<U> {
    updater: U,
}

impl<U> ConnectionDetailsConfigurator<U> {
    #[must_use]
    pub fn new(updater: U) -> Self {
        Self { updater }
    }

    /// Fill in the publish destination omitted from the composite resource by
    /// copying the composition's default store.
    ///
    /// The destination secret is named after the composite's UID. A composite
    /// that already has a destination, or a composition without a default
    /// store, is left untouched.
    ///
    /// # Errors
    /// Returns `CompositionMismatch` if the composition targets another
    /// composite type, and `UpdateComposite` if persisting the composite fails.
    /// On failure `cp` is left without a destination, so a retry persists again.
    pub async fn configure<C>(
        &self,
        ctx: &Context,
        cp: &mut C,
        comp: &Composition,
    ) -> Result<(), ConnectionError>
    where
        C: Composite,
        U: CompositeUpdater<C>,
    {
        if !comp.spec.applies_to(cp.api_version(), cp.kind()) {
            return Err(ConnectionError::CompositionMismatch {
                expected_api_version: comp.spec.composite_type_ref.api_version.clone(),
                expected_kind: comp.spec.composite_type_ref.kind.clone(),
                api_version: cp.api_version().to_string(),
                kind: cp.kind().to_string(),
            });
        }

        let Some(store) = comp.spec.publish_connection_details_with_store_config.as_deref() else {
            return Ok(());
        };
        if cp.publish_connection_details_to().is_some() {
            return Ok(());
        }

        ctx.ensure_active()?;
        let dest = PublishConnectionDetailsTo::new(cp.uid(), store);
        info!(
            "Defaulting publish destination of {} to secret '{}' in store config '{}'",
            cp.name(),
            dest.name,
            store
        );
        cp.set_publish_connection_details_to(Some(dest));

        let updated = match ctx.run(self.updater.update(ctx, cp)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ConnectionError::from_collaborator(
                e,
                ConnectionError::UpdateComposite,
            )),
            Err(e) => Err(e),
        };
        if let Err(e) = updated {
            // Only a persisted destination stays on the composite.
            cp.set_publish_connection_details_to(None);
            return Err(e);
        }
        metrics::increment_destinations_configured();
        Ok(())
    }
}
