use crate::error::Result;
use crate::lease::LeaseDescriptor;
use crate::manager::LeaseManager;
use crate::store::LockStore;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Resolve the effective owner for a lease request.
///
/// A blank `owner_override` means "use the local identity". Otherwise the
/// override names a process environment variable; if that variable is set
/// and non-blank its value is used, else the override string itself is the
/// owner.
pub fn resolve_owner(owner_override: &str, local_identity: &str) -> String {
    if owner_override.trim().is_empty() {
        return local_identity.to_string();
    }
    match std::env::var(owner_override) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => owner_override.to_string(),
    }
}

/// Wraps a critical section with acquire / run / release.
///
/// The explicit counterpart of annotation-driven interception: callers hand
/// [`LeaseGuard::run`] the operation to protect, and it runs only when the
/// lease is granted. `local_identity` is resolved once by the embedding
/// process (hostname, pod name, ...) and injected here.
#[derive(Debug)]
pub struct LeaseGuard {
    manager: LeaseManager,
    local_identity: String,
}

impl LeaseGuard {
    pub fn new(store: Arc<dyn LockStore>, local_identity: impl Into<String>) -> Self {
        let local_identity = local_identity.into();
        Self {
            manager: LeaseManager::new(store, local_identity.clone()),
            local_identity,
        }
    }

    pub fn manager(&self) -> &LeaseManager {
        &self.manager
    }

    /// Run `operation` under the lease `name`, held for `lease_for_secs`.
    ///
    /// Returns `Ok(Some(value))` when the lease was granted and the
    /// operation ran, `Ok(None)` when the lease was denied (the operation is
    /// skipped entirely, never deferred). Release is always attempted after
    /// the operation, with whichever descriptor `try_acquire` returned; a
    /// panic unwinding out of `operation` skips it, leaving the lease to
    /// expire naturally.
    ///
    /// Fails only on descriptor validation (blank name, negative duration);
    /// store trouble surfaces as a denied lease, never as an error here.
    pub async fn run<F, Fut, T>(
        &self,
        name: &str,
        owner_override: &str,
        lease_for_secs: i64,
        operation: F,
    ) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let owner = resolve_owner(owner_override, &self.local_identity);
        let lease = LeaseDescriptor::new(name, owner, lease_for_secs)?;

        debug!(name, owner = lease.owner(), "trying to acquire lease");
        let outcome = self.manager.try_acquire(&lease).await;
        if !outcome.granted {
            debug!(name, "lease not granted, skipping protected operation");
            return Ok(None);
        }

        let value = operation().await;
        self.manager.release(&outcome.lease).await;
        Ok(Some(value))
    }
}
