use crate::lease::{epoch_millis, LeaseDescriptor};
use crate::record::StoredLeaseRecord;
use crate::store::LockStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a [`LeaseManager::try_acquire`] attempt.
///
/// Callers must check `granted` to decide whether to proceed; `lease` is
/// returned on every path (the renewed descriptor after a store write,
/// otherwise the original) and is what a later `release` should be handed.
#[derive(Debug, Clone)]
pub struct AcquireOutcome {
    pub granted: bool,
    pub lease: LeaseDescriptor,
}

impl AcquireOutcome {
    fn granted(lease: LeaseDescriptor) -> Self {
        Self {
            granted: true,
            lease,
        }
    }

    fn denied(lease: LeaseDescriptor) -> Self {
        Self {
            granted: false,
            lease,
        }
    }
}

/// Decides lease grants against a shared [`LockStore`].
///
/// Holds no in-process lock and never blocks waiting for a contested lease:
/// `try_acquire` is a single-shot attempt, and exclusion is enforced entirely
/// by the store's read/write ordering. Threads of one process racing for the
/// same name are arbitrated exactly like separate processes.
///
/// `identity` is the process-wide resolved identity of the local host,
/// injected once at construction. It becomes the owner on takeover of an
/// expired lease, and it is what `release` matches against.
#[derive(Debug)]
pub struct LeaseManager {
    store: Arc<dyn LockStore>,
    identity: String,
}

impl LeaseManager {
    pub fn new(store: Arc<dyn LockStore>, identity: impl Into<String>) -> Self {
        Self {
            store,
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Attempt to acquire (or renew, or take over) the lease described by
    /// `lease`. Returns immediately; never waits for a contested lease.
    ///
    /// Store failures are logged and treated as "operation did not happen":
    /// the attempt degrades to not-granted rather than risking an uncertain
    /// grant.
    pub async fn try_acquire(&self, lease: &LeaseDescriptor) -> AcquireOutcome {
        let id = lease.name();

        let existing = match self.store.get(id).await {
            Ok(existing) => existing,
            Err(err) => {
                warn!(name = id, %err, "lock store read failed, denying lease");
                return AcquireOutcome::denied(lease.clone());
            }
        };

        let Some(existing) = existing else {
            // First claim on this name. Exclusivity under a concurrent race
            // rests on the store's create being insert-if-absent.
            debug!(name = id, owner = lease.owner(), "no existing lease, creating");
            return match self.store.create(StoredLeaseRecord::from(lease)).await {
                Ok(()) => AcquireOutcome::granted(lease.clone()),
                Err(err) => {
                    warn!(name = id, %err, "lease create failed, denying lease");
                    AcquireOutcome::denied(lease.clone())
                }
            };
        };

        let now = epoch_millis();
        let resolved_owner = if existing.is_held_by(lease.owner()) {
            // Renewal: same owner, just restart the clock. Keep the stored
            // spelling of the owner.
            debug!(name = id, owner = %existing.locked_by, "lease already held, renewing");
            existing.locked_by.clone()
        } else if existing.is_expired_at(now) {
            // Takeover: the previous holder let the lease lapse (crashed, or
            // its release failed), so ownership passes to this process.
            debug!(
                name = id,
                from = %existing.locked_by,
                to = %self.identity,
                "lease expired, taking over"
            );
            self.identity.clone()
        } else {
            debug!(name = id, holder = %existing.locked_by, "lease held by another owner");
            return AcquireOutcome::denied(lease.clone());
        };

        let renewed = lease.renewed(resolved_owner.clone(), now);
        let mut record = StoredLeaseRecord::from(&renewed);
        record.org_id = existing.org_id;

        if let Err(err) = self.store.update(record).await {
            warn!(name = id, %err, "lease update failed, denying lease");
            return AcquireOutcome::denied(lease.clone());
        }

        // Confirming re-read: a competitor may have overwritten the record
        // between the update and here. Grant only if our write stuck. The
        // renewed descriptor is returned either way.
        match self.store.get(id).await {
            Ok(Some(current)) if current.is_held_by(&resolved_owner) => {
                debug!(name = id, owner = %resolved_owner, "lease confirmed");
                AcquireOutcome::granted(renewed)
            }
            Ok(current) => {
                debug!(
                    name = id,
                    owner = %resolved_owner,
                    holder = current.map(|r| r.locked_by).as_deref().unwrap_or("<absent>"),
                    "lease overwritten before confirmation, denying"
                );
                AcquireOutcome::denied(renewed)
            }
            Err(err) => {
                warn!(name = id, %err, "confirming re-read failed, denying lease");
                AcquireOutcome::denied(renewed)
            }
        }
    }

    /// Best-effort release of `lease`.
    ///
    /// The record is deleted only when this manager's live identity matches
    /// the descriptor's owner (case-insensitive). On a mismatch the lease is
    /// left intact to expire naturally; note this compares against the LIVE
    /// identity, so a lease acquired under a custom owner label that differs
    /// from the local identity is never deleted here, only reclaimed through
    /// expiry-driven takeover. Store failures are logged and swallowed.
    pub async fn release(&self, lease: &LeaseDescriptor) {
        if !self.identity.eq_ignore_ascii_case(lease.owner()) {
            debug!(
                name = lease.name(),
                owner = lease.owner(),
                identity = %self.identity,
                "identity does not match lease owner, leaving lease to expire"
            );
            return;
        }
        match self.store.delete_by_id(lease.name()).await {
            Ok(()) => debug!(name = lease.name(), identity = %self.identity, "lease released"),
            Err(err) => {
                warn!(name = lease.name(), %err, "lease release failed, leaving lease to expire");
            }
        }
    }
}
