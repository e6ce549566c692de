use crate::error::{Error, Result};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, from the system wall clock.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// A requested or held lease on a named resource.
///
/// Immutable once constructed: renewal and takeover produce a new descriptor
/// via [`LeaseDescriptor::renewed`] rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseDescriptor {
    name: String,
    owner: String,
    acquired_at: u64,
    lease_for: Duration,
}

impl LeaseDescriptor {
    /// Describes a lease on `name` claimed by `owner`, starting now.
    ///
    /// Fails with [`Error::Validation`] if `name` or `owner` is blank or
    /// `lease_for_secs` is negative. A zero duration is accepted; such a
    /// lease is expired the moment it is written.
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        lease_for_secs: i64,
    ) -> Result<Self> {
        Self::with_timestamp(name, owner, epoch_millis(), lease_for_secs)
    }

    /// Same as [`LeaseDescriptor::new`] but with an explicit start time.
    pub fn with_timestamp(
        name: impl Into<String>,
        owner: impl Into<String>,
        acquired_at: u64,
        lease_for_secs: i64,
    ) -> Result<Self> {
        let name = name.into();
        let owner = owner.into();
        if name.trim().is_empty() {
            return Err(Error::Validation {
                name,
                reason: "lease name must not be blank".into(),
            });
        }
        if owner.trim().is_empty() {
            return Err(Error::Validation {
                name,
                reason: "lease owner must not be blank".into(),
            });
        }
        let Ok(secs) = u64::try_from(lease_for_secs) else {
            return Err(Error::Validation {
                name,
                reason: format!("lease duration is negative ({lease_for_secs}s)"),
            });
        };
        Ok(Self {
            name,
            owner,
            acquired_at,
            lease_for: Duration::from_secs(secs),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// When this descriptor's holder claims the lease started, in epoch ms.
    pub fn acquired_at(&self) -> u64 {
        self.acquired_at
    }

    pub fn lease_for(&self) -> Duration {
        self.lease_for
    }

    /// When the lease lapses: `acquired_at + lease_for`, in epoch ms.
    pub fn expires_at(&self) -> u64 {
        self.acquired_at
            .saturating_add(u64::try_from(self.lease_for.as_millis()).unwrap_or(u64::MAX))
    }

    /// Either `expires_at` or now, whichever is later. A conservative
    /// "safe after" bound for callers doing their own bookkeeping.
    pub fn effective_release_time(&self) -> u64 {
        self.expires_at().max(epoch_millis())
    }

    /// A fresh descriptor for the same resource and duration, restarted at
    /// `now` under `owner`. Used for renewal (same owner) and takeover
    /// (new owner after expiry).
    pub(crate) fn renewed(&self, owner: impl Into<String>, now: u64) -> Self {
        Self {
            name: self.name.clone(),
            owner: owner.into(),
            acquired_at: now,
            lease_for: self.lease_for,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_duration_is_rejected() {
        let err = LeaseDescriptor::new("job-x", "host-a", -1).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn zero_duration_is_accepted() {
        let lease = LeaseDescriptor::new("job-x", "host-a", 0).unwrap();
        assert_eq!(lease.expires_at(), lease.acquired_at());
    }

    #[test]
    fn blank_name_and_owner_are_rejected() {
        assert!(LeaseDescriptor::new("", "host-a", 10).is_err());
        assert!(LeaseDescriptor::new("  ", "host-a", 10).is_err());
        assert!(LeaseDescriptor::new("job-x", "", 10).is_err());
    }

    #[test]
    fn expiry_is_start_plus_duration() {
        let lease = LeaseDescriptor::with_timestamp("job-x", "host-a", 1_000, 10).unwrap();
        assert_eq!(lease.expires_at(), 11_000);
    }

    #[test]
    fn effective_release_time_never_precedes_now() {
        // Long-expired lease: the conservative bound is "now", not the past.
        let lease = LeaseDescriptor::with_timestamp("job-x", "host-a", 1_000, 10).unwrap();
        let before = epoch_millis();
        assert!(lease.effective_release_time() >= before);

        // Unexpired lease: the bound is the real expiry.
        let live = LeaseDescriptor::new("job-y", "host-a", 3_600).unwrap();
        assert_eq!(live.effective_release_time(), live.expires_at());
    }

    #[test]
    fn renewal_produces_a_new_descriptor() {
        let lease = LeaseDescriptor::with_timestamp("job-x", "host-a", 1_000, 10).unwrap();
        let renewed = lease.renewed("host-b", 5_000);
        assert_eq!(renewed.name(), "job-x");
        assert_eq!(renewed.owner(), "host-b");
        assert_eq!(renewed.acquired_at(), 5_000);
        assert_eq!(renewed.lease_for(), lease.lease_for());
        // original untouched
        assert_eq!(lease.owner(), "host-a");
        assert_eq!(lease.acquired_at(), 1_000);
    }
}
