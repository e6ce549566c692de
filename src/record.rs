use crate::lease::LeaseDescriptor;
use serde::{Deserialize, Serialize};

/// The persisted representation of a lease, one entry per name.
///
/// Field names match the store encoding: `id`, `org_id`, `locked_by`,
/// `locked_at`, `locked_till` (epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLeaseRecord {
    pub id: String,
    /// Tenant/namespace tag. Opaque to the protocol; carried through
    /// renewals and takeovers untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    pub locked_by: String,
    pub locked_at: u64,
    pub locked_till: u64,
}

impl StoredLeaseRecord {
    /// True if the caller holds this record, comparing owners
    /// case-insensitively.
    pub fn is_held_by(&self, owner: &str) -> bool {
        self.locked_by.eq_ignore_ascii_case(owner)
    }

    /// True if the lease had lapsed at `now` (epoch ms) and is up for
    /// takeover.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.locked_till < now
    }
}

impl From<&LeaseDescriptor> for StoredLeaseRecord {
    fn from(lease: &LeaseDescriptor) -> Self {
        Self {
            id: lease.name().to_string(),
            org_id: None,
            locked_by: lease.owner().to_string(),
            locked_at: lease.acquired_at(),
            locked_till: lease.effective_release_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_mirrors_descriptor() {
        let lease = LeaseDescriptor::new("job-x", "host-a", 10).unwrap();
        let record = StoredLeaseRecord::from(&lease);
        assert_eq!(record.id, "job-x");
        assert_eq!(record.locked_by, "host-a");
        assert_eq!(record.locked_at, lease.acquired_at());
        assert_eq!(record.locked_till, record.locked_at + 10_000);
        assert_eq!(record.org_id, None);
    }

    #[test]
    fn ownership_check_ignores_case() {
        let lease = LeaseDescriptor::new("job-x", "Host-A", 10).unwrap();
        let record = StoredLeaseRecord::from(&lease);
        assert!(record.is_held_by("host-a"));
        assert!(record.is_held_by("HOST-A"));
        assert!(!record.is_held_by("host-b"));
    }

    #[test]
    fn expiry_is_a_strict_comparison() {
        let record = StoredLeaseRecord {
            id: "job-x".into(),
            org_id: None,
            locked_by: "host-a".into(),
            locked_at: 1_000,
            locked_till: 11_000,
        };
        assert!(!record.is_expired_at(11_000));
        assert!(record.is_expired_at(11_001));
    }

    #[test]
    fn wire_encoding_uses_store_field_names() {
        let record = StoredLeaseRecord {
            id: "job-x".into(),
            org_id: Some("acme".into()),
            locked_by: "host-a".into(),
            locked_at: 1_000,
            locked_till: 11_000,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "job-x",
                "org_id": "acme",
                "locked_by": "host-a",
                "locked_at": 1_000,
                "locked_till": 11_000,
            })
        );

        // org_id is optional on the wire
        let parsed: StoredLeaseRecord = serde_json::from_str(
            r#"{"id":"job-x","locked_by":"host-a","locked_at":1000,"locked_till":11000}"#,
        )
        .unwrap();
        assert_eq!(parsed.org_id, None);
    }
}
