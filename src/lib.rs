//! Store-arbitrated distributed leases.
//!
//! Multiple independent processes coordinate through a shared persistent
//! store so that a named critical section runs on at most one of them at a
//! time. A lease carries an expiry, so a crashed or hung holder never blocks
//! the resource forever: once the lease lapses, another process takes over.
//!
//! No consensus protocol is involved. [`LeaseManager`] approximates
//! compare-and-swap with an optimistic read / decide / write / confirming
//! re-read sequence against any backend implementing the small [`LockStore`]
//! port; correctness under contention rests on the backend's `create` being
//! atomic insert-if-absent. [`LeaseGuard`] is the caller-facing wrapper:
//! acquire, run the protected operation only if granted, always attempt
//! release afterward.
//!
//! ```
//! use distlock::{InMemoryLockStore, LeaseGuard};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> distlock::Result<()> {
//! let guard = LeaseGuard::new(Arc::new(InMemoryLockStore::new()), "host-a");
//! let ran = guard.run("nightly-report", "", 30, || async {
//!     // at most one process in here at a time
//! }).await?;
//! assert!(ran.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod error;
pub mod guard;
pub mod lease;
pub mod manager;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use guard::{resolve_owner, LeaseGuard};
pub use lease::LeaseDescriptor;
pub use manager::{AcquireOutcome, LeaseManager};
pub use record::StoredLeaseRecord;
pub use store::{InMemoryLockStore, LockStore};
