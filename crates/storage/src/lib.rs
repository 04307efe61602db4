// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vh-storage: filesystem I/O, path conventions, and advisory locking for
//! the vault heartbeat.
//!
//! Everything that touches a file lives here: [`vault::Vault`] (C1) for raw
//! I/O and lock conventions, [`queue::QueueManager`] (C2) for the durable
//! task queue, [`commitments::CommitmentStore`] (C3) for the commitment
//! store, and [`frontmatter`] for lenient YAML-frontmatter parsing.

pub mod commitments;
pub mod error;
pub mod frontmatter;
pub mod perception;
pub mod queue;
pub mod vault;

pub use commitments::CommitmentStore;
pub use error::{CommitmentStoreError, PerceptionStoreError, QueueError, VaultStoreError};
pub use perception::PerceptionStore;
pub use queue::{PopOptions, QueueManager};
pub use vault::Vault;
