// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vh-perception: `PerceptionAdmission` (C4) — identity-relevance scoring
//! and the admission policy that gates externally-captured items into
//! `inbox/`, plus per-source noise tracking. Pure functions over
//! `vh-core`'s capture/context/policy types; no filesystem or process I/O.

pub mod admission;
pub mod noise;
pub mod tokenize;

pub use admission::{admit, identity_relevance_score, AdmissionOutcome, ScoredCapture};
pub use noise::check_noise_alert;
pub use tokenize::{overlap_ratio, tokenize};
