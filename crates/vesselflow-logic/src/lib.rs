//! Pure resource settlement logic for Vesselflow.
//!
//! This crate reconciles simultaneous resource production and consumption
//! requests against a finite, per-vessel supply. It knows nothing about the
//! ECS, persistence, or the host's clock: callers hand it a ledger, an elapsed
//! duration, and something implementing [`oracle::ResourceOracle`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`capability`] | One-shot startup probe selecting the resource backend |
//! | [`ledger`] | Signed rate requests collected for one settlement |
//! | [`oracle`] | Availability query/mutation contract, null backend |
//! | [`processor`] | Declarative converter definitions loaded from JSON |
//! | [`settlement`] | Two-pass throttled settlement engine |

pub mod capability;
pub mod ledger;
pub mod oracle;
pub mod processor;
pub mod settlement;
