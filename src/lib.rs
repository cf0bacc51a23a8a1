//! A library for building discrete-time outbreak simulations
//!
//! The core of a simulation is the [`crate::outbreak::Outbreak`] engine, which drives
//! a modeled population through a strict sequence of discrete periods. Each
//! period the engine advances time, lets the society apply its
//! outbreak-management policy, runs one contact/attack round over the
//! population, and hands the resulting snapshot to a recorder.
//!
//! In practice a simulation consists of the engine plus a set of collaborators
//! that supply all of the model-specific behavior:
//! * A [`population::Population`] that owns the people, the contact structure,
//!   and every source of randomness in the run.
//! * A [`society::Society`] that applies testing, isolation and other
//!   interventions each period.
//! * One or more [`disease::Strain`] parameter sets describing the variants in
//!   circulation.
//! * A [`recorder::OutbreakRecorder`] whose components each keep an
//!   append-only story of per-period metrics.
//!
//! The crate fixes the engine's temporal contract and the collaborator traits;
//! contact-network construction, testing-queue policy and rendering of results
//! all live outside it.
pub mod config;
pub mod disease;
pub mod error;
pub mod log;
pub mod outbreak;
pub mod population;
pub mod prelude;
pub mod recorder;
pub mod society;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::config::Config;
pub use crate::error::OutbreakError;
pub use crate::log::{debug, error, info, trace, warn};
