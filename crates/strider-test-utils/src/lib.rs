//! Shared test fixtures and utilities for strider crates.
//!
//! Provides deterministic terrain implementing
//! [`GroundQuery`](strider_core::ground::GroundQuery) and seeded RNG setup so
//! every test run walks the same ground.

pub mod rng;
pub mod terrain;

pub use rng::seeded_rng;
pub use terrain::Terrain;
