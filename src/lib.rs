//! Stagehand - Component lifecycle state machine
//!
//! This crate re-exports all layers of the Stagehand system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: stagehand_storage    — Entity allocation, component ownership
//! Layer 1: stagehand_lifecycle  — Lifecycle manager, stage checks, event bus
//! Layer 0: stagehand_foundation — Core types (LifeStage, EntityId, Tick, Error)
//! ```

pub use stagehand_foundation as foundation;
pub use stagehand_lifecycle as lifecycle;
pub use stagehand_storage as storage;
