//! Entity allocation and component ownership for Stagehand.
//!
//! This crate provides:
//! - [`EntityStore`] - Generational entity allocation
//! - [`ComponentRegistry`] - Component type names to [`ComponentTypeId`]s
//! - [`EntityManager`] - Owns component records and drives their lifecycle
//!
//! [`ComponentTypeId`]: stagehand_foundation::ComponentTypeId

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod manager;
pub mod registry;

pub use entity::EntityStore;
pub use manager::{EntityManager, EntityStage};
pub use registry::ComponentRegistry;
