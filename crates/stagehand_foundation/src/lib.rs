//! Core identifiers, lifecycle stages, ticks, and errors for Stagehand.
//!
//! This crate provides:
//! - [`LifeStage`] - The ordered stages a component passes through
//! - [`LifecycleOp`] - The five lifecycle entry points, as data
//! - [`EntityId`] - Generational entity identifiers
//! - [`ComponentTypeId`] - Registered component type identifiers
//! - [`Tick`] - Logical change-tracking timestamps
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component_type;
pub mod entity;
pub mod error;
pub mod stage;
pub mod tick;

pub use component_type::ComponentTypeId;
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind, StageRequirement};
pub use stage::{LifeStage, LifecycleOp};
pub use tick::Tick;

/// Result type alias using the Stagehand error type.
pub type Result<T> = std::result::Result<T, Error>;
