//! Component lifecycle state machine and event publishing for Stagehand.
//!
//! This crate provides:
//! - [`Component`] / [`ComponentRecord`] - Entity-owned data with a lifecycle stage
//! - [`LifecycleManager`] - The five lifecycle entry points
//! - [`checker`] - Stage preconditions for every entry point
//! - [`EventPublisher`] / [`EventContext`] - The publish contract listeners see
//! - [`EventBus`] - A single-threaded listener registry implementing the contract
//! - [`LifecycleConfig`] - Strictness and tracing settings
//!
//! # Lifecycle
//!
//! ```text
//! add_to_entity   PreAdd       → Adding       → Added
//! initialize      Added        → Initializing → Initialized
//! startup         Initialized  → Starting     → Running
//! shutdown        [Initializing, Stopping)    → (Stopping →) Stopped
//! remove_from_entity  attached → Removing     → Deleted
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bus;
pub mod checker;
pub mod component;
pub mod config;
pub mod event;
pub mod manager;

pub use bus::{EventBus, Listener, SubscriptionId};
pub use component::{Component, ComponentLife, ComponentRecord};
pub use config::LifecycleConfig;
pub use event::{EventContext, EventPublisher, LifecycleEvent, NullPublisher};
pub use manager::LifecycleManager;
