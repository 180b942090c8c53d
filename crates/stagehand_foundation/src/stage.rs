//! Lifecycle stages and the operations that move between them.
//!
//! A component walks a strictly ordered, linear sequence of stages:
//!
//! ```text
//! PreAdd → Adding → Added → Initializing → Initialized → Starting → Running
//!        → Stopping → Stopped → Removing → Deleted
//! ```
//!
//! The `-ing` stages are only visible while the matching event is being
//! published. `Removing` and `Deleted` may be reached from any stage at or
//! after `Adding`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The stage a component currently occupies in its lifecycle.
///
/// Variants are declared in lifecycle order, so the derived `Ord` is the
/// lifecycle order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LifeStage {
    /// Constructed by storage, not yet attached.
    #[default]
    PreAdd,
    /// The add event is being published.
    Adding,
    /// Attached to its entity.
    Added,
    /// The initialize event is being published.
    Initializing,
    /// Initialized; cross-component references are wired.
    Initialized,
    /// The startup event is being published.
    Starting,
    /// Fully started. Game logic may run.
    Running,
    /// The shutdown event is being published.
    Stopping,
    /// Shut down (or never started).
    Stopped,
    /// The remove event is being published.
    Removing,
    /// Terminal. Storage discards the record.
    Deleted,
}

impl LifeStage {
    /// Every stage, in lifecycle order.
    pub const ALL: [LifeStage; 11] = [
        LifeStage::PreAdd,
        LifeStage::Adding,
        LifeStage::Added,
        LifeStage::Initializing,
        LifeStage::Initialized,
        LifeStage::Starting,
        LifeStage::Running,
        LifeStage::Stopping,
        LifeStage::Stopped,
        LifeStage::Removing,
        LifeStage::Deleted,
    ];

    /// Returns the lowercase name of this stage.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PreAdd => "pre-add",
            Self::Adding => "adding",
            Self::Added => "added",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Removing => "removing",
            Self::Deleted => "deleted",
        }
    }

    /// Returns true while an event for this component is being published.
    #[must_use]
    pub const fn is_transitional(self) -> bool {
        matches!(
            self,
            Self::Adding | Self::Initializing | Self::Starting | Self::Stopping | Self::Removing
        )
    }

    /// Returns true once the component is attached to an entity.
    #[must_use]
    pub fn is_attached(self) -> bool {
        self >= Self::Adding
    }

    /// Returns true if the component completed startup.
    ///
    /// Stays true through shutdown and removal of a component that ran.
    /// Note that a removed component may have skipped startup entirely;
    /// use [`LifeStage::is_running`] to decide whether game logic applies.
    #[must_use]
    pub fn has_started(self) -> bool {
        self >= Self::Running
    }

    /// Returns true if the component is running game logic.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true once removal has begun. No further access is allowed.
    #[must_use]
    pub fn is_removing_or_deleted(self) -> bool {
        self >= Self::Removing
    }

    /// Returns true for the terminal stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the five lifecycle entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LifecycleOp {
    /// `PreAdd → Adding → Added`
    AddToEntity,
    /// `Added → Initializing → Initialized`
    Initialize,
    /// `Initialized → Starting → Running`
    Startup,
    /// `[Initializing, Stopping) → (Stopping →) Stopped`
    Shutdown,
    /// `any attached stage → Removing → Deleted`
    RemoveFromEntity,
}

impl LifecycleOp {
    /// All operations in the order a full lifecycle invokes them.
    pub const ALL: [LifecycleOp; 5] = [
        LifecycleOp::AddToEntity,
        LifecycleOp::Initialize,
        LifecycleOp::Startup,
        LifecycleOp::Shutdown,
        LifecycleOp::RemoveFromEntity,
    ];

    /// Returns the name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddToEntity => "add-to-entity",
            Self::Initialize => "initialize",
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::RemoveFromEntity => "remove-from-entity",
        }
    }

    /// Returns the transitional stage held while this operation publishes.
    #[must_use]
    pub const fn in_flight_stage(self) -> LifeStage {
        match self {
            Self::AddToEntity => LifeStage::Adding,
            Self::Initialize => LifeStage::Initializing,
            Self::Startup => LifeStage::Starting,
            Self::Shutdown => LifeStage::Stopping,
            Self::RemoveFromEntity => LifeStage::Removing,
        }
    }

    /// Returns the stage this operation settles on.
    #[must_use]
    pub const fn settled_stage(self) -> LifeStage {
        match self {
            Self::AddToEntity => LifeStage::Added,
            Self::Initialize => LifeStage::Initialized,
            Self::Startup => LifeStage::Running,
            Self::Shutdown => LifeStage::Stopped,
            Self::RemoveFromEntity => LifeStage::Deleted,
        }
    }
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
