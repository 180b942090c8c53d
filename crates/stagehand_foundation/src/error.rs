//! Error types for the Stagehand runtime.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::component_type::ComponentTypeId;
use crate::entity::EntityId;
use crate::stage::{LifeStage, LifecycleOp};

/// The main error type for Stagehand operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Appends a note to this error's context, creating one if needed.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_note(note));
        self
    }

    /// Creates an invalid lifecycle transition error.
    #[must_use]
    pub fn invalid_transition(
        op: LifecycleOp,
        stage: LifeStage,
        required: StageRequirement,
        entity: EntityId,
    ) -> Self {
        Self::new(ErrorKind::InvalidTransition {
            op,
            stage,
            required,
            entity,
        })
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::EntityNotFound(id))
    }

    /// Creates a stale entity reference error.
    #[must_use]
    pub fn stale_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::StaleEntity(id))
    }

    /// Creates a component not found error.
    #[must_use]
    pub fn component_not_found(entity: EntityId, component: ComponentTypeId) -> Self {
        Self::new(ErrorKind::ComponentNotFound { entity, component })
    }

    /// Creates a duplicate component error.
    #[must_use]
    pub fn duplicate_component(entity: EntityId, component: ComponentTypeId) -> Self {
        Self::new(ErrorKind::DuplicateComponent { entity, component })
    }

    /// Creates a listener failure error.
    #[must_use]
    pub fn listener(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Listener(message.into()))
    }

    /// Returns true if this error is a rejected lifecycle transition.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidTransition { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A lifecycle entry point was invoked from the wrong stage.
    ///
    /// This is a caller bug, never a recoverable runtime condition.
    #[error("invalid lifecycle transition: {op} on {entity} requires {required}, found {stage}")]
    InvalidTransition {
        /// The entry point that was invoked.
        op: LifecycleOp,
        /// The stage the component was actually in.
        stage: LifeStage,
        /// The stage(s) the entry point accepts.
        required: StageRequirement,
        /// The entity owning the component.
        entity: EntityId,
    },

    /// Entity was not found in storage.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// Entity reference is stale (generation mismatch).
    #[error("stale entity reference: {0:?}")]
    StaleEntity(EntityId),

    /// Component not found on entity.
    #[error("component not found: {component} on entity {entity:?}")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: EntityId,
        /// The component type that was not found.
        component: ComponentTypeId,
    },

    /// Entity already has a component of this type.
    #[error("duplicate component: {component} already on entity {entity:?}")]
    DuplicateComponent {
        /// The entity the component was added to.
        entity: EntityId,
        /// The component type that is already present.
        component: ComponentTypeId,
    },

    /// Component type name was never registered.
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),

    /// Component type name registered twice.
    #[error("component type already registered: {0}")]
    DuplicateComponentType(String),

    /// A lifecycle listener reported a failure.
    #[error("listener failed: {0}")]
    Listener(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// The stage(s) a lifecycle entry point accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageRequirement {
    /// Exactly this stage.
    Exactly(LifeStage),
    /// Any stage in the half-open range `from..until`.
    Range {
        /// Inclusive lower bound.
        from: LifeStage,
        /// Exclusive upper bound.
        until: LifeStage,
    },
    /// A stage in `from..until` that is not mid-event.
    ///
    /// Rejects re-entry from a listener of the event in flight.
    Settled {
        /// Inclusive lower bound.
        from: LifeStage,
        /// Exclusive upper bound.
        until: LifeStage,
    },
    /// Attached and not yet removed: `Adding..Removing`.
    Attached,
}

impl StageRequirement {
    /// Returns true if `stage` satisfies this requirement.
    #[must_use]
    pub fn is_satisfied_by(self, stage: LifeStage) -> bool {
        match self {
            Self::Exactly(required) => stage == required,
            Self::Range { from, until } => stage >= from && stage < until,
            Self::Settled { from, until } => {
                stage >= from && stage < until && !stage.is_transitional()
            }
            Self::Attached => stage >= LifeStage::Adding && stage < LifeStage::Removing,
        }
    }
}

impl fmt::Display for StageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(stage) => write!(f, "stage {stage}"),
            Self::Range { from, until } => write!(f, "a stage in [{from}, {until})"),
            Self::Settled { from, until } => {
                write!(f, "a settled stage in [{from}, {until})")
            }
            Self::Attached => write!(f, "an attached, unremoved stage"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The component type involved, if known.
    pub component: Option<ComponentTypeId>,
    /// Free-form notes, outermost last.
    pub notes: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the component type involved.
    #[must_use]
    pub fn with_component(mut self, component: ComponentTypeId) -> Self {
        self.component = Some(component);
        self
    }

    /// Adds a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(component) = self.component {
            write!(f, "for component {component}")?;
        }
        for note in &self.notes {
            write!(f, "\n  {note}")?;
        }
        Ok(())
    }
}
