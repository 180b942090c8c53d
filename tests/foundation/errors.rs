//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use stagehand_foundation::{
    ComponentTypeId, EntityId, Error, ErrorContext, ErrorKind, LifeStage, LifecycleOp,
    StageRequirement,
};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_invalid_transition() {
    let err = Error::invalid_transition(
        LifecycleOp::Initialize,
        LifeStage::Running,
        StageRequirement::Exactly(LifeStage::Added),
        EntityId::new(2, 1),
    );
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidTransition {
            op: LifecycleOp::Initialize,
            stage: LifeStage::Running,
            ..
        }
    ));
    assert!(err.is_invalid_transition());
}

#[test]
fn error_entity_not_found() {
    let err = Error::entity_not_found(EntityId::new(42, 1));
    assert!(matches!(err.kind, ErrorKind::EntityNotFound(_)));
    assert!(err.to_string().contains("42"));
    assert!(!err.is_invalid_transition());
}

#[test]
fn error_stale_entity() {
    let err = Error::stale_entity(EntityId::new(5, 2));
    assert!(matches!(err.kind, ErrorKind::StaleEntity(_)));
    assert!(err.to_string().contains('5'));
}

#[test]
fn error_component_not_found() {
    let err = Error::component_not_found(EntityId::new(1, 1), ComponentTypeId::new(7));
    assert!(matches!(err.kind, ErrorKind::ComponentNotFound { .. }));
    assert!(err.to_string().contains("#7"));
}

#[test]
fn error_duplicate_component() {
    let err = Error::duplicate_component(EntityId::new(1, 1), ComponentTypeId::new(3));
    assert!(matches!(err.kind, ErrorKind::DuplicateComponent { .. }));
}

#[test]
fn error_listener() {
    let err = Error::listener("wheelchair already folded");
    assert!(err.to_string().contains("wheelchair already folded"));
}

// =============================================================================
// Error Display
// =============================================================================

#[test]
fn shutdown_requirement_display() {
    let err = Error::invalid_transition(
        LifecycleOp::Shutdown,
        LifeStage::Stopped,
        StageRequirement::Settled {
            from: LifeStage::Initializing,
            until: LifeStage::Stopping,
        },
        EntityId::new(0, 1),
    );
    let msg = err.to_string();
    assert!(msg.contains("a settled stage in [initializing, stopping)"));
    assert!(msg.contains("found stopped"));
}

#[test]
fn context_display() {
    let ctx = ErrorContext::new()
        .with_component(ComponentTypeId::new(1))
        .with_note("during entity deletion");
    let msg = ctx.to_string();
    assert!(msg.contains("#1"));
    assert!(msg.contains("during entity deletion"));
}
