//! Stage preconditions for the lifecycle entry points.
//!
//! Stateless: maps each [`LifecycleOp`] to the stage(s) it may be invoked
//! from and validates a component's current stage against that.
//!
//! Only removal may run while another event for the same component is in
//! flight. Removal from inside a listener tears the component down through
//! [`TEARDOWN`], which lets it stop a component that is still
//! `Initializing` or `Starting`.

use stagehand_foundation::{
    Error, ErrorContext, LifeStage, LifecycleOp, Result, StageRequirement,
};

use crate::component::ComponentLife;

/// Stages from which removal stops a component before deleting it.
pub const TEARDOWN: StageRequirement = StageRequirement::Range {
    from: LifeStage::Initializing,
    until: LifeStage::Stopping,
};

/// Returns the stage requirement of an entry point.
#[must_use]
pub const fn requirement(op: LifecycleOp) -> StageRequirement {
    match op {
        LifecycleOp::AddToEntity => StageRequirement::Exactly(LifeStage::PreAdd),
        LifecycleOp::Initialize => StageRequirement::Exactly(LifeStage::Added),
        LifecycleOp::Startup => StageRequirement::Exactly(LifeStage::Initialized),
        LifecycleOp::Shutdown => StageRequirement::Settled {
            from: LifeStage::Initializing,
            until: LifeStage::Stopping,
        },
        // Deleted is terminal, and a second removal from inside the remove
        // event would publish it twice.
        LifecycleOp::RemoveFromEntity => StageRequirement::Attached,
    }
}

/// Returns true if `op` may be invoked on a component in `stage`.
#[must_use]
pub fn permits(op: LifecycleOp, stage: LifeStage) -> bool {
    requirement(op).is_satisfied_by(stage)
}

/// Validates that `op` may be invoked on the component.
///
/// # Errors
///
/// Returns `InvalidTransition` naming the op, the observed stage, and the
/// requirement.
pub fn check(op: LifecycleOp, life: &ComponentLife) -> Result<()> {
    let required = requirement(op);
    if required.is_satisfied_by(life.stage()) {
        Ok(())
    } else {
        Err(Error::invalid_transition(op, life.stage(), required, life.owner())
            .with_context(ErrorContext::new().with_component(life.type_id())))
    }
}

/// Returns true if removing a component in `stage` stops it first.
#[must_use]
pub fn stops_before_removal(stage: LifeStage) -> bool {
    TEARDOWN.is_satisfied_by(stage)
}

/// Returns true if shutdown of a component in `stage` publishes nothing.
///
/// A component that never reached `Running` ran no startup logic to undo.
/// That includes a component still in `Starting`, removed by one of its own
/// startup listeners.
#[must_use]
pub fn skips_shutdown_event(stage: LifeStage) -> bool {
    stage < LifeStage::Running
}
