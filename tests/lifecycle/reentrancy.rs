//! Integration tests for reentrant removal
//!
//! A listener may remove the component it is notified about. Any other
//! re-entry is an invalid transition.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stagehand_foundation::{LifeStage, Tick};
use stagehand_lifecycle::{
    Component, ComponentRecord, EventBus, LifecycleConfig, LifecycleEvent, LifecycleManager,
};

use crate::support::{FOLDABLE, count, events, record_all};

// =============================================================================
// Self-Removal
// =============================================================================

#[test]
fn self_removal_during_startup_reaches_deleted_once() {
    let bus = EventBus::new();
    let journal = record_all(&bus);
    bus.subscribe(FOLDABLE, LifecycleEvent::Startup, |ctx| ctx.remove_component());
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::strict());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();
    manager.startup(&mut c).unwrap();

    assert_eq!(c.stage(), LifeStage::Deleted);
    assert_eq!(count(&journal, LifecycleEvent::Shutdown), 0);
    assert_eq!(count(&journal, LifecycleEvent::Remove), 1);
    // Typed listeners run first: the global recorder sees the nested
    // removal, then the startup it was already due, on a deleted component.
    assert_eq!(
        *journal.borrow(),
        vec![
            (LifecycleEvent::Add, LifeStage::Adding),
            (LifecycleEvent::Initialize, LifeStage::Initializing),
            (LifecycleEvent::Remove, LifeStage::Removing),
            (LifecycleEvent::Startup, LifeStage::Deleted),
        ]
    );
}

#[test]
fn later_listeners_still_see_event_after_self_removal() {
    let bus = EventBus::new();
    bus.subscribe(FOLDABLE, LifecycleEvent::Startup, |ctx| ctx.remove_component());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    bus.subscribe(FOLDABLE, LifecycleEvent::Startup, move |ctx| {
        s.borrow_mut().push((ctx.stage(), ctx.is_removed()));
        Ok(())
    });
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::strict());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();
    manager.startup(&mut c).unwrap();

    assert_eq!(*seen.borrow(), vec![(LifeStage::Deleted, true)]);
}

#[test]
fn self_removal_during_initialize() {
    let bus = EventBus::new();
    let journal = record_all(&bus);
    bus.subscribe(FOLDABLE, LifecycleEvent::Initialize, |ctx| ctx.remove_component());
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::strict());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();

    assert_eq!(c.stage(), LifeStage::Deleted);
    assert_eq!(count(&journal, LifecycleEvent::Shutdown), 0);
    assert_eq!(count(&journal, LifecycleEvent::Remove), 1);
}

#[test]
fn self_removal_during_add() {
    let bus = EventBus::new();
    let journal = record_all(&bus);
    bus.subscribe(FOLDABLE, LifecycleEvent::Add, |ctx| ctx.remove_component());
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::strict());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();

    assert_eq!(c.stage(), LifeStage::Deleted);
    assert_eq!(events(&journal), vec![LifecycleEvent::Remove, LifecycleEvent::Add]);
}

#[test]
fn removed_component_rejects_later_entry_points() {
    let bus = EventBus::new();
    bus.subscribe(FOLDABLE, LifecycleEvent::Startup, |ctx| ctx.remove_component());
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::lenient());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();
    manager.startup(&mut c).unwrap();

    assert!(manager.shutdown(&mut c).is_err());
    assert!(manager.remove_from_entity(&mut c).is_err());
    assert_eq!(c.stage(), LifeStage::Deleted);
}

// =============================================================================
// Illegal Re-entry
// =============================================================================

#[test]
fn startup_from_initialize_listener_is_rejected() {
    let bus = EventBus::new();
    let rejected = Rc::new(Cell::new(false));
    let r = Rc::clone(&rejected);
    bus.subscribe(FOLDABLE, LifecycleEvent::Initialize, move |ctx| {
        let lifecycle = ctx.lifecycle();
        let result = lifecycle.startup(ctx.component_mut());
        r.set(result.is_err_and(|err| err.is_invalid_transition()));
        Ok(())
    });
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::lenient());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();

    assert!(rejected.get());
    assert_eq!(c.stage(), LifeStage::Initialized);
}

#[test]
fn shutdown_from_startup_listener_is_rejected() {
    let bus = EventBus::new();
    let rejected = Rc::new(Cell::new(false));
    let r = Rc::clone(&rejected);
    bus.subscribe(FOLDABLE, LifecycleEvent::Startup, move |ctx| {
        let lifecycle = ctx.lifecycle();
        let result = lifecycle.shutdown(ctx.component_mut());
        r.set(result.is_err_and(|err| err.is_invalid_transition()));
        Ok(())
    });
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    bus.subscribe(FOLDABLE, LifecycleEvent::Startup, move |ctx| {
        s.borrow_mut().push(ctx.stage());
        Ok(())
    });
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::lenient());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();
    manager.startup(&mut c).unwrap();

    assert!(rejected.get());
    assert_eq!(*seen.borrow(), vec![LifeStage::Starting]);
    assert_eq!(c.stage(), LifeStage::Running);
}

#[test]
fn shutdown_from_initialize_listener_is_rejected() {
    let bus = EventBus::new();
    let rejected = Rc::new(Cell::new(false));
    let r = Rc::clone(&rejected);
    bus.subscribe(FOLDABLE, LifecycleEvent::Initialize, move |ctx| {
        let lifecycle = ctx.lifecycle();
        r.set(lifecycle.shutdown(ctx.component_mut()).is_err());
        Ok(())
    });
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::lenient());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();

    assert!(rejected.get());
    assert_eq!(c.stage(), LifeStage::Initialized);
}

#[test]
#[should_panic(expected = "lifecycle invariant violated")]
fn strict_mode_panics_on_shutdown_during_startup() {
    let bus = EventBus::new();
    bus.subscribe(FOLDABLE, LifecycleEvent::Startup, |ctx| {
        let lifecycle = ctx.lifecycle();
        lifecycle.shutdown(ctx.component_mut())
    });
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::strict());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.initialize(&mut c, FOLDABLE).unwrap();
    let _ = manager.startup(&mut c);
}

#[test]
fn removal_from_remove_listener_is_rejected() {
    let bus = EventBus::new();
    let rejected = Rc::new(Cell::new(false));
    let r = Rc::clone(&rejected);
    bus.subscribe(FOLDABLE, LifecycleEvent::Remove, move |ctx| {
        r.set(ctx.remove_component().is_err());
        Ok(())
    });
    let journal = record_all(&bus);
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::lenient());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO).unwrap();
    manager.remove_from_entity(&mut c).unwrap();

    assert!(rejected.get());
    assert_eq!(count(&journal, LifecycleEvent::Remove), 1);
    assert_eq!(c.stage(), LifeStage::Deleted);
}

#[test]
#[should_panic(expected = "lifecycle invariant violated")]
fn strict_mode_panics_on_illegal_reentry() {
    let bus = EventBus::new();
    bus.subscribe(FOLDABLE, LifecycleEvent::Add, |ctx| {
        let lifecycle = ctx.lifecycle();
        lifecycle.initialize(ctx.component_mut(), FOLDABLE)
    });
    let manager = LifecycleManager::with_config(&bus, LifecycleConfig::strict());

    let mut c = ComponentRecord::detached(FOLDABLE, ());
    let _ = manager.add_to_entity(&mut c, FOLDABLE, Tick::ZERO);
}
