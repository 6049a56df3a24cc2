//! Multi-stage pipeline tests: dependency gating across cursors and the
//! stage runner loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use conveyor::factory::CursorFactory;
use conveyor::model::{ItemId, NewItem};
use conveyor::order::ArrivalOrder;
use conveyor::readiness::{Readiness, StageGate};
use conveyor::registry::Registry;
use conveyor::stage::{Stage, StageConfig};

fn setup() -> (Arc<Registry>, CursorFactory) {
    let registry = Arc::new(Registry::new(Box::new(ArrivalOrder)));
    let factory = CursorFactory::new(Arc::clone(&registry));
    (registry, factory)
}

// ---------------------------------------------------------------------------
// Scenario A: downstream stage blocked until upstream completes
// ---------------------------------------------------------------------------

#[test]
fn downstream_stage_waits_for_upstream_flag() {
    let (registry, factory) = setup();
    let car = registry.append(NewItem::new("car"));

    let wheels_gate = StageGate::new("wheels");
    let mut paint = factory.create_cursor(Box::new(StageGate::new("paint").requires("wheels")));

    // Wheels not fitted yet: paint sees nothing.
    assert!(paint.advance().unwrap().is_none());

    // Upstream completes through its own predicate.
    wheels_gate.mark_completed(&car);

    paint.mark_dirty();
    assert_eq!(paint.advance().unwrap().unwrap().id, car.id);
}

#[test]
fn unblocking_is_visible_even_without_a_dirty_mark() {
    // Flag changes are not registry mutations; the cursor re-evaluates
    // readiness against its cached snapshot, so no rebuild is needed.
    let (registry, factory) = setup();
    let car = registry.append(NewItem::new("car"));

    let mut wheels = factory.create_cursor(Box::new(StageGate::new("wheels")));
    let mut paint = factory.create_cursor(Box::new(StageGate::new("paint").requires("wheels")));

    assert!(paint.advance().unwrap().is_none());

    assert_eq!(wheels.advance().unwrap().unwrap().id, car.id);
    assert!(wheels.advance().unwrap().is_none()); // completes the car

    assert_eq!(paint.advance().unwrap().unwrap().id, car.id);
}

// ---------------------------------------------------------------------------
// Cursor independence
// ---------------------------------------------------------------------------

#[test]
fn cursors_only_interact_through_shared_flags() {
    let (registry, factory) = setup();
    let a = registry.append(NewItem::new("car"));
    let b = registry.append(NewItem::new("car"));

    let mut wheels = factory.create_cursor(Box::new(StageGate::new("wheels")));
    let mut polish = factory.create_cursor(Box::new(StageGate::new("polish")));

    // Independent stages with no upstream requirement walk the same order
    // without disturbing each other's position.
    assert_eq!(wheels.advance().unwrap().unwrap().id, a.id);
    assert_eq!(polish.advance().unwrap().unwrap().id, a.id);
    assert_eq!(wheels.advance().unwrap().unwrap().id, b.id);
    assert_eq!(polish.advance().unwrap().unwrap().id, b.id);
    assert!(wheels.advance().unwrap().is_none());
    assert!(polish.advance().unwrap().is_none());
}

#[test]
fn fanout_marks_every_cursor_for_one_mutation() {
    let (registry, factory) = setup();

    let mut first = factory.create_cursor(Box::new(StageGate::new("wheels")));
    let mut second = factory.create_cursor(Box::new(StageGate::new("polish")));
    assert!(first.advance().unwrap().is_none());
    assert!(second.advance().unwrap().is_none());

    let car = registry.append(NewItem::new("car"));

    // Both cursors were marked dirty by the single factory subscription.
    assert_eq!(first.advance().unwrap().unwrap().id, car.id);
    assert_eq!(second.advance().unwrap().unwrap().id, car.id);
}

// ---------------------------------------------------------------------------
// Stage runner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stage_runner_drains_and_shuts_down() {
    let (registry, factory) = setup();
    for _ in 0..3 {
        registry.append(NewItem::new("car"));
    }

    let processed: Arc<Mutex<Vec<ItemId>>> = Arc::default();
    let sink = Arc::clone(&processed);

    let mut stage = Stage::new(
        "wheels",
        factory.create_cursor(Box::new(StageGate::new("wheels"))),
        move |item: &conveyor::model::Item| sink.lock().unwrap().push(item.id),
        StageConfig {
            poll_interval: Duration::from_millis(10),
        },
    );
    let stop = stage.shutdown_handle();
    let task = tokio::spawn(async move { stage.run().await });

    // Give the loop a couple of poll ticks to drain the batch.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(processed.lock().unwrap().len(), 3);

    // A late arrival is picked up on a subsequent poll.
    registry.append(NewItem::new("car"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(processed.lock().unwrap().len(), 4);

    stop.notify_one();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn two_stage_pipeline_runs_every_item_through_both_stages() {
    let (registry, factory) = setup();
    for _ in 0..3 {
        registry.append(NewItem::new("car"));
    }

    let config = StageConfig {
        poll_interval: Duration::from_millis(10),
    };
    let mut wheels = Stage::new(
        "wheels",
        factory.create_cursor(Box::new(StageGate::new("wheels"))),
        |_: &conveyor::model::Item| {},
        config.clone(),
    );
    let mut paint = Stage::new(
        "paint",
        factory.create_cursor(Box::new(StageGate::new("paint").requires("wheels"))),
        |_: &conveyor::model::Item| {},
        config,
    );
    let stop_wheels = wheels.shutdown_handle();
    let stop_paint = paint.shutdown_handle();

    let wheels_task = tokio::spawn(async move { wheels.run().await });
    let paint_task = tokio::spawn(async move { paint.run().await });

    tokio::time::sleep(Duration::from_millis(200)).await;

    for item in registry.snapshot() {
        assert!(item.flags.is_set("wheels"), "wheels missed {}", item.id);
        assert!(item.flags.is_set("paint"), "paint missed {}", item.id);
    }

    stop_wheels.notify_one();
    stop_paint.notify_one();
    wheels_task.await.unwrap().unwrap();
    paint_task.await.unwrap().unwrap();
}
