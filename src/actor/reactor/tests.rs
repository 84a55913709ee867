use std::time::Duration;

use pretty_assertions::assert_eq;

use super::testing::Harness;
use super::{Event, PointerKind, Reactor, Record, Status};
use crate::actor::broadcast::{self, BroadcastEvent, CancelReason};
use crate::actor::scroller::Velocity;
use crate::common::config::Settings;
use crate::model::error::DragError;
use crate::model::geometry::{Axis, Point, Rect};
use crate::model::order::Order;
use crate::model::scroll_state::ScrollDirection;
use crate::model::session::Group;
use crate::sys::host::{Host, RegionId, ScrollBehavior};
use crate::sys::sim::{ScrollCommand, SimHost};

const REGION: RegionId = RegionId(1);

fn order(items: &[usize]) -> Order { Order::from_vec(items.to_vec()).unwrap() }

/// Twenty 50px items inside a 300px tall scrollable region.
fn scrolling(settings: Settings) -> Harness {
    let host = SimHost::new(Axis::Vertical, &[50.0; 20], 100.0)
        .with_region(Rect::new(0.0, 0.0, 100.0, 300.0), 1000.0);
    Harness::new(settings, host)
}

#[test_log::test]
fn item_moves_past_the_midpoint_of_its_neighbours() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.grab(10.0, 25.0);
    h.drag_to(10.0, 145.0);
    assert_eq!(h.reactor.session().map(|s| s.current_index), Some(2));
    h.drag_to(10.0, 150.0);
    assert_eq!(h.reactor.session().map(|s| s.current_index), Some(3));

    assert_eq!(h.reactor.target_rect(), Some(Rect::new(0.0, 125.0, 100.0, 50.0)));
    assert_eq!(h.reactor.items_offset(), vec![0.0, -50.0, -50.0, -50.0, 0.0, 0.0]);
    assert_eq!(h.reactor.placeholder_offset(), 150.0);
    assert_eq!(h.reactor.placeholder_size(), Some(Point::new(100.0, 50.0)));

    h.release(10.0, 150.0);
    assert_eq!(h.status(), Status::DropSettling);
    h.settle();
    assert_eq!(h.status(), Status::Inactive);

    assert_eq!(
        h.notable(),
        vec![
            BroadcastEvent::PressStart { index: Some(0) },
            BroadcastEvent::DragStart { index: 0, group: Group::single(0) },
            BroadcastEvent::Cross {
                from: 0,
                current: 2,
                old_current: 0,
                group: Group::single(2),
                order: order(&[1, 2, 0, 3, 4, 5]),
            },
            BroadcastEvent::Cross {
                from: 0,
                current: 3,
                old_current: 2,
                group: Group::single(3),
                order: order(&[1, 2, 3, 0, 4, 5]),
            },
            BroadcastEvent::BeforeDrop { index: 3 },
            BroadcastEvent::Drop { index: 3 },
            BroadcastEvent::DragEnd { index: 3 },
            BroadcastEvent::OrderChange {
                from: 0,
                to: 3,
                group: Group::single(0),
                order: order(&[1, 2, 3, 0, 4, 5]),
            },
        ]
    );
}

#[test_log::test]
fn returning_to_the_start_changes_nothing() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.grab(10.0, 25.0);
    h.drag_to(10.0, 145.0);
    h.drag_to(10.0, 25.0);
    h.release(10.0, 25.0);
    h.settle();

    let names = h.names();
    assert_eq!(names.iter().filter(|n| **n == "cross").count(), 2);
    assert_eq!(names.last(), Some(&"drag_end"));
    assert!(!names.contains(&"order_change"));
}

#[test_log::test]
fn groups_move_as_one() {
    let settings = Settings { groups: vec![[2, 3]], ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    // Pressing the second member still drags the whole group.
    h.grab(10.0, 175.0);
    assert_eq!(h.reactor.session().map(|s| s.start_group), Some(Group::new(2, 3)));
    assert_eq!(h.reactor.placeholder_size(), Some(Point::new(100.0, 100.0)));

    h.drag_to(10.0, 75.0);
    h.release(10.0, 75.0);
    h.settle();

    let events = h.notable();
    assert_eq!(events[1], BroadcastEvent::DragStart { index: 2, group: Group::new(2, 3) });
    assert_eq!(
        events.last(),
        Some(&BroadcastEvent::OrderChange {
            from: 2,
            to: 0,
            group: Group::new(2, 3),
            order: order(&[2, 3, 0, 1, 4, 5]),
        })
    );
}

#[test_log::test]
fn cancel_is_idempotent() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.cancel(CancelReason::Aborted);
    assert!(h.events().is_empty());

    h.grab(10.0, 25.0);
    h.drag_to(10.0, 145.0);
    h.cancel(CancelReason::Aborted);
    h.cancel(CancelReason::Aborted);
    assert_eq!(h.status(), Status::Inactive);
    assert_eq!(h.reactor.session(), None);

    let events = h.notable();
    let canceled: Vec<_> =
        events.iter().filter(|e| matches!(e, BroadcastEvent::Canceled { .. })).collect();
    assert_eq!(canceled, vec![&BroadcastEvent::Canceled { reason: CancelReason::Aborted }]);
    assert!(!events.iter().any(|e| matches!(e, BroadcastEvent::OrderChange { .. })));
}

#[test_log::test]
fn cancel_after_drop_does_not_interrupt_settling() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.grab(10.0, 25.0);
    h.drag_to(10.0, 150.0);
    h.release(10.0, 150.0);
    h.cancel(CancelReason::Aborted);
    assert_eq!(h.status(), Status::DropSettling);
    h.settle();
    let names = h.names();
    assert!(!names.contains(&"canceled"));
    assert_eq!(names.last(), Some(&"order_change"));
}

#[test_log::test]
fn press_outside_the_items_is_a_boundary_error() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.press(10.0, 400.0).unwrap();
    let err = h.reactor.handle_event(Event::DragStart { pointer: Point::new(10.0, 400.0) });
    assert_eq!(err, Err(DragError::OutOfBounds { offset: 400.0, extent: 300.0 }));
    assert_eq!(h.status(), Status::Inactive);
    assert_eq!(h.reactor.session(), None);
    assert_eq!(h.names(), vec!["press_start"]);
}

#[test_log::test]
fn blocked_items_cancel_the_start() {
    let mut host = SimHost::new(Axis::Vertical, &[50.0; 6], 100.0);
    host.block(1);
    let mut h = Harness::new(Settings::default(), host);
    h.press(10.0, 75.0).unwrap();
    h.press_move(10.0, 76.0).unwrap();
    assert_eq!(h.status(), Status::Inactive);
    assert_eq!(
        h.events(),
        vec![
            BroadcastEvent::PressStart { index: Some(1) },
            BroadcastEvent::Canceled { reason: CancelReason::NotDraggable },
        ]
    );
}

#[test_log::test]
fn mouse_without_delay_starts_on_first_move() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.press(10.0, 25.0).unwrap();
    assert_eq!(h.status(), Status::StartPending);
    assert!(!h.reactor.scheduler().is_pending());
    h.press_move(10.0, 27.0).unwrap();
    assert_eq!(h.status(), Status::Dragging);
    assert_eq!(h.reactor.session().map(|s| s.start_pointer), Some(Point::new(10.0, 27.0)));
}

#[test_log::test]
fn touch_waits_for_its_own_delay() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.press_with(10.0, 25.0, PointerKind::Touch).unwrap();
    assert_eq!(h.status(), Status::StartPending);
    assert!(h.reactor.scheduler().is_pending());
    h.frames(12);
    assert_eq!(h.status(), Status::StartPending);
    h.frames(1);
    assert_eq!(h.status(), Status::Dragging);

    let settings = Settings { touch_start_delay: Duration::ZERO, ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    h.press_with(10.0, 25.0, PointerKind::Touch).unwrap();
    assert_eq!(h.status(), Status::Dragging);
}

#[test_log::test]
fn moving_too_far_during_the_delay_cancels() {
    let settings = Settings { start_delay: Duration::from_millis(200), ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    h.press(10.0, 25.0).unwrap();
    h.press_move(10.0, 28.0).unwrap();
    assert_eq!(h.status(), Status::StartPending);
    h.press_move(10.0, 40.0).unwrap();
    assert_eq!(h.status(), Status::Inactive);
    assert_eq!(
        h.events().last(),
        Some(&BroadcastEvent::Canceled { reason: CancelReason::ExceededOffsetTolerance })
    );
}

#[test_log::test]
fn releasing_during_the_delay_cancels() {
    let settings = Settings { start_delay: Duration::from_millis(200), ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    h.press(10.0, 25.0).unwrap();
    h.frame().unwrap();
    h.release(10.0, 25.0);
    assert_eq!(h.status(), Status::Inactive);
    assert_eq!(
        h.events().last(),
        Some(&BroadcastEvent::Canceled { reason: CancelReason::ReleasedBeforeDelay })
    );
}

#[test_log::test]
fn delayed_start_uses_the_latest_pointer() {
    let settings = Settings { start_delay: Duration::from_millis(200), ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    h.press(10.0, 25.0).unwrap();
    h.press_move(10.0, 27.0).unwrap();
    h.frames(13);
    assert_eq!(h.status(), Status::Dragging);
    assert_eq!(h.reactor.session().map(|s| s.start_pointer), Some(Point::new(10.0, 27.0)));
}

#[test_log::test]
fn start_measures_again_when_the_layout_moved() {
    let settings = Settings { start_delay: Duration::from_millis(200), ..Default::default() };
    let mut h = scrolling(settings);
    h.press(10.0, 25.0).unwrap();
    h.host_mut().set_offset(REGION, 3.0);
    let moved = h.host().container_rect();
    h.container_moved(moved);
    assert_eq!(h.status(), Status::StartPending);
    h.frames(13);
    assert_eq!(h.status(), Status::Dragging);
    let session = h.reactor.session().cloned().unwrap();
    assert_eq!(session.start_container_rect.y, -3.0);
    assert_eq!(session.start_index, 0);
}

#[test_log::test]
fn container_scroll_under_a_still_pointer_moves_the_index() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.grab(10.0, 25.0);
    h.container_moved(Rect::new(0.0, -100.0, 100.0, 300.0));
    assert_eq!(h.reactor.session().map(|s| s.current_index), Some(2));
}

#[test_log::test]
fn autoscroll_follows_edge_contact() {
    let mut h = scrolling(Settings::default());
    h.grab(10.0, 75.0);
    h.drag_to(10.0, 290.0);
    assert_eq!(
        h.notable()[2..],
        [
            BroadcastEvent::Cross {
                from: 1,
                current: 5,
                old_current: 1,
                group: Group::single(5),
                order: order(&[0, 2, 3, 4, 5, 1, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19]),
            },
            BroadcastEvent::EnterEdge { region: REGION, direction: ScrollDirection::Forward },
            BroadcastEvent::ScrollStart {
                region: REGION,
                direction: ScrollDirection::Forward,
                started_at: Duration::ZERO,
            },
        ]
    );

    h.frames(5);
    assert_eq!(h.host().offset(REGION), 15.0);
    assert_eq!(h.status(), Status::Dragging);

    // Deeper contact scrolls faster.
    h.drag_to(10.0, 380.0);
    h.events();
    h.frame().unwrap();
    assert!(h.events().contains(&BroadcastEvent::Scroll { region: REGION, offset: 45.0, delta: 30.0 }));

    h.drag_to(10.0, 150.0);
    h.reactor.scheduler().take_request();
    h.frame().unwrap();
    assert!(!h.reactor.scheduler().take_request());
    h.frames(3);
    assert_eq!(h.host().offset(REGION), 45.0);

    let events = h.notable();
    assert!(events.contains(&BroadcastEvent::LeaveEdge));
    let ends: Vec<_> =
        events.iter().filter(|e| matches!(e, BroadcastEvent::ScrollEnd { .. })).collect();
    assert_eq!(ends, vec![&BroadcastEvent::ScrollEnd { region: REGION, offset: 45.0 }]);
}

#[test_log::test]
fn autoscroll_stays_on_its_region_until_that_region_runs_out() {
    // The inner region can scroll 50px; the outer one ends 10px lower, so a
    // dragged item past the inner edge touches both.
    let host = SimHost::new(Axis::Vertical, &[50.0; 7], 100.0)
        .with_region(Rect::new(0.0, 0.0, 100.0, 300.0), 350.0)
        .with_region(Rect::new(0.0, 0.0, 100.0, 310.0), 600.0);
    let inner = RegionId(1);
    let outer = RegionId(2);
    let mut h = Harness::new(Settings::default(), host);
    h.grab(10.0, 75.0);
    h.drag_to(10.0, 290.0);
    h.frames(10);
    assert_eq!(h.host().offset(inner), 30.0);
    assert_eq!(h.host().offset(outer), 0.0);

    let periods = |events: Vec<BroadcastEvent>| -> Vec<BroadcastEvent> {
        events
            .into_iter()
            .filter(|e| {
                matches!(e, BroadcastEvent::ScrollStart { .. } | BroadcastEvent::ScrollEnd { .. })
            })
            .collect()
    };
    assert_eq!(
        periods(h.notable()),
        vec![BroadcastEvent::ScrollStart {
            region: inner,
            direction: ScrollDirection::Forward,
            started_at: Duration::ZERO,
        }]
    );

    // Frame 17 brings the inner region to its end.
    h.frames(7);
    assert_eq!(h.host().offset(inner), 50.0);
    assert_eq!(
        periods(h.notable()),
        vec![
            BroadcastEvent::ScrollEnd { region: inner, offset: 50.0 },
            BroadcastEvent::ScrollStart {
                region: outer,
                direction: ScrollDirection::Forward,
                started_at: Duration::from_millis(272),
            },
        ]
    );

    h.frame().unwrap();
    assert_eq!(h.host().offset(outer), 3.0);
    assert_eq!(h.host().offset(inner), 50.0);
    assert!(periods(h.notable()).is_empty());
}

#[test_log::test]
fn non_finite_velocity_is_reported_and_the_drag_goes_on() {
    let mut h = scrolling(Settings::default());
    h.reactor = h.reactor.with_velocity(Velocity::Custom(Box::new(|_, _| f64::INFINITY)));
    h.grab(10.0, 25.0);
    h.drag_to(10.0, 290.0);
    h.frame().unwrap();
    assert_eq!(h.host().offset(REGION), 0.0);
    assert_eq!(h.status(), Status::Dragging);
    assert!(h.names().contains(&"scroll_error"));
}

#[test_log::test]
fn drop_scrolls_the_landing_slot_into_view() {
    let mut h = scrolling(Settings::default());
    h.grab(10.0, 75.0);
    h.drag_to(10.0, 310.0);
    h.release(10.0, 310.0);
    assert_eq!(
        h.host().scroll_log(),
        &[ScrollCommand {
            region: REGION,
            axis: Axis::Vertical,
            offset: 50.0,
            behavior: ScrollBehavior::Smooth,
        }]
    );
    assert_eq!(h.reactor.session().and_then(|s| s.end_index), Some(6));

    h.frame().unwrap();
    assert_eq!(h.reactor.justified_rect(), Some(Rect::new(0.0, 250.0, 100.0, 50.0)));
    assert_eq!(h.reactor.target_rect(), h.reactor.justified_rect());

    let names = h.names();
    let drop = names.iter().position(|n| *n == "drop").unwrap();
    assert_eq!(&names[drop - 2..=drop], &["scroll_end", "before_drop", "drop"]);
}

#[test_log::test]
fn settle_waits_for_the_transition() {
    let settings = Settings { transition_duration: Duration::from_millis(100), ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    h.grab(10.0, 25.0);
    h.drag_to(10.0, 150.0);
    h.frames(2);
    h.release(10.0, 150.0);
    // Dropped at 32ms: the frame at 128ms is still short of the transition.
    h.frames(6);
    assert_eq!(h.status(), Status::DropSettling);
    h.frames(1);
    assert_eq!(h.status(), Status::Inactive);
}

#[test_log::test]
fn resize_rebuilds_the_index() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.grab(10.0, 25.0);
    h.host_mut().set_item_extents(&[50.0, 100.0, 50.0, 50.0, 50.0, 50.0]);
    h.resized();
    h.drag_to(10.0, 125.0);
    assert_eq!(h.reactor.session().map(|s| s.current_index), Some(1));
}

#[test_log::test]
fn resize_that_changes_the_item_count_cancels() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.grab(10.0, 25.0);
    h.host_mut().set_item_extents(&[50.0; 5]);
    h.resized();
    assert_eq!(h.status(), Status::Inactive);
    assert_eq!(
        h.events().last(),
        Some(&BroadcastEvent::Canceled { reason: CancelReason::ItemsChanged })
    );
}

#[test_log::test]
fn locked_item_stays_inside_the_container() {
    let settings = Settings { lock_to_container: true, ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    h.grab(10.0, 75.0);
    h.drag_to(10.0, 400.0);
    assert_eq!(h.reactor.target_rect(), Some(Rect::new(0.0, 250.0, 100.0, 50.0)));
    assert_eq!(h.reactor.session().map(|s| s.current_index), Some(5));
    h.drag_to(10.0, 450.0);
    h.drag_to(10.0, 100.0);

    let edges: Vec<_> = h
        .notable()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                BroadcastEvent::EnterContainerEdge { .. } | BroadcastEvent::LeaveContainerEdge
            )
        })
        .collect();
    assert_eq!(
        edges,
        vec![
            BroadcastEvent::EnterContainerEdge { direction: ScrollDirection::Forward },
            BroadcastEvent::LeaveContainerEdge,
        ]
    );
}

#[test_log::test]
fn cross_axis_lock_only_affects_the_drawn_rect() {
    let settings = Settings { lock_cross_axis: true, ..Default::default() };
    let mut h = Harness::column(settings, 6, 50.0);
    h.grab(10.0, 25.0);
    h.drag_to(40.0, 75.0);
    assert_eq!(h.reactor.target_rect(), Some(Rect::new(0.0, 50.0, 100.0, 50.0)));

    let mut free = Harness::column(Settings::default(), 6, 50.0);
    free.grab(10.0, 25.0);
    free.drag_to(40.0, 75.0);
    assert_eq!(free.reactor.target_rect(), Some(Rect::new(30.0, 50.0, 100.0, 50.0)));
}

#[test_log::test]
fn second_press_during_a_drag_is_ignored() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    h.grab(10.0, 25.0);
    h.events();
    h.press(10.0, 125.0).unwrap();
    assert!(h.events().is_empty());
    assert_eq!(h.reactor.session().map(|s| s.start_index), Some(0));
}

#[test_log::test]
fn config_updates_apply_to_the_next_press() {
    let mut h = Harness::column(Settings::default(), 6, 50.0);
    let settings = Settings { groups: vec![[0, 1]], ..Default::default() };
    h.reactor.handle_event(Event::ConfigUpdated(Box::new(settings))).unwrap();
    h.grab(10.0, 25.0);
    assert_eq!(h.reactor.session().map(|s| s.start_group), Some(Group::new(0, 1)));
}

#[test_log::test(tokio::test)]
async fn spawned_reactor_completes_a_drag() {
    let (tx, mut rx) = broadcast::channel();
    let settings = Settings { transition_duration: Duration::ZERO, ..Default::default() };
    let host = SimHost::new(Axis::Vertical, &[50.0; 6], 100.0);
    let handle = Reactor::spawn(settings, host, Some(tx), Record::default()).unwrap();

    handle.press(Point::new(10.0, 25.0), PointerKind::Mouse);
    handle.send(Event::PressMove { pointer: Point::new(10.0, 26.0) });
    handle.send(Event::DragOver { pointer: Point::new(10.0, 151.0) });
    assert_eq!(handle.query_status(), Some(Status::Dragging));
    assert_eq!(
        handle.query_visual().target_rect,
        Some(Rect::new(0.0, 125.0, 100.0, 50.0))
    );
    handle.send(Event::Drop { pointer: Point::new(10.0, 151.0) });

    let order = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(BroadcastEvent::OrderChange { order, .. }) => break order,
                Ok(_) => {}
                Err(err) => panic!("broadcast closed: {err}"),
            }
        }
    })
    .await
    .expect("order change within the timeout");
    assert_eq!(order, self::order(&[1, 2, 3, 0, 4, 5]));
    assert_eq!(handle.query_status(), Some(Status::Inactive));
    assert_eq!(handle.query_session(), None);
}
