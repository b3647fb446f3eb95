use super::*;
use crate::animation::channel::Channel;
use crate::frame::clock::FrameLoop;
use crate::scroll::source::ScrollConfig;
use crate::smoothing::spring::SpringConfig;
use crate::trigger::marker::Extent;

const DT: f64 = 1.0 / 60.0;

struct Rig {
    frame_loop: FrameLoop,
    source: ScrollSource,
    tracker: ProgressTracker,
}

fn rig() -> Rig {
    let frame_loop = FrameLoop::new();
    let source = ScrollSource::attach(&frame_loop, ScrollConfig::default()).unwrap();
    let viewport = Viewport::new(1000.0, 800.0).unwrap();
    let tracker = ProgressTracker::attach(&source, viewport).unwrap();
    Rig {
        frame_loop,
        source,
        tracker,
    }
}

fn absolute(element: Rc<dyn ElementHandle>, start: f64, end: f64) -> TriggerSpec {
    TriggerSpec::new(element)
        .markers(&format!("@{start}"), &format!("@{end}"))
        .unwrap()
}

#[test]
fn progress_is_linear_between_markers() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let id = r.tracker.register(absolute(el, 0.0, 5000.0), None).unwrap();
    r.source.scroll_to(2500.0);
    r.frame_loop.tick(DT);
    let frame = r.tracker.latest(id).unwrap();
    assert_eq!(frame.raw, 0.5);
    assert_eq!(frame.progress, 0.5);
    assert!(frame.attached);
}

#[test]
fn edge_markers_follow_geometry_changes() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 2000.0, 1000.0, 2400.0));
    let id = r
        .tracker
        .register(TriggerSpec::new(el.clone()), None)
        .unwrap();
    r.source.scroll_to(1800.0);
    r.frame_loop.tick(DT);
    let frame = r.tracker.latest(id).unwrap();
    assert_eq!((frame.start, frame.end), (1200.0, 2400.0));
    assert_eq!(frame.raw, 0.5);

    el.set(Rect::new(0.0, 3000.0, 1000.0, 3400.0));
    r.frame_loop.tick(DT);
    assert_eq!(r.tracker.latest(id).unwrap().raw, 0.0);
}

#[test]
fn detached_element_reports_zero_and_stays_registered() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let id = r
        .tracker
        .register(absolute(el.clone(), 0.0, 1000.0), None)
        .unwrap();
    r.source.scroll_to(500.0);
    r.frame_loop.tick(DT);
    el.detach();
    r.frame_loop.tick(DT);
    let frame = r.tracker.latest(id).unwrap();
    assert!(!frame.attached);
    assert_eq!(frame.raw, 0.0);
    assert_eq!((frame.start, frame.end), (0.0, 1000.0));
    assert!(r.tracker.contains(id));
}

#[test]
fn channels_evaluate_against_smoothed_progress() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let channel = NamedChannel::new(
        "opacity",
        Channel::linear([(0.0, Value::Scalar(10.0)), (1.0, Value::Scalar(20.0))]).unwrap(),
    )
    .unwrap();
    let spec = absolute(el, 0.0, 1000.0).channel(channel);
    let id = r.tracker.register(spec, None).unwrap();
    r.source.scroll_to(500.0);
    r.frame_loop.tick(DT);
    assert_eq!(
        r.tracker.latest(id).unwrap().value("opacity"),
        Some(&Value::Scalar(15.0))
    );
}

#[test]
fn spring_smoothing_lags_raw_progress() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let spec = absolute(el, 0.0, 1000.0)
        .smoothing(Smoothing::Spring(SpringConfig::new(70.0, 30.0)));
    let id = r.tracker.register(spec, None).unwrap();
    r.frame_loop.tick(DT);
    r.source.scroll_to(1000.0);
    r.frame_loop.tick(DT);
    let frame = r.tracker.latest(id).unwrap();
    assert_eq!(frame.raw, 1.0);
    assert!(frame.progress > 0.0 && frame.progress < 1.0);
}

#[test]
fn unregister_inside_own_callback_is_safe() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let calls = Rc::new(Cell::new(0));
    let id_slot = Rc::new(Cell::new(None::<TrackerId>));

    let (tracker, calls2, slot2) = (r.tracker.clone(), Rc::clone(&calls), Rc::clone(&id_slot));
    let id = r
        .tracker
        .register(
            absolute(el, 0.0, 1000.0),
            Some(Box::new(move |frame: &TriggerFrame| {
                calls2.set(calls2.get() + 1);
                assert_eq!(slot2.get(), Some(frame.id));
                assert!(tracker.unregister(frame.id));
            })),
        )
        .unwrap();
    id_slot.set(Some(id));

    r.frame_loop.tick(DT);
    r.frame_loop.tick(DT);
    assert_eq!(calls.get(), 1);
    assert!(!r.tracker.contains(id));
    assert!(r.tracker.latest(id).is_none());
}

#[test]
fn panicking_callback_does_not_starve_other_elements() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let bad = r
        .tracker
        .register(
            absolute(el.clone(), 0.0, 1000.0),
            Some(Box::new(|_: &TriggerFrame| panic!("render target gone"))),
        )
        .unwrap();
    let good_calls = Rc::new(Cell::new(0));
    let g = Rc::clone(&good_calls);
    r.tracker
        .register(
            absolute(el, 0.0, 1000.0),
            Some(Box::new(move |_: &TriggerFrame| g.set(g.get() + 1))),
        )
        .unwrap();
    r.frame_loop.tick(DT);
    r.frame_loop.tick(DT);
    assert_eq!(good_calls.get(), 2);
    assert!(r.tracker.contains(bad));
}

#[test]
fn registration_rejects_invalid_specs() {
    let r = rig();
    let el: Rc<dyn ElementHandle> = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let relative_start = TriggerSpec::new(el.clone())
        .markers("+=100", "bottom top")
        .unwrap();
    assert!(matches!(
        r.tracker.register(relative_start, None).unwrap_err(),
        ScrubError::Marker(_)
    ));
    let zero_pin = PinSpec::new(Extent::Px(0.0));
    let zero_pin = TriggerSpec::new(el.clone()).pin(zero_pin);
    assert!(matches!(
        r.tracker.register(zero_pin, None).unwrap_err(),
        ScrubError::Config(_)
    ));
    let bad_spring = TriggerSpec::new(el).smoothing(Smoothing::Spring(SpringConfig {
        mass: -1.0,
        ..SpringConfig::default()
    }));
    assert!(r.tracker.register(bad_spring, None).is_err());
    assert!(r.tracker.is_empty());
}

#[test]
fn teardown_releases_elements_and_blocks_registration() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    let spec = absolute(el.clone(), 0.0, 10.0);
    r.tracker.register(spec, None).unwrap();
    assert_eq!(r.source.listener_count(), 1);
    r.tracker.teardown();
    assert_eq!(r.source.listener_count(), 0);
    assert!(r.tracker.is_empty());
    assert!(matches!(
        r.tracker.register(absolute(el, 0.0, 10.0), None).unwrap_err(),
        ScrubError::Lifecycle(_)
    ));
}

#[test]
fn viewport_changes_move_edge_markers() {
    let r = rig();
    let el = LayoutBox::new(Rect::new(0.0, 2000.0, 1000.0, 2400.0));
    let id = r.tracker.register(TriggerSpec::new(el), None).unwrap();
    let short = Viewport::new(1000.0, 400.0).unwrap();
    r.tracker.set_viewport(short).unwrap();
    r.frame_loop.tick(DT);
    assert_eq!(r.tracker.latest(id).unwrap().start, 1600.0);
    let flat = Viewport {
        width: 0.0,
        height: 1.0,
    };
    assert!(r.tracker.set_viewport(flat).is_err());
}
