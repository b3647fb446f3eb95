use super::*;
use crate::animation::ease::Ease;
use crate::foundation::core::Rect;
use crate::trigger::tracker::LayoutBox;

const DT: f64 = 1.0 / 60.0;

fn element() -> Rc<LayoutBox> {
    LayoutBox::new(Rect::new(0.0, 0.0, 100.0, 100.0))
}

#[test]
fn registration_disposer_unregisters() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let spec = TriggerSpec::new(element()).markers("@0", "@1000").unwrap();
    let mut reg = engine.track(spec).unwrap();
    engine.scroll_to(250.0);
    engine.tick(DT);
    assert_eq!(engine.latest(reg.id).unwrap().raw, 0.25);

    reg.disposer.dispose();
    assert!(engine.latest(reg.id).is_none());
    assert!(engine.tracker().is_empty());
}

#[test]
fn play_runs_sequence_and_releases_itself() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let mut seq = Sequence::with_defaults(0.5, Ease::Linear).unwrap();
    seq.then("opacity", 0.0, 1.0).unwrap();

    let frames = Rc::new(RefCell::new(Vec::new()));
    let f = Rc::clone(&frames);
    let _d = engine
        .play(seq, move |frame| f.borrow_mut().push(frame.clone()))
        .unwrap();
    let before = engine.frame_loop().subscriber_count();

    for _ in 0..40 {
        engine.tick(DT);
    }
    let frames = frames.borrow();
    let last = frames.last().unwrap();
    assert!(last.finished);
    assert_eq!(last.time, 0.5);
    assert_eq!(last.values[0].1, Value::Scalar(1.0));
    assert_eq!(frames.iter().filter(|f| f.finished).count(), 1);
    assert_eq!(engine.frame_loop().subscriber_count(), before - 1);
}

#[test]
fn play_disposer_stops_playback_early() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let mut seq = Sequence::new();
    seq.then("x", 0.0, 100.0).unwrap();
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    let mut d = engine.play(seq, move |_| c.set(c.get() + 1)).unwrap();
    engine.tick(DT);
    d.dispose();
    engine.tick(DT);
    assert_eq!(calls.get(), 1);
}

#[test]
fn teardown_is_ordered_and_final() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let released = Rc::new(Cell::new(false));
    let r = Rc::clone(&released);
    engine.adopt(Disposer::new(move || r.set(true)));
    let _reg = engine.track(TriggerSpec::new(element())).unwrap();

    engine.teardown();
    assert!(released.get());
    assert!(engine.tracker().is_torn_down());
    assert!(engine.scroll().is_torn_down());
    assert!(engine.frame_loop().is_stopped());
    assert!(matches!(
        engine.track(TriggerSpec::new(element())).unwrap_err(),
        ScrubError::Lifecycle(_)
    ));
    assert!(matches!(
        engine.play(Sequence::new(), |_| {}).unwrap_err(),
        ScrubError::Lifecycle(_)
    ));

    let late = Rc::new(Cell::new(false));
    let l = Rc::clone(&late);
    engine.adopt(Disposer::new(move || l.set(true)));
    assert!(late.get());
    engine.teardown();
}

#[test]
fn config_defaults_and_validation() {
    let cfg: EngineConfig =
        serde_json::from_str(r#"{"viewport":{"width":800,"height":600}}"#).unwrap();
    assert_eq!(cfg.viewport.height, 600.0);
    assert_eq!(cfg.max_frame_delta, DEFAULT_MAX_FRAME_DELTA);
    let bad = EngineConfig {
        viewport: Viewport {
            width: -1.0,
            height: 10.0,
        },
        ..EngineConfig::default()
    };
    assert!(Engine::new(bad).is_err());
}
