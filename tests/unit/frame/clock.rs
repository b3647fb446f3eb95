use super::*;

#[test]
fn subscribers_run_in_registration_order() {
    let fl = FrameLoop::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut disposers = Vec::new();
    for name in ["a", "b", "c"] {
        let log = Rc::clone(&log);
        disposers.push(
            fl.subscribe(move |t: &FrameTick| log.borrow_mut().push((name, t.frame.0)))
                .unwrap(),
        );
    }
    fl.tick(1.0 / 60.0);
    fl.tick(1.0 / 60.0);
    assert_eq!(
        *log.borrow(),
        vec![("a", 0), ("b", 0), ("c", 0), ("a", 1), ("b", 1), ("c", 1)]
    );
}

#[test]
fn subscriber_added_mid_tick_runs_next_tick() {
    let fl = FrameLoop::new();
    let late_runs = Rc::new(Cell::new(0));
    let added = Rc::new(Cell::new(false));
    let held = Rc::new(RefCell::new(Vec::new()));

    let fl2 = fl.clone();
    let (late_runs2, added2, held2) = (Rc::clone(&late_runs), Rc::clone(&added), Rc::clone(&held));
    let _outer = fl
        .subscribe(move |_| {
            if !added2.get() {
                added2.set(true);
                let late_runs = Rc::clone(&late_runs2);
                let d = fl2
                    .subscribe(move |_| late_runs.set(late_runs.get() + 1))
                    .unwrap();
                held2.borrow_mut().push(d);
            }
        })
        .unwrap();

    fl.tick(0.016);
    assert_eq!(late_runs.get(), 0);
    fl.tick(0.016);
    assert_eq!(late_runs.get(), 1);
}

#[test]
fn disposing_from_inside_own_callback_is_safe() {
    let fl = FrameLoop::new();
    let runs = Rc::new(Cell::new(0));
    let slot: Rc<RefCell<Option<Disposer>>> = Rc::new(RefCell::new(None));

    let (runs2, slot2) = (Rc::clone(&runs), Rc::clone(&slot));
    let d = fl
        .subscribe(move |_| {
            runs2.set(runs2.get() + 1);
            if let Some(mut d) = slot2.borrow_mut().take() {
                d.dispose();
            }
        })
        .unwrap();
    *slot.borrow_mut() = Some(d);

    fl.tick(0.016);
    fl.tick(0.016);
    assert_eq!(runs.get(), 1);
    assert_eq!(fl.subscriber_count(), 0);
}

#[test]
fn deltas_are_sanitized() {
    let fl = FrameLoop::with_max_frame_delta(0.05).unwrap();
    assert_eq!(fl.tick(1.0).dt, 0.05);
    assert_eq!(fl.tick(-1.0).dt, 0.0);
    assert_eq!(fl.tick(f64::NAN).dt, 0.0);
    assert_eq!(fl.time(), 0.05);
    assert!(FrameLoop::with_max_frame_delta(0.0).is_err());
}

#[test]
fn advance_to_derives_deltas_from_timestamps() {
    let fl = FrameLoop::new();
    assert_eq!(fl.advance_to(10.0).dt, 0.0);
    let t = fl.advance_to(10.02);
    assert!((t.dt - 0.02).abs() < 1e-12);
    assert_eq!(fl.advance_to(9.0).dt, 0.0);
}

#[test]
fn stop_releases_subscribers_and_rejects_new_ones() {
    let fl = FrameLoop::new();
    let runs = Rc::new(Cell::new(0));
    let r = Rc::clone(&runs);
    let _d = fl.subscribe(move |_| r.set(r.get() + 1)).unwrap();
    fl.tick(0.016);
    fl.stop();
    fl.tick(0.016);
    assert_eq!(runs.get(), 1);
    assert_eq!(fl.subscriber_count(), 0);
    let err = fl.subscribe(|_| {}).unwrap_err();
    assert!(matches!(err, ScrubError::Lifecycle(_)));
}
