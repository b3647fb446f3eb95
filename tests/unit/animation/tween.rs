use super::*;

#[test]
fn tween_respects_delay_and_duration() {
    let t = Tween::new(0.0, 10.0, 2.0).with_delay(1.0);
    assert_eq!(t.sample(0.5), 0.0);
    assert_eq!(t.sample(2.0), 5.0);
    assert_eq!(t.sample(10.0), 10.0);
    assert_eq!(t.end_time(), 3.0);
}

#[test]
fn zero_duration_tween_jumps_once_started() {
    let t = Tween::new(1.0, 2.0, 0.0).with_delay(0.5);
    assert_eq!(t.sample(0.49), 1.0);
    assert_eq!(t.sample(0.5), 2.0);
}

#[test]
fn tween_validation() {
    assert!(Tween::new(0.0, 1.0, -1.0).validate().is_err());
    let nan_delay = Tween::new(0.0, 1.0, 1.0).with_delay(f64::NAN);
    assert!(nan_delay.validate().is_err());
    assert!(Tween::new(0.0, 1.0, 1.0).validate().is_ok());
}

#[test]
fn glide_never_passes_target_and_retargets_from_current() {
    let mut g = Glide::new(0.0, 100.0, 1.0, Ease::ElasticOut);
    for _ in 0..130 {
        let v = g.advance(1.0 / 120.0);
        assert!((0.0..=100.0).contains(&v));
    }
    assert!(g.is_done());
    assert_eq!(g.value(), 100.0);

    let mut g = Glide::new(0.0, 100.0, 1.0, Ease::Linear);
    g.advance(0.5);
    g.retarget(0.0);
    assert_eq!(g.value(), 50.0);
    assert_eq!(g.target(), 0.0);
    assert_eq!(g.advance(0.5), 25.0);
}

#[test]
fn sequence_places_entries_by_position() {
    let mut seq = Sequence::with_defaults(1.0, Ease::Linear).unwrap();
    seq.then("opacity", 0.0, 1.0)
        .unwrap()
        .then("y", 50.0, 0.0)
        .unwrap()
        .add(
            "scale",
            Tween::new(Value::Scalar(0.5), Value::Scalar(1.0), 1.0),
            Position::With,
        )
        .unwrap()
        .add(
            "border",
            Tween::new(Value::Scalar(0.0), Value::Scalar(1.0), 0.5),
            Position::Offset(-0.5),
        )
        .unwrap();

    assert_eq!(seq.len(), 4);
    assert_eq!(seq.duration(), 2.0);

    let at = |t: f64| seq.sample(t);
    let v = at(0.5);
    assert_eq!(v[0], ("opacity".to_owned(), Value::Scalar(0.5)));
    // `y` has not started yet and holds its from-value.
    assert_eq!(v[1], ("y".to_owned(), Value::Scalar(50.0)));
    assert_eq!(v[2], ("scale".to_owned(), Value::Scalar(0.5)));

    let v = at(1.5);
    assert_eq!(v[1].1, Value::Scalar(25.0));
    assert_eq!(v[2].1, Value::Scalar(0.75));
    assert_eq!(v[3].1, Value::Scalar(0.0));

    let v = at(2.0);
    assert_eq!(v[0].1, Value::Scalar(1.0));
    assert_eq!(v[3].1, Value::Scalar(1.0));
}

#[test]
fn later_entries_override_a_property_once_started() {
    let mut seq = Sequence::new();
    seq.add(
        "x",
        Tween::new(Value::Scalar(0.0), Value::Scalar(10.0), 1.0),
        Position::At(0.0),
    )
    .unwrap()
    .add(
        "x",
        Tween::new(Value::Scalar(10.0), Value::Scalar(0.0), 1.0),
        Position::After,
    )
    .unwrap();
    assert_eq!(seq.sample(0.5)[0].1, Value::Scalar(5.0));
    assert_eq!(seq.sample(1.5)[0].1, Value::Scalar(5.0));
    assert_eq!(seq.sample(2.5)[0].1, Value::Scalar(0.0));
}

#[test]
fn with_and_at_use_sequence_defaults() {
    let mut seq = Sequence::with_defaults(1.2, Ease::OutExpo).unwrap();
    seq.then("title", 0.0, 1.0)
        .unwrap()
        .with("subtitle", 0.0, 1.0)
        .unwrap()
        .at(3.0, "cta", 0.0, 1.0)
        .unwrap();
    assert!((seq.duration() - 4.2).abs() < 1e-12);
    let v = seq.sample(0.6);
    assert_eq!(v[0].1, v[1].1);
    assert_eq!(v[2].1, Value::Scalar(0.0));
}

#[test]
fn latest_started_entry_wins_regardless_of_insertion_order() {
    let mut seq = Sequence::new();
    seq.add(
        "x",
        Tween::new(Value::Scalar(100.0), Value::Scalar(200.0), 1.0),
        Position::At(1.0),
    )
    .unwrap()
    .add(
        "x",
        Tween::new(Value::Scalar(0.0), Value::Scalar(1.0), 1.0),
        Position::At(0.0),
    )
    .unwrap();
    assert_eq!(seq.sample(0.5)[0].1, Value::Scalar(0.5));
    assert_eq!(seq.sample(1.5)[0].1, Value::Scalar(150.0));
    assert_eq!(seq.sample(2.0)[0].1, Value::Scalar(200.0));
}

#[test]
fn unstarted_property_holds_earliest_from_value() {
    let mut seq = Sequence::new();
    seq.add(
        "y",
        Tween::new(Value::Scalar(7.0), Value::Scalar(8.0), 1.0),
        Position::At(3.0),
    )
    .unwrap()
    .add(
        "y",
        Tween::new(Value::Scalar(3.0), Value::Scalar(4.0), 1.0),
        Position::At(2.0),
    )
    .unwrap();
    assert_eq!(seq.sample(1.0)[0].1, Value::Scalar(3.0));
}
