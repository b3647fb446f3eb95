use super::*;

const DT: f64 = 0.1;

fn linear(targets: usize, toggle: RevealToggle) -> RevealGroup {
    RevealGroup::new(RevealSpec {
        targets,
        stagger: Stagger::new(0.5, StaggerOrder::Forward),
        duration: 1.0,
        ease: Ease::Linear,
        toggle,
    })
    .unwrap()
}

#[test]
fn nothing_plays_before_start_is_reached() {
    let mut g = linear(3, RevealToggle::Once);
    for _ in 0..5 {
        let f = g.update(Some(false), DT);
        assert_eq!(f.progress, vec![0.0, 0.0, 0.0]);
    }
}

#[test]
fn items_follow_their_stagger_delays() {
    let mut g = linear(3, RevealToggle::Once);
    assert_eq!(g.delays(), &[0.0, 0.5, 1.0]);
    assert_eq!(g.total_duration(), 2.0);
    let mut frame = g.update(Some(true), 0.0);
    for _ in 0..10 {
        frame = g.update(Some(true), DT);
    }
    assert!((frame.playhead - 1.0).abs() < 1e-9);
    assert!((frame.progress[0] - 1.0).abs() < 1e-9);
    assert!((frame.progress[1] - 0.5).abs() < 1e-9);
    assert_eq!(frame.progress[2], 0.0);
}

#[test]
fn once_keeps_playing_after_scrolling_back() {
    let mut g = linear(2, RevealToggle::Once);
    g.update(Some(true), DT);
    for _ in 0..30 {
        g.update(Some(false), DT);
    }
    let f = g.update(Some(false), DT);
    assert_eq!(f.playhead, 1.5);
    assert_eq!(f.progress, vec![1.0, 1.0]);
}

#[test]
fn reverse_rewinds_before_start() {
    let mut g = linear(2, RevealToggle::Reverse);
    for _ in 0..5 {
        g.update(Some(true), DT);
    }
    for _ in 0..10 {
        g.update(Some(false), DT);
    }
    let f = g.update(Some(false), DT);
    assert_eq!(f.playhead, 0.0);
    assert_eq!(f.progress, vec![0.0, 0.0]);
}

#[test]
fn unknown_geometry_holds_the_playhead() {
    let mut g = linear(1, RevealToggle::Reverse);
    let before = g.update(Some(true), DT).playhead;
    assert_eq!(g.update(None, DT).playhead, before);
}

#[test]
fn invalid_specs_are_rejected() {
    assert!(RevealGroup::new(RevealSpec::new(0)).is_err());
    let mut spec = RevealSpec::new(3);
    spec.duration = f64::NAN;
    assert!(RevealGroup::new(spec).is_err());
    let mut spec = RevealSpec::new(3);
    spec.stagger.base_delay = -0.1;
    assert!(RevealGroup::new(spec).is_err());
}

#[test]
fn spec_defaults_deserialize() {
    let spec: RevealSpec = serde_json::from_str(r#"{"targets":4}"#).unwrap();
    assert_eq!(spec, RevealSpec::new(4));
}
