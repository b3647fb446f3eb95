use super::*;

fn vp() -> Viewport {
    Viewport::new(1000.0, 800.0).unwrap()
}

#[test]
fn parses_edge_markers() {
    let m: Marker = "top 92%".parse().unwrap();
    assert_eq!(
        m,
        Marker::Edge {
            element: Anchor::Fraction(0.0),
            viewport: Anchor::Fraction(0.92),
        }
    );
    let m: Marker = "start end".parse().unwrap();
    assert_eq!(m, Marker::default_start());
    assert_eq!(DEFAULT_START.parse::<Marker>().unwrap(), Marker::default_start());
    assert_eq!(DEFAULT_END.parse::<Marker>().unwrap(), Marker::default_end());
    let m: Marker = "center 100px".parse().unwrap();
    assert_eq!(
        m,
        Marker::Edge {
            element: Anchor::Fraction(0.5),
            viewport: Anchor::Pixels(100.0),
        }
    );
}

#[test]
fn parses_absolute_and_relative_markers() {
    assert_eq!("@1200".parse::<Marker>().unwrap(), Marker::Absolute(1200.0));
    assert_eq!(
        "+=100%".parse::<Marker>().unwrap(),
        Marker::Relative(Extent::Percent(100.0))
    );
    assert_eq!(
        "+=400px".parse::<Marker>().unwrap(),
        Marker::Relative(Extent::Px(400.0))
    );
    assert_eq!(
        "+=250".parse::<Marker>().unwrap(),
        Marker::Relative(Extent::Px(250.0))
    );
}

#[test]
fn rejects_malformed_markers() {
    for bad in ["", "top", "top bottom left", "middle top", "top 12q", "@x", "+=", "@inf"] {
        let err = bad.parse::<Marker>().unwrap_err();
        assert!(matches!(err, ScrubError::Marker(_)), "{bad:?}: {err}");
    }
}

#[test]
fn edge_marker_resolves_element_line_against_viewport_line() {
    let bounds = Rect::new(0.0, 2000.0, 1000.0, 2400.0);
    assert_eq!(Marker::default_start().offset(bounds, vp(), 0.0), 1200.0);
    assert_eq!(Marker::default_end().offset(bounds, vp(), 0.0), 2400.0);
    let top_top: Marker = "top top".parse().unwrap();
    assert_eq!(top_top.offset(bounds, vp(), 0.0), 2000.0);
}

#[test]
fn relative_marker_is_measured_from_start() {
    let bounds = Rect::new(0.0, 500.0, 1000.0, 900.0);
    let end: Marker = "+=100%".parse().unwrap();
    assert_eq!(end.offset(bounds, vp(), 500.0), 1300.0);
    assert!(matches!(
        end.resolve_start(bounds, vp()).unwrap_err(),
        ScrubError::Marker(_)
    ));
}

#[test]
fn progress_is_clamped_and_steps_on_empty_range() {
    assert_eq!(raw_progress(2500.0, 0.0, 5000.0), 0.5);
    assert_eq!(raw_progress(-10.0, 0.0, 5000.0), 0.0);
    assert_eq!(raw_progress(9000.0, 0.0, 5000.0), 1.0);
    assert_eq!(raw_progress(f64::NAN, 0.0, 5000.0), 0.0);
    assert_eq!(raw_progress(99.0, 100.0, 100.0), 0.0);
    assert_eq!(raw_progress(100.0, 100.0, 100.0), 1.0);
    assert_eq!(raw_progress(100.0, 100.0, 50.0), 1.0);
}

#[test]
fn markers_deserialize_from_strings() {
    let m: Marker = serde_json::from_str("\"top top\"").unwrap();
    assert_eq!(m.to_string(), "top top");
    assert!(serde_json::from_str::<Marker>("\"sideways\"").is_err());
}

#[test]
fn named_anchors_display_by_name() {
    assert_eq!(Anchor::Fraction(0.5).to_string(), "center");
    assert_eq!(Anchor::Fraction(1.0).to_string(), "bottom");
    assert_eq!(Anchor::Fraction(0.25).to_string(), "25%");
    assert_eq!(Anchor::Pixels(120.0).to_string(), "120px");
}
