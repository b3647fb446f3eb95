use super::*;

#[test]
fn forward_and_reverse() {
    let s = Stagger::new(0.1, StaggerOrder::Forward);
    let d = s.schedule(4);
    assert_eq!(d.len(), 4);
    assert!((d[3] - 0.3).abs() < 1e-12);
    assert_eq!(d[0], 0.0);

    let r = schedule(4, &Stagger::new(0.1, StaggerOrder::Reverse));
    assert_eq!(r[3], 0.0);
    assert!((r[0] - 0.3).abs() < 1e-12);
}

#[test]
fn from_center_is_symmetric_for_odd_counts() {
    let d = schedule(5, &Stagger::new(0.02, StaggerOrder::FromCenter));
    let min = d.iter().cloned().fold(f64::INFINITY, f64::min);
    assert_eq!(d[2], min);
    assert_eq!(d[2], 0.0);
    assert_eq!(d[0], d[4]);
    assert_eq!(d[1], d[3]);
    assert!(d[1] < d[0]);
}

#[test]
fn from_center_uses_lower_middle_for_even_counts() {
    let d = schedule(4, &Stagger::new(1.0, StaggerOrder::FromCenter));
    assert_eq!(d, vec![1.0, 0.0, 1.0, 2.0]);
}

#[test]
fn from_index_clamps_past_the_end() {
    let d = schedule(3, &Stagger::new(1.0, StaggerOrder::FromIndex(10)));
    assert_eq!(d, vec![2.0, 1.0, 0.0]);
}

#[test]
fn empty_and_single_groups() {
    assert!(schedule(0, &Stagger::new(1.0, StaggerOrder::FromCenter)).is_empty());
    assert_eq!(
        schedule(1, &Stagger::new(1.0, StaggerOrder::Reverse)),
        vec![0.0]
    );
}

#[test]
fn negative_delay_is_rejected() {
    let forward = |each| Stagger::new(each, StaggerOrder::Forward);
    assert!(forward(-0.1).validate().is_err());
    assert!(forward(f64::NAN).validate().is_err());
    assert!(forward(0.0).validate().is_ok());
}
