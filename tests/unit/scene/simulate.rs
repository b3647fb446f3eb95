use super::*;

const SCENE: &str = r#"{
  "engine": { "viewport": { "width": 1000, "height": 800 } },
  "elements": [
    { "name": "block", "rect": { "y": 1000, "width": 1000, "height": 400 },
      "start": "top top", "end": "+=400px",
      "pin": { "distance": "400px" } }
  ],
  "script": [
    { "frame": 2, "scroll_to": 1200 },
    { "frame": 4, "scroll_to": 2000 },
    { "frame": 6, "detach": { "element": "block" } }
  ],
  "simulation": { "frames": 8, "fps": 60 }
}"#;

fn scene() -> Scene {
    Scene::from_reader(SCENE.as_bytes()).unwrap()
}

#[test]
fn runs_scripted_frames() {
    let reports = simulate(&scene(), SimulationOptions::default()).unwrap();
    assert_eq!(reports.len(), 8);
    assert_eq!(reports[0].frame, 0);
    assert_eq!(reports[1].elements[0].frame.raw, 0.0);
    assert_eq!(reports[2].elements[0].frame.raw, 0.5);

    let enter: Vec<u64> = reports
        .iter()
        .filter(|r| !r.events.is_empty())
        .map(|r| r.frame)
        .collect();
    assert_eq!(enter, vec![2, 4]);
    assert_eq!(reports[2].events[0].element, "block");

    assert!(!reports[6].elements[0].frame.attached);
}

#[test]
fn options_override_scene_settings() {
    let reports = simulate(
        &scene(),
        SimulationOptions {
            frames: Some(3),
            fps: Some(30.0),
        },
    )
    .unwrap();
    assert_eq!(reports.len(), 3);
    assert!((reports[2].time - 0.1).abs() < 1e-12);
    assert!(
        simulate(
            &scene(),
            SimulationOptions {
                frames: None,
                fps: Some(-1.0),
            }
        )
        .is_err()
    );
}

#[test]
fn reports_serialize_as_json_objects() {
    let mut sim = Simulation::new(&scene(), SimulationOptions::default()).unwrap();
    let report = sim.step().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["elements"][0]["name"], "block");
    assert_eq!(json["elements"][0]["pin"]["state"], "idle");
    assert!(json.get("events").is_none());
    sim.finish();
}
