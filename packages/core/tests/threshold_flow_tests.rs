//! Threshold panel flows: debounced auto-save, load and reset

mod common;

use common::{Call, MockBackend};
use evidence_core::panel::{load_thresholds, reset_thresholds};
use evidence_core::{AutoSaveConfig, KnobsState, ThresholdAutoSave, ThresholdField, Thresholds};
use std::sync::Arc;
use std::time::Duration;

fn saves(backend: &MockBackend) -> Vec<Thresholds> {
    backend
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::SaveThresholds(t) => Some(t),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_produce_one_write_with_last_values() {
    let backend = Arc::new(MockBackend::new());
    let auto_save = ThresholdAutoSave::spawn(backend.clone(), AutoSaveConfig::default()).unwrap();
    let mut knobs = KnobsState::default();

    for (i, value) in [0.31, 0.35, 0.42, 0.47].into_iter().enumerate() {
        let pushed = knobs.edit(ThresholdField::Confidence, value);
        assert_eq!(knobs.readouts().conf_th, format!("{:.2}", value));
        auto_save.schedule(pushed);
        if i < 3 {
            tokio::time::sleep(Duration::from_millis(60)).await;
        }
    }
    let last = knobs.edit(ThresholdField::MinBoxFraction, 0.004);
    auto_save.schedule(last);

    tokio::time::sleep(Duration::from_millis(500)).await;

    let written = saves(&backend);
    assert_eq!(written.len(), 1);
    assert_eq!(
        written[0],
        Thresholds {
            conf_th: 0.47,
            iou_th: 0.50,
            min_box_frac: 0.004,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_quiet_gap_allows_second_write() {
    let backend = Arc::new(MockBackend::new());
    let auto_save = ThresholdAutoSave::spawn(backend.clone(), AutoSaveConfig::default()).unwrap();
    let mut knobs = KnobsState::default();

    auto_save.schedule(knobs.edit(ThresholdField::Iou, 0.6));
    tokio::time::sleep(Duration::from_millis(200)).await;
    auto_save.schedule(knobs.edit(ThresholdField::Iou, 0.7));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let written = saves(&backend);
    assert_eq!(written.len(), 2);
    assert_eq!(written[1].iou_th, 0.7);
}

#[tokio::test]
async fn test_load_then_reset_overwrites_display() {
    let backend = Arc::new(MockBackend::new());
    *backend.thresholds.lock().unwrap() = Thresholds {
        conf_th: 0.61,
        iou_th: 0.42,
        min_box_frac: 0.0125,
    };

    let mut knobs = KnobsState::default();
    knobs.apply(load_thresholds(backend.clone()).await.unwrap());
    assert_eq!(knobs.readouts().conf_th, "0.61");
    assert_eq!(knobs.readouts().min_box_frac, "0.013");

    knobs.edit(ThresholdField::Iou, 0.99);
    knobs.apply(reset_thresholds(backend.clone()).await.unwrap());

    assert_eq!(knobs.values(), Thresholds::default());
    let r = knobs.readouts();
    assert_eq!(
        (r.conf_th.as_str(), r.iou_th.as_str(), r.min_box_frac.as_str()),
        ("0.30", "0.50", "0.003")
    );
    assert!(backend.calls().contains(&Call::ResetThresholds));
}
