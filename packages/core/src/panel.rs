//! Threshold ("knobs") panel state
//!
//! The panel keeps the slider values, their formatted readouts and its own
//! visibility. Visibility is a single cell; the root flag and the
//! accessibility flag are always derived from it by [`PanelVisibility::mirror`].

use crate::api::Backend;
use crate::{Readouts, StationResult, ThresholdField, Thresholds};
use std::sync::Arc;
use tracing::debug;

pub const RESET_FAILED_MESSAGE: &str = "Could not restore thresholds";

/// Keys the panel reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKey {
    Character(char),
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: PanelKey,
    pub shift: bool,
    /// Focus is inside a text-entry control
    pub typing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key changed visibility and must not reach other handlers
    Handled { visible: bool },
    Ignored,
}

/// Render state derived from visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelMirror {
    /// Root-level "knobs visible" state
    pub root_visible: bool,
    /// Panel hidden from assistive technology
    pub aria_hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelVisibility {
    visible: bool,
}

impl PanelVisibility {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set(&mut self, visible: bool) -> PanelMirror {
        if self.visible != visible {
            debug!("Threshold panel {}", if visible { "shown" } else { "hidden" });
        }
        self.visible = visible;
        self.mirror()
    }

    pub fn mirror(&self) -> PanelMirror {
        PanelMirror {
            root_visible: self.visible,
            aria_hidden: !self.visible,
        }
    }

    /// Shift+K toggles unless typing; Escape closes regardless of focus
    pub fn handle_key(&mut self, press: KeyPress) -> KeyOutcome {
        match press.key {
            PanelKey::Character(c) if press.shift && c.eq_ignore_ascii_case(&'k') => {
                if press.typing {
                    KeyOutcome::Ignored
                } else {
                    let visible = !self.visible;
                    self.set(visible);
                    KeyOutcome::Handled { visible }
                }
            }
            PanelKey::Escape if self.visible => {
                self.set(false);
                KeyOutcome::Handled { visible: false }
            }
            _ => KeyOutcome::Ignored,
        }
    }
}

/// Slider values plus readouts
#[derive(Debug, Clone, PartialEq)]
pub struct KnobsState {
    values: Thresholds,
    readouts: Readouts,
    visibility: PanelVisibility,
}

impl Default for KnobsState {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl KnobsState {
    pub fn new(values: Thresholds) -> Self {
        Self {
            values,
            readouts: values.readouts(),
            visibility: PanelVisibility::default(),
        }
    }

    pub fn values(&self) -> Thresholds {
        self.values
    }

    pub fn readouts(&self) -> &Readouts {
        &self.readouts
    }

    pub fn visibility(&self) -> &PanelVisibility {
        &self.visibility
    }

    pub fn visibility_mut(&mut self) -> &mut PanelVisibility {
        &mut self.visibility
    }

    /// Overwrite controls and readouts with server values
    pub fn apply(&mut self, values: Thresholds) {
        self.values = values;
        self.readouts = values.readouts();
    }

    /// A user edit; readouts update immediately and the full set to push is
    /// returned
    pub fn edit(&mut self, field: ThresholdField, value: f64) -> Thresholds {
        self.values.set(field, value);
        self.readouts = self.values.readouts();
        self.values
    }
}

pub async fn load_thresholds(backend: Arc<dyn Backend>) -> StationResult<Thresholds> {
    backend.get_thresholds().await
}

pub async fn reset_thresholds(backend: Arc<dyn Backend>) -> StationResult<Thresholds> {
    backend.reset_thresholds().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: PanelKey, shift: bool, typing: bool) -> KeyPress {
        KeyPress { key, shift, typing }
    }

    #[test]
    fn test_hidden_by_default() {
        let v = PanelVisibility::default();
        assert!(!v.is_visible());
        assert_eq!(
            v.mirror(),
            PanelMirror {
                root_visible: false,
                aria_hidden: true
            }
        );
    }

    #[test]
    fn test_shift_k_toggles_either_case() {
        let mut v = PanelVisibility::default();
        assert_eq!(
            v.handle_key(press(PanelKey::Character('K'), true, false)),
            KeyOutcome::Handled { visible: true }
        );
        assert!(v.mirror().root_visible);
        assert!(!v.mirror().aria_hidden);
        assert_eq!(
            v.handle_key(press(PanelKey::Character('k'), true, false)),
            KeyOutcome::Handled { visible: false }
        );
    }

    #[test]
    fn test_plain_k_ignored() {
        let mut v = PanelVisibility::default();
        assert_eq!(
            v.handle_key(press(PanelKey::Character('k'), false, false)),
            KeyOutcome::Ignored
        );
        assert!(!v.is_visible());
    }

    #[test]
    fn test_shift_k_ignored_while_typing() {
        let mut v = PanelVisibility::default();
        assert_eq!(
            v.handle_key(press(PanelKey::Character('K'), true, true)),
            KeyOutcome::Ignored
        );
        assert!(!v.is_visible());
    }

    #[test]
    fn test_escape_closes_regardless_of_focus() {
        let mut v = PanelVisibility::default();
        v.set(true);
        assert_eq!(
            v.handle_key(press(PanelKey::Escape, false, true)),
            KeyOutcome::Handled { visible: false }
        );
        assert!(!v.is_visible());
        assert_eq!(
            v.handle_key(press(PanelKey::Escape, false, false)),
            KeyOutcome::Ignored
        );
    }

    #[test]
    fn test_edit_updates_readouts_immediately() {
        let mut knobs = KnobsState::default();
        let pushed = knobs.edit(ThresholdField::Confidence, 0.555);
        assert_eq!(pushed.conf_th, 0.555);
        assert_eq!(pushed.iou_th, 0.50);
        assert_eq!(knobs.readouts().conf_th, "0.56");
    }

    #[test]
    fn test_apply_overwrites_everything() {
        let mut knobs = KnobsState::default();
        knobs.edit(ThresholdField::Iou, 0.9);
        knobs.apply(Thresholds {
            conf_th: 0.3,
            iou_th: 0.5,
            min_box_frac: 0.0031,
        });
        assert_eq!(knobs.values(), Thresholds {
            conf_th: 0.3,
            iou_th: 0.5,
            min_box_frac: 0.0031,
        });
        assert_eq!(knobs.readouts().get(ThresholdField::Iou), "0.50");
        assert_eq!(knobs.readouts().get(ThresholdField::MinBoxFraction), "0.003");
    }
}
