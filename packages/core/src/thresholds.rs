//! Detection thresholds ("knobs") shared with the inference backend

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Confidence threshold
    pub conf_th: f64,
    /// Intersection-over-union threshold
    pub iou_th: f64,
    /// Minimum bounding-box area as a fraction of the frame
    pub min_box_frac: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            conf_th: 0.30,
            iou_th: 0.50,
            min_box_frac: 0.003,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdField {
    Confidence,
    Iou,
    MinBoxFraction,
}

impl ThresholdField {
    pub const ALL: [ThresholdField; 3] = [
        ThresholdField::Confidence,
        ThresholdField::Iou,
        ThresholdField::MinBoxFraction,
    ];

    /// Wire name of the field
    pub fn key(self) -> &'static str {
        match self {
            ThresholdField::Confidence => "conf_th",
            ThresholdField::Iou => "iou_th",
            ThresholdField::MinBoxFraction => "min_box_frac",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThresholdField::Confidence => "Confidence",
            ThresholdField::Iou => "IoU",
            ThresholdField::MinBoxFraction => "Min box fraction",
        }
    }

    /// Decimal places shown in the readout
    pub fn decimals(self) -> usize {
        match self {
            ThresholdField::Confidence | ThresholdField::Iou => 2,
            ThresholdField::MinBoxFraction => 3,
        }
    }

    /// Bounds enforced by the slider widget, not by this crate
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            ThresholdField::Confidence | ThresholdField::Iou => 0.0..=1.0,
            ThresholdField::MinBoxFraction => 0.0..=0.05,
        }
    }

    pub fn step(self) -> f64 {
        match self {
            ThresholdField::Confidence | ThresholdField::Iou => 0.01,
            ThresholdField::MinBoxFraction => 0.001,
        }
    }
}

impl std::fmt::Display for ThresholdField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Thresholds {
    pub fn get(&self, field: ThresholdField) -> f64 {
        match field {
            ThresholdField::Confidence => self.conf_th,
            ThresholdField::Iou => self.iou_th,
            ThresholdField::MinBoxFraction => self.min_box_frac,
        }
    }

    pub fn set(&mut self, field: ThresholdField, value: f64) {
        match field {
            ThresholdField::Confidence => self.conf_th = value,
            ThresholdField::Iou => self.iou_th = value,
            ThresholdField::MinBoxFraction => self.min_box_frac = value,
        }
    }

    /// Fixed-point text for one field
    pub fn readout(&self, field: ThresholdField) -> String {
        format!("{:.*}", field.decimals(), self.get(field))
    }

    pub fn readouts(&self) -> Readouts {
        Readouts {
            conf_th: self.readout(ThresholdField::Confidence),
            iou_th: self.readout(ThresholdField::Iou),
            min_box_frac: self.readout(ThresholdField::MinBoxFraction),
        }
    }
}

/// Formatted text shown next to each slider
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Readouts {
    pub conf_th: String,
    pub iou_th: String,
    pub min_box_frac: String,
}

impl Readouts {
    pub fn get(&self, field: ThresholdField) -> &str {
        match field {
            ThresholdField::Confidence => &self.conf_th,
            ThresholdField::Iou => &self.iou_th,
            ThresholdField::MinBoxFraction => &self.min_box_frac,
        }
    }
}
