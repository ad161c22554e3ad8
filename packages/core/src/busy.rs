//! Per-control loading indicators

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Control {
    Capture,
    Register,
    ResetThresholds,
    /// Delete button of one thumbnail
    Delete(String),
    Download(String),
}

/// Controls currently showing a spinner
#[derive(Debug, Clone, Default)]
pub struct BusyControls {
    active: HashSet<Control>,
}

impl BusyControls {
    /// Mark a control as loading. Returns `false` if it already was.
    pub fn start(&mut self, control: Control) -> bool {
        self.active.insert(control)
    }

    /// Restore a control; called on every completion path
    pub fn finish(&mut self, control: &Control) {
        self.active.remove(control);
    }

    pub fn is_busy(&self, control: &Control) -> bool {
        self.active.contains(control)
    }

    pub fn is_deleting(&self, filename: &str) -> bool {
        self.active.contains(&Control::Delete(filename.to_string()))
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}
