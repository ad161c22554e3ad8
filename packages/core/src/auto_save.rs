//! Debounced auto-save for threshold edits
//!
//! Slider edits are pushed into a channel; a background task forwards only
//! the last value of each burst once the channel has been quiet for the
//! configured delay. Writes are fire-and-forget: a write is spawned and never
//! awaited by the debounce loop, failures are only logged, and there is no
//! ordering guarantee between writes from different stations.

use crate::api::Backend;
use crate::{StationError, StationResult, Thresholds};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Configuration for auto-save behavior
#[derive(Debug, Clone)]
pub struct AutoSaveConfig {
    /// Quiet window before the last edit is written
    pub delay: Duration,
    /// Whether auto-save is enabled
    pub enabled: bool,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(120),
            enabled: true,
        }
    }
}

/// Collapse bursts from `rx` into single calls of `flush`.
///
/// Each received value restarts the quiet window; when the window elapses the
/// latest value is flushed. If the channel closes mid-burst the pending value
/// is still flushed before returning.
pub async fn debounce<T, F, Fut>(mut rx: mpsc::UnboundedReceiver<T>, delay: Duration, mut flush: F)
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ()>,
{
    while let Some(mut latest) = rx.recv().await {
        loop {
            match tokio::time::timeout(delay, rx.recv()).await {
                Ok(Some(next)) => latest = next,
                Ok(None) | Err(_) => break,
            }
        }
        flush(latest).await;
    }
}

/// Handle to the background auto-save task
#[derive(Debug, Clone)]
pub struct ThresholdAutoSave {
    tx: Option<mpsc::UnboundedSender<Thresholds>>,
}

impl ThresholdAutoSave {
    /// Spawn the debounce task on the current tokio runtime
    pub fn spawn(backend: Arc<dyn Backend>, config: AutoSaveConfig) -> StationResult<Self> {
        if !config.enabled {
            info!("Threshold auto-save disabled");
            return Ok(Self::disabled());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StationError::Task(format!("no runtime for auto-save: {}", e)))?;
        let (tx, rx) = mpsc::unbounded_channel();

        runtime.spawn(debounce(rx, config.delay, move |thresholds: Thresholds| {
            let backend = backend.clone();
            async move {
                tokio::spawn(async move {
                    match backend.save_thresholds(thresholds).await {
                        Ok(()) => debug!("Thresholds saved: {:?}", thresholds),
                        Err(e) => warn!("Threshold auto-save failed: {}", e),
                    }
                });
            }
        }));

        info!("Threshold auto-save started ({:?} debounce)", config.delay);
        Ok(Self { tx: Some(tx) })
    }

    /// A handle that drops every edit
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue the full threshold set; only the last of a burst is written
    pub fn schedule(&self, thresholds: Thresholds) {
        if let Some(tx) = &self.tx {
            if tx.send(thresholds).is_err() {
                warn!("Threshold auto-save task is gone, edit not saved");
            }
        }
    }
}
