//! Capture gallery synchronisation
//!
//! A load goes through three steps driven by the caller:
//! [`Gallery::begin_load`] shows the loader, [`Gallery::apply_listing`] turns
//! the filename list into thumbnail requests, and every finished request is
//! fed back through [`Gallery::apply_thumbnail`]. Thumbnails are staged off
//! screen and published together once the last one has settled, so the
//! visible gallery never shows a partially built set.
//!
//! Every load gets a ticket drawn from one process-wide counter. Answers for
//! any other ticket are dropped, so a slow response can never overwrite a
//! newer reload, not even one belonging to another patient's gallery.

use crate::api::{Backend, DeleteResponse};
use crate::config::UrlTemplate;
use crate::StationError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

pub const DELETED_MESSAGE: &str = "Image deleted";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete image";
pub const DELETE_COMMUNICATION_ERROR: &str = "Communication error while deleting";

/// Identifies one gallery load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// A thumbnail fetch the caller must perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub ticket: LoadTicket,
    pub index: usize,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailImage {
    Loaded(Arc<Vec<u8>>),
    /// The image request failed; the slot is still shown
    Broken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub filename: String,
    pub url: String,
    pub image: ThumbnailImage,
}

/// What the gallery container currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GalleryView {
    #[default]
    Idle,
    Loading,
    Empty,
    Unavailable(String),
    Ready(Vec<Thumbnail>),
}

#[derive(Debug)]
struct PendingReveal {
    ticket: LoadTicket,
    slots: Vec<Thumbnail>,
    settled: Vec<bool>,
    remaining: usize,
}

pub struct Gallery {
    cedula: String,
    template: UrlTemplate,
    current: Option<LoadTicket>,
    view: GalleryView,
    pending: Option<PendingReveal>,
}

impl Gallery {
    /// `template` is the fully resolved thumbnail URL template
    pub fn new(cedula: impl Into<String>, template: UrlTemplate) -> Self {
        Self {
            cedula: cedula.into(),
            template,
            current: None,
            view: GalleryView::Idle,
            pending: None,
        }
    }

    pub fn cedula(&self) -> &str {
        &self.cedula
    }

    pub fn view(&self) -> &GalleryView {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.view, GalleryView::Loading)
    }

    /// Thumbnail URL with a cache-busting timestamp
    pub fn thumbnail_url(&self, filename: &str, now_millis: i64) -> String {
        format!(
            "{}?t={}",
            self.template.render(&self.cedula, Some(filename)),
            now_millis
        )
    }

    /// Start a new load, superseding any load in flight
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = LoadTicket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed));
        self.current = Some(ticket);
        self.pending = None;
        self.view = GalleryView::Loading;
        debug!("Gallery load #{} started for {}", ticket.0, self.cedula);
        ticket
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        self.current == Some(ticket)
    }

    /// Handle the filename listing; returns the thumbnails to fetch
    pub fn apply_listing(
        &mut self,
        ticket: LoadTicket,
        files: Vec<String>,
        now_millis: i64,
    ) -> Vec<ThumbnailRequest> {
        if !self.is_current(ticket) {
            debug!("Dropping stale listing for load #{}", ticket.0);
            return Vec::new();
        }

        if files.is_empty() {
            self.view = GalleryView::Empty;
            return Vec::new();
        }

        let requests: Vec<ThumbnailRequest> = files
            .into_iter()
            .enumerate()
            .map(|(index, filename)| ThumbnailRequest {
                ticket,
                index,
                url: self.thumbnail_url(&filename, now_millis),
                filename,
            })
            .collect();

        let slots = requests
            .iter()
            .map(|r| Thumbnail {
                filename: r.filename.clone(),
                url: r.url.clone(),
                image: ThumbnailImage::Broken,
            })
            .collect();

        self.pending = Some(PendingReveal {
            ticket,
            slots,
            settled: vec![false; requests.len()],
            remaining: requests.len(),
        });

        requests
    }

    pub fn listing_failed(&mut self, ticket: LoadTicket, reason: &str) {
        if !self.is_current(ticket) {
            return;
        }
        warn!("Could not list captures for {}: {}", self.cedula, reason);
        self.pending = None;
        self.view = GalleryView::Unavailable("Could not load captures".to_string());
    }

    /// Record one finished thumbnail. Returns `true` when this completed the
    /// set and the gallery was revealed.
    pub fn apply_thumbnail(
        &mut self,
        ticket: LoadTicket,
        index: usize,
        image: Result<Vec<u8>, String>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        if pending.ticket != ticket || index >= pending.slots.len() || pending.settled[index] {
            return false;
        }

        let slot = &mut pending.slots[index];
        slot.image = match image {
            Ok(bytes) => ThumbnailImage::Loaded(Arc::new(bytes)),
            Err(reason) => {
                warn!("Thumbnail {} failed to load: {}", slot.filename, reason);
                ThumbnailImage::Broken
            }
        };
        pending.settled[index] = true;
        pending.remaining -= 1;

        if pending.remaining > 0 {
            return false;
        }

        if let Some(done) = self.pending.take() {
            debug!("Gallery load #{} revealed {} thumbnails", ticket.0, done.slots.len());
            self.view = GalleryView::Ready(done.slots);
        }
        true
    }
}

/// Result of a delete request, already mapped to what the user sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Rejected(String),
    CommunicationError,
}

impl DeleteOutcome {
    pub fn from_result(result: Result<DeleteResponse, StationError>) -> Self {
        match result {
            Ok(response) if response.success => DeleteOutcome::Deleted,
            Ok(response) => DeleteOutcome::Rejected(
                response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DELETE_FAILED_MESSAGE.to_string()),
            ),
            Err(e) => {
                warn!("Delete request failed: {}", e);
                DeleteOutcome::CommunicationError
            }
        }
    }

    /// Whether the gallery must be reloaded
    pub fn should_reload(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }

    pub fn message(&self) -> &str {
        match self {
            DeleteOutcome::Deleted => DELETED_MESSAGE,
            DeleteOutcome::Rejected(message) => message,
            DeleteOutcome::CommunicationError => DELETE_COMMUNICATION_ERROR,
        }
    }

    pub fn is_success(&self) -> bool {
        self.should_reload()
    }
}

pub async fn delete_capture(
    backend: Arc<dyn Backend>,
    cedula: String,
    filename: String,
) -> DeleteOutcome {
    DeleteOutcome::from_result(backend.delete_capture(&cedula, &filename).await)
}
