//! Thumbnail grid for a patient's captures
//!
//! The grid mirrors a [`GalleryView`] but holds decoded image handles, built
//! once when the gallery is revealed rather than on every redraw. The panel
//! starts collapsed; loading continues in the background while it is hidden.

use crate::button::{danger_button, secondary_button};
use evidence_core::{BusyControls, GalleryView, ThumbnailImage};
use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

const TILE_WIDTH: f32 = 180.0;
const TILE_HEIGHT: f32 = 135.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryMessage {
    Delete(String),
    Refresh,
    ToggleVisible,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub filename: String,
    /// `None` when the image failed to load
    pub handle: Option<Handle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum GridState {
    #[default]
    Idle,
    Loading,
    Empty,
    Unavailable(String),
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct GalleryGrid {
    state: GridState,
    tiles: Vec<Tile>,
    visible: bool,
}

impl GalleryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the gallery state. Tiles are replaced only on reveal.
    pub fn sync(&mut self, view: &GalleryView) {
        self.state = match view {
            GalleryView::Idle => GridState::Idle,
            GalleryView::Loading => GridState::Loading,
            GalleryView::Empty => GridState::Empty,
            GalleryView::Unavailable(reason) => GridState::Unavailable(reason.clone()),
            GalleryView::Ready(thumbnails) => {
                self.tiles = thumbnails
                    .iter()
                    .map(|thumb| Tile {
                        filename: thumb.filename.clone(),
                        handle: match &thumb.image {
                            ThumbnailImage::Loaded(bytes) => {
                                Some(Handle::from_memory(bytes.as_ref().clone()))
                            }
                            ThumbnailImage::Broken => None,
                        },
                    })
                    .collect();
                GridState::Ready
            }
        };
        if self.state != GridState::Ready {
            self.tiles.clear();
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_loading(&self) -> bool {
        self.state == GridState::Loading
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn view<'a>(&'a self, busy: &'a BusyControls) -> Element<'a, GalleryMessage> {
        let toggle_label = if self.visible {
            "Hide gallery"
        } else {
            "Show gallery"
        };
        let mut header = row![
            text("Captures").size(18),
            Space::with_width(Length::Fill),
        ]
        .spacing(8)
        .align_items(Alignment::Center);
        if self.visible {
            header = header.push(
                button(text("Refresh").size(12))
                    .padding([6, 12])
                    .style(iced::theme::Button::Text)
                    .on_press(GalleryMessage::Refresh),
            );
        }
        header = header.push(secondary_button(toggle_label).on_press(GalleryMessage::ToggleVisible));

        if !self.visible {
            return header.into();
        }

        let body: Element<'a, GalleryMessage> = match &self.state {
            GridState::Idle => Space::with_height(0).into(),
            GridState::Loading => status_text("Loading captures..."),
            GridState::Empty => status_text("No captures yet for this patient"),
            GridState::Unavailable(reason) => status_text(reason),
            GridState::Ready => {
                let tiles: Vec<Element<'a, GalleryMessage>> = self
                    .tiles
                    .iter()
                    .map(|tile| tile_view(tile, busy.is_deleting(&tile.filename)))
                    .collect();
                Wrap::with_elements(tiles)
                    .spacing(12.0)
                    .line_spacing(12.0)
                    .into()
            }
        };

        column![header, body].spacing(12).into()
    }
}

fn status_text<'a>(message: &str) -> Element<'a, GalleryMessage> {
    text(message)
        .size(14)
        .style(iced::theme::Text::Color(iced::Color::from_rgb(
            0.6, 0.6, 0.6,
        )))
        .into()
}

fn tile_view(tile: &Tile, deleting: bool) -> Element<'_, GalleryMessage> {
    let picture: Element<'_, GalleryMessage> = match &tile.handle {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fixed(TILE_WIDTH))
            .height(Length::Fixed(TILE_HEIGHT))
            .into(),
        None => container(text("Image unavailable").size(12))
            .width(Length::Fixed(TILE_WIDTH))
            .height(Length::Fixed(TILE_HEIGHT))
            .center_x()
            .center_y()
            .style(iced::theme::Container::Box)
            .into(),
    };

    let delete = if deleting {
        button(text("Deleting...").size(12)).style(iced::theme::Button::Secondary)
    } else {
        danger_button("Delete").on_press(GalleryMessage::Delete(tile.filename.clone()))
    };

    column![picture, text(&tile.filename).size(11), delete]
        .spacing(4)
        .width(Length::Fixed(TILE_WIDTH))
        .into()
}
