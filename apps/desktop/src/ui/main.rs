//! Main UI views for each page

use super::toolbar::toolbar_view;
use crate::app::{Message, Page, StationApp};
use evidence_core::Control;
use evidence_ui::{loading_button, patient_table_view, toast_stack};
use iced::widget::image::Image;
use iced::{
    widget::{checkbox, column, container, row, scrollable, text, Space},
    Alignment, Element, Length,
};

pub fn main_view(app: &StationApp) -> Element<'_, Message> {
    let content: Element<Message> = match app.page {
        Page::History => history_view(app),
        Page::Register => register_view(app),
        Page::Camera => camera_view(app),
    };

    let toasts = toast_stack(app.notifier.active()).map(Message::Toast);

    container(column![toolbar_view(app), toasts, content].spacing(16))
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(20)
        .into()
}

fn history_view(app: &StationApp) -> Element<'_, Message> {
    let table = patient_table_view(&app.patients, &app.busy).map(Message::PatientTable);

    if app.patients_loading && app.patients.data_rows().is_empty() {
        column![
            text("Loading patients...")
                .size(14)
                .style(iced::theme::Text::Color(iced::Color::from_rgb(
                    0.6, 0.6, 0.6,
                ))),
            table,
        ]
        .spacing(12)
        .into()
    } else {
        table
    }
}

fn register_view(app: &StationApp) -> Element<'_, Message> {
    let form = app
        .registration
        .view(app.busy.is_busy(&Control::Register))
        .map(Message::Registration);

    container(form)
        .width(Length::Fill)
        .center_x()
        .into()
}

fn camera_view(app: &StationApp) -> Element<'_, Message> {
    let feed: Element<Message> = match &app.preview {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fixed(640.0))
            .height(Length::Fixed(480.0))
            .into(),
        None => container(text("Waiting for the live feed...").size(14))
            .width(Length::Fixed(640.0))
            .height(Length::Fixed(480.0))
            .center_x()
            .center_y()
            .style(iced::theme::Container::Box)
            .into(),
    };

    let controls = row![
        loading_button(
            "Capture",
            "Capturing...",
            app.busy.is_busy(&Control::Capture),
            Message::Capture
        )
        .padding([10, 20]),
        Space::with_width(12),
        checkbox("Show predictions", app.predictions_enabled)
            .on_toggle(Message::TogglePredictions),
    ]
    .align_items(Alignment::Center);

    let thresholds = app
        .thresholds
        .view(app.busy.is_busy(&Control::ResetThresholds))
        .map(Message::Threshold);

    let top = row![column![feed, controls].spacing(12), thresholds].spacing(20);

    let gallery = app.gallery_grid.view(&app.busy).map(Message::Gallery);

    scrollable(column![top, gallery].spacing(24))
        .height(Length::Fill)
        .into()
}
