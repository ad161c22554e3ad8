use crate::app::{Message, Page, StationApp};
use iced::{
    widget::{button, row, text, Space},
    Alignment, Element, Length,
};

fn back_button<'a>() -> iced::widget::Button<'a, Message> {
    button(text("Back").size(12))
        .padding([6, 12])
        .style(iced::theme::Button::Text)
        .on_press(Message::Back)
}

fn dim(label: String) -> iced::widget::Text<'static> {
    text(label)
        .size(12)
        .style(iced::theme::Text::Color(iced::Color::from_rgb(
            0.5, 0.5, 0.5,
        )))
}

pub fn toolbar_view(app: &StationApp) -> Element<'_, Message> {
    let mut bar = row![].spacing(8).align_items(Alignment::Center);

    match (app.page, &app.gallery) {
        (Page::Camera, Some(gallery)) => {
            bar = bar
                .push(back_button())
                .push(text(format!("Patient {}", gallery.cedula())).size(16));
        }
        (Page::Register, _) => {
            bar = bar.push(back_button()).push(text("New patient").size(16));
        }
        _ => {
            bar = bar.push(text("Patients").size(16));
        }
    }

    bar = bar.push(Space::with_width(Length::Fill));
    if app.page == Page::Camera {
        bar = bar.push(dim(thresholds_indicator(app.thresholds.mirror().root_visible)));
    }
    bar.push(dim(app.config.backend_url.clone())).into()
}

fn thresholds_indicator(visible: bool) -> String {
    let state = if visible { "shown" } else { "hidden" };
    format!("Thresholds {} (Shift+K)", state)
}
