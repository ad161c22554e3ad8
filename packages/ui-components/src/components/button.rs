//! Station buttons. Every action button goes through these so padding and
//! text size stay uniform across pages.

use iced::widget::{button, text};

const PADDING: [u16; 2] = [8, 16];

pub fn primary_button<'a, Message: Clone>(label: &'a str) -> button::Button<'a, Message> {
    button(text(label).size(14))
        .padding(PADDING)
        .style(iced::theme::Button::Primary)
}

pub fn secondary_button<'a, Message: Clone>(label: &'a str) -> button::Button<'a, Message> {
    button(text(label).size(14))
        .padding(PADDING)
        .style(iced::theme::Button::Secondary)
}

pub fn danger_button<'a, Message: Clone>(label: &'a str) -> button::Button<'a, Message> {
    button(text(label).size(12)).style(iced::theme::Button::Destructive)
}

/// A button that shows `busy_label` and ignores presses while `busy`
pub fn loading_button<'a, Message: Clone + 'a>(
    label: &'a str,
    busy_label: &'a str,
    busy: bool,
    on_press: Message,
) -> button::Button<'a, Message> {
    if busy {
        secondary_button(busy_label)
    } else {
        primary_button(label).on_press(on_press)
    }
}
