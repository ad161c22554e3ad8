//! Transient notifications stacked in a corner

use evidence_core::{Notification, NotificationKind};
use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Color, Element, Length};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastMessage {
    Dismiss(u64),
}

fn accent(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => Color::from_rgb(0.3, 0.8, 0.4),
        NotificationKind::Error => Color::from_rgb(1.0, 0.3, 0.3),
    }
}

pub fn toast_stack<'a>(
    notifications: impl Iterator<Item = &'a Notification>,
) -> Element<'a, ToastMessage> {
    let mut stack = column![].spacing(8).align_items(Alignment::End);

    for notification in notifications {
        let body = row![
            text(&notification.message)
                .size(14)
                .style(iced::theme::Text::Color(accent(notification.kind))),
            Space::with_width(12),
            button(text("x").size(12))
                .padding([2, 6])
                .style(iced::theme::Button::Text)
                .on_press(ToastMessage::Dismiss(notification.id)),
        ]
        .align_items(Alignment::Center);

        stack = stack.push(
            container(body)
                .padding([8, 12])
                .style(iced::theme::Container::Box),
        );
    }

    container(stack)
        .width(Length::Fill)
        .align_x(iced::alignment::Horizontal::Right)
        .into()
}
