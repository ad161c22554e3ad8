//! Detection threshold panel
//!
//! Sliders for confidence, IoU and minimum box fraction with live readouts.
//! Saving is left to the caller: every edit yields a [`ThresholdAction::Save`]
//! carrying the full set of values.

use crate::button::loading_button;
use evidence_core::{KeyOutcome, KeyPress, KnobsState, PanelMirror, ThresholdField, Thresholds};
use iced::widget::{column, container, row, slider, text, Space};
use iced::{Alignment, Element, Length};

#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdMessage {
    Changed(ThresholdField, f64),
    Reset,
    Close,
}

/// What the app must do after an update
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdAction {
    Save(Thresholds),
    Reset,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdPanel {
    knobs: KnobsState,
}

impl ThresholdPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn knobs(&self) -> &KnobsState {
        &self.knobs
    }

    pub fn is_visible(&self) -> bool {
        self.knobs.visibility().is_visible()
    }

    /// Derived visibility, for indicators outside the panel
    pub fn mirror(&self) -> PanelMirror {
        self.knobs.visibility().mirror()
    }

    /// Replace all values, e.g. after a load or reset
    pub fn apply(&mut self, values: Thresholds) {
        self.knobs.apply(values);
    }

    pub fn handle_key(&mut self, press: KeyPress) -> KeyOutcome {
        self.knobs.visibility_mut().handle_key(press)
    }

    pub fn set_visible(&mut self, visible: bool) -> PanelMirror {
        self.knobs.visibility_mut().set(visible)
    }

    pub fn update(&mut self, message: ThresholdMessage) -> ThresholdAction {
        match message {
            ThresholdMessage::Changed(field, value) => {
                ThresholdAction::Save(self.knobs.edit(field, value))
            }
            ThresholdMessage::Reset => ThresholdAction::Reset,
            ThresholdMessage::Close => {
                self.set_visible(false);
                ThresholdAction::None
            }
        }
    }

    pub fn view(&self, resetting: bool) -> Element<'_, ThresholdMessage> {
        if self.mirror().aria_hidden {
            return Space::new(Length::Shrink, Length::Shrink).into();
        }

        let title = row![
            text("Detection thresholds")
                .size(18)
                .style(iced::theme::Text::Color(iced::Color::WHITE)),
            Space::with_width(Length::Fill),
            iced::widget::button(text("Close").size(12))
                .style(iced::theme::Button::Text)
                .on_press(ThresholdMessage::Close),
        ]
        .align_items(Alignment::Center);

        let mut content = column![title, Space::with_height(10)].spacing(8);
        for field in ThresholdField::ALL {
            content = content.push(self.knob(field));
        }

        let hint = text("Shift+K to toggle, Esc to close")
            .size(12)
            .style(iced::theme::Text::Color(iced::Color::from_rgb(
                0.6, 0.6, 0.6,
            )));

        content = content.push(Space::with_height(10)).push(
            row![
                loading_button(
                    "Restore defaults",
                    "Restoring...",
                    resetting,
                    ThresholdMessage::Reset
                ),
                Space::with_width(Length::Fill),
                hint,
            ]
            .align_items(Alignment::Center),
        );

        container(content.padding(16))
            .width(Length::Fixed(320.0))
            .style(iced::theme::Container::Box)
            .into()
    }

    fn knob(&self, field: ThresholdField) -> Element<'_, ThresholdMessage> {
        let label = row![
            text(field.label())
                .size(14)
                .style(iced::theme::Text::Color(iced::Color::from_rgb(
                    0.7, 0.7, 0.7,
                ))),
            Space::with_width(Length::Fill),
            text(self.knobs.readouts().get(field)).size(14),
        ];

        let value = self.knobs.values().get(field);
        let control = slider(field.range(), value, move |v| {
            ThresholdMessage::Changed(field, v)
        })
        .step(field.step());

        column![label, control].spacing(4).into()
    }
}
