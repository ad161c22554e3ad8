//! New patient form shown before opening the camera page

use crate::button::{loading_button, secondary_button};
use crate::input::text_input;
use evidence_core::PatientRegistration;
use iced::widget::{column, container, row, text, Space};
use iced::{Alignment, Element, Length};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    Nombre,
    Cedula,
    Edad,
    Genero,
    Antecedentes,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 5] = [
        Self::Nombre,
        Self::Cedula,
        Self::Edad,
        Self::Genero,
        Self::Antecedentes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Nombre => "Full name",
            Self::Cedula => "Cedula",
            Self::Edad => "Age",
            Self::Genero => "Gender",
            Self::Antecedentes => "Medical history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationMessage {
    Field(RegistrationField, String),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationAction {
    Submit(PatientRegistration),
    Cancel,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    draft: PatientRegistration,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &PatientRegistration {
        &self.draft
    }

    pub fn clear(&mut self) {
        self.draft = PatientRegistration::default();
    }

    fn value(&self, field: RegistrationField) -> &str {
        match field {
            RegistrationField::Nombre => &self.draft.nombre,
            RegistrationField::Cedula => &self.draft.cedula,
            RegistrationField::Edad => &self.draft.edad,
            RegistrationField::Genero => &self.draft.genero,
            RegistrationField::Antecedentes => &self.draft.antecedentes,
        }
    }

    pub fn update(&mut self, message: RegistrationMessage) -> RegistrationAction {
        match message {
            RegistrationMessage::Field(field, value) => {
                let slot = match field {
                    RegistrationField::Nombre => &mut self.draft.nombre,
                    RegistrationField::Cedula => &mut self.draft.cedula,
                    RegistrationField::Edad => &mut self.draft.edad,
                    RegistrationField::Genero => &mut self.draft.genero,
                    RegistrationField::Antecedentes => &mut self.draft.antecedentes,
                };
                *slot = value;
                RegistrationAction::None
            }
            RegistrationMessage::Submit => RegistrationAction::Submit(self.draft.clone()),
            RegistrationMessage::Cancel => RegistrationAction::Cancel,
        }
    }

    pub fn view(&self, submitting: bool) -> Element<'_, RegistrationMessage> {
        let mut fields = column![text("New patient").size(20), Space::with_height(8)].spacing(10);
        for field in RegistrationField::ALL {
            let input = text_input(field.label(), self.value(field))
                .on_input(move |value| RegistrationMessage::Field(field, value))
                .padding(8)
                .width(Length::Fixed(360.0));
            let input = if field == RegistrationField::Antecedentes {
                input.on_submit(RegistrationMessage::Submit)
            } else {
                input
            };
            fields = fields.push(
                row![
                    text(field.label())
                        .size(14)
                        .width(Length::Fixed(140.0)),
                    input,
                ]
                .spacing(12)
                .align_items(Alignment::Center),
            );
        }

        let actions = row![
            secondary_button("Cancel").on_press(RegistrationMessage::Cancel),
            loading_button(
                "Start session",
                "Registering...",
                submitting,
                RegistrationMessage::Submit
            ),
        ]
        .spacing(8);

        container(fields.push(Space::with_height(8)).push(actions).padding(20))
            .style(iced::theme::Container::Box)
            .into()
    }
}
