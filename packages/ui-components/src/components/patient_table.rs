//! Patient list with a live search box

use crate::button::primary_button;
use crate::input::search_input;
use evidence_core::patients::{CEDULA_COLUMN, HEADER};
use evidence_core::{BusyControls, Control, PatientTable, TableRow};
use iced::widget::{button, column, row, scrollable, text, Space};
use iced::{Alignment, Element, Length};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientTableMessage {
    QueryChanged(String),
    Open(String),
    Download(String),
    Refresh,
    NewPatient,
}

const COLUMN_WIDTHS: [f32; 5] = [220.0, 60.0, 140.0, 90.0, 260.0];

fn cell<'a>(value: &str, index: usize) -> Element<'a, PatientTableMessage> {
    text(value)
        .size(13)
        .width(Length::Fixed(COLUMN_WIDTHS[index]))
        .into()
}

pub fn patient_table_view<'a>(
    table: &'a PatientTable,
    busy: &'a BusyControls,
) -> Element<'a, PatientTableMessage> {
    let search = row![
        search_input(
            "Search by name or cedula",
            table.query(),
            PatientTableMessage::QueryChanged
        )
        .width(Length::Fixed(320.0)),
        Space::with_width(Length::Fill),
        button(text("Refresh").size(12))
            .padding([6, 12])
            .style(iced::theme::Button::Text)
            .on_press(PatientTableMessage::Refresh),
        primary_button("New patient").on_press(PatientTableMessage::NewPatient),
    ]
    .spacing(8)
    .align_items(Alignment::Center);

    let header = HEADER
        .iter()
        .enumerate()
        .fold(row![].spacing(8), |r, (i, title)| {
            r.push(
                text(*title)
                    .size(13)
                    .width(Length::Fixed(COLUMN_WIDTHS[i]))
                    .style(iced::theme::Text::Color(iced::Color::from_rgb(
                        0.7, 0.7, 0.7,
                    ))),
            )
        });

    let mut rows = column![].spacing(6);
    let mut shown = 0;
    for data in table.visible_rows() {
        rows = rows.push(row_view(data, busy));
        shown += 1;
    }
    if shown == 0 {
        rows = rows.push(text("No patients match").size(13));
    }

    column![search, header, scrollable(rows).height(Length::Fill)]
        .spacing(12)
        .into()
}

fn row_view<'a>(data: &'a TableRow, busy: &BusyControls) -> Element<'a, PatientTableMessage> {
    let mut line = row![].spacing(8).align_items(Alignment::Center);
    for (i, value) in data.cells.iter().enumerate().take(COLUMN_WIDTHS.len()) {
        line = line.push(cell(value, i));
    }

    if let Some(cedula) = data.cell(CEDULA_COLUMN) {
        let open = button(text("Open").size(12))
            .padding([4, 10])
            .style(iced::theme::Button::Primary)
            .on_press(PatientTableMessage::Open(cedula.to_string()));
        let download = if busy.is_busy(&Control::Download(cedula.to_string())) {
            button(text("Downloading...").size(12)).padding([4, 10])
        } else {
            button(text("Report").size(12))
                .padding([4, 10])
                .style(iced::theme::Button::Secondary)
                .on_press(PatientTableMessage::Download(cedula.to_string()))
        };
        line = line.push(open).push(download);
    }

    line.into()
}
