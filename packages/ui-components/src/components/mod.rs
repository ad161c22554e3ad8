pub mod button;
pub mod gallery_grid;
pub mod input;
pub mod patient_table;
pub mod registration_form;
pub mod threshold_panel;
pub mod toast;

pub use button::*;
pub use gallery_grid::{GalleryGrid, GalleryMessage};
pub use input::search_input;
pub use patient_table::{patient_table_view, PatientTableMessage};
pub use registration_form::{
    RegistrationAction, RegistrationField, RegistrationForm, RegistrationMessage,
};
pub use threshold_panel::{ThresholdAction, ThresholdMessage, ThresholdPanel};
pub use toast::{toast_stack, ToastMessage};
