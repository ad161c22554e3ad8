//! Main application: patient history, camera page and their background work

use crate::ui::main_view;
use evidence_core::gallery::delete_capture;
use evidence_core::panel::{load_thresholds, reset_thresholds, RESET_FAILED_MESSAGE};
use evidence_core::patients::register_patient;
use evidence_core::{
    capture, report, AutoSaveConfig, Backend, BusyControls, CaptureOutcome, Control,
    DeleteOutcome, Failure, Gallery, GalleryView, HttpBackend, KeyOutcome, KeyPress, LoadTicket,
    NotificationKind, Notifier, PanelKey, PatientSummary, PatientTable, StationConfig,
    ThresholdAutoSave, Thresholds,
};
use evidence_ui::{
    GalleryGrid, GalleryMessage, PatientTableMessage, RegistrationAction, RegistrationForm,
    RegistrationMessage, ThresholdAction, ThresholdMessage, ThresholdPanel, ToastMessage,
};
use iced::keyboard::{self, key::Named, Key};
use iced::widget::image::Handle;
use iced::{event, executor, time, Application, Command, Element, Event, Subscription, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PATIENTS_FAILED: &str = "Could not load patients";
const DOWNLOAD_FAILED: &str = "Could not download the report";
const REGISTER_FAILED: &str = "Could not register the patient";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Patient table with search
    History,
    /// New patient form
    Register,
    /// Live feed, capture, gallery and thresholds for one patient
    Camera,
}

pub struct StationApp {
    pub config: StationConfig,
    pub page: Page,
    pub theme: Theme,
    backend: Arc<dyn Backend>,
    pub gallery: Option<Gallery>,
    pub gallery_grid: GalleryGrid,
    pub busy: BusyControls,
    pub notifier: Notifier,
    pub thresholds: ThresholdPanel,
    auto_save: ThresholdAutoSave,
    pub patients: PatientTable,
    pub patients_loading: bool,
    pub registration: RegistrationForm,
    pub predictions_enabled: bool,
    pub preview: Option<Handle>,
    preview_pending: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    OpenPatient(String),
    Back,

    // History page
    LoadPatients,
    PatientsLoaded(Result<Vec<PatientSummary>, Failure>),
    PatientTable(PatientTableMessage),
    ReportDownloaded {
        cedula: String,
        result: Result<PathBuf, Failure>,
    },

    // Registration
    Registration(RegistrationMessage),
    Registered(Result<String, Failure>),

    // Gallery
    LoadCaptures,
    CapturesListed {
        ticket: LoadTicket,
        result: Result<Vec<String>, Failure>,
    },
    ThumbnailLoaded {
        ticket: LoadTicket,
        index: usize,
        result: Result<Vec<u8>, Failure>,
    },
    Gallery(GalleryMessage),
    CaptureDeleted {
        filename: String,
        outcome: DeleteOutcome,
    },

    // Camera
    Capture,
    Captured(Result<CaptureOutcome, Failure>),
    PreviewTick,
    PreviewFrame(Result<Vec<u8>, Failure>),
    TogglePredictions(bool),
    PredictionsToggled(Result<(), Failure>),

    // Thresholds
    ThresholdsLoaded(Result<Thresholds, Failure>),
    Threshold(ThresholdMessage),
    ThresholdsReset(Result<Thresholds, Failure>),
    KeyPressed(KeyPress),

    // Notifications
    Toast(ToastMessage),
    NotificationExpired(u64),
}

impl Application for StationApp {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = StationConfig;

    fn new(config: StationConfig) -> (Self, Command<Message>) {
        info!("Initializing Evidence Station against {}", config.backend_url);

        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config));
        let auto_save = ThresholdAutoSave::spawn(
            backend.clone(),
            AutoSaveConfig {
                delay: config.debounce_delay(),
                enabled: true,
            },
        )
        .unwrap_or_else(|e| {
            warn!("Threshold edits will not be saved: {}", e);
            ThresholdAutoSave::disabled()
        });

        let mut app = Self {
            notifier: Notifier::new(config.notification_lifetime()),
            page: Page::History,
            theme: Theme::Dark,
            backend,
            gallery: None,
            gallery_grid: GalleryGrid::new(),
            busy: BusyControls::default(),
            thresholds: ThresholdPanel::new(),
            auto_save,
            patients: PatientTable::default(),
            patients_loading: false,
            registration: RegistrationForm::new(),
            // The backend boots with predictions off
            predictions_enabled: false,
            preview: None,
            preview_pending: false,
            config,
        };

        let startup = match app.config.cedula.clone() {
            Some(cedula) => app.open_patient(cedula),
            None => app.load_patients(),
        };
        (app, startup)
    }

    fn title(&self) -> String {
        match (&self.page, &self.gallery) {
            (Page::Camera, Some(gallery)) => format!("Evidence Station - {}", gallery.cedula()),
            (Page::Register, _) => "Evidence Station - New patient".to_string(),
            _ => "Evidence Station - Patients".to_string(),
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        debug!("Handling message: {}", describe(&message));

        match message {
            // Navigation
            Message::OpenPatient(cedula) => self.open_patient(cedula),
            Message::Back => {
                info!("Leaving camera page");
                self.page = Page::History;
                self.gallery = None;
                self.gallery_grid.sync(&GalleryView::Idle);
                self.preview = None;
                self.thresholds.set_visible(false);
                self.gallery_grid.hide();
                self.load_patients()
            }

            // History page
            Message::LoadPatients => self.load_patients(),
            Message::PatientsLoaded(result) => {
                self.patients_loading = false;
                match result {
                    Ok(patients) => {
                        debug!("Loaded {} patients", patients.len());
                        self.patients.set_patients(&patients);
                        Command::none()
                    }
                    Err(failure) => {
                        warn!("Patient listing failed: {}", failure);
                        self.notify(NotificationKind::Error, failure.notice(PATIENTS_FAILED))
                    }
                }
            }
            Message::PatientTable(message) => match message {
                PatientTableMessage::QueryChanged(query) => {
                    self.patients.filter(&query);
                    Command::none()
                }
                PatientTableMessage::Open(cedula) => self.open_patient(cedula),
                PatientTableMessage::Download(cedula) => self.download_report(cedula),
                PatientTableMessage::Refresh => self.load_patients(),
                PatientTableMessage::NewPatient => {
                    info!("Opening patient registration");
                    self.registration.clear();
                    self.page = Page::Register;
                    Command::none()
                }
            },
            Message::ReportDownloaded { cedula, result } => {
                self.busy.finish(&Control::Download(cedula));
                match result {
                    Ok(path) => {
                        self.notify(NotificationKind::Success, format!("Saved {}", path.display()))
                    }
                    Err(failure) => {
                        warn!("Report download failed: {}", failure);
                        self.notify(NotificationKind::Error, failure.notice(DOWNLOAD_FAILED))
                    }
                }
            }

            // Registration
            Message::Registration(message) => match self.registration.update(message) {
                RegistrationAction::Submit(patient) => {
                    if !self.busy.start(Control::Register) {
                        return Command::none();
                    }
                    let backend = self.backend.clone();
                    Command::perform(
                        async move {
                            register_patient(backend, patient)
                                .await
                                .map_err(Failure::from)
                        },
                        Message::Registered,
                    )
                }
                RegistrationAction::Cancel => {
                    self.page = Page::History;
                    Command::none()
                }
                RegistrationAction::None => Command::none(),
            },
            Message::Registered(result) => {
                self.busy.finish(&Control::Register);
                match result {
                    Ok(cedula) => {
                        self.registration.clear();
                        self.open_patient(cedula)
                    }
                    Err(failure) => {
                        warn!("Registration failed: {}", failure);
                        self.notify(NotificationKind::Error, failure.notice(REGISTER_FAILED))
                    }
                }
            }

            // Gallery
            Message::LoadCaptures => self.load_captures(),
            Message::CapturesListed { ticket, result } => {
                let Some(gallery) = self.gallery.as_mut() else {
                    return Command::none();
                };
                let requests = match result {
                    Ok(files) => {
                        gallery.apply_listing(ticket, files, chrono::Utc::now().timestamp_millis())
                    }
                    Err(failure) => {
                        gallery.listing_failed(ticket, &failure.to_string());
                        Vec::new()
                    }
                };
                self.gallery_grid.sync(gallery.view());

                Command::batch(requests.into_iter().map(|request| {
                    let backend = self.backend.clone();
                    let (ticket, index) = (request.ticket, request.index);
                    Command::perform(
                        async move {
                            backend
                                .fetch_thumbnail(&request.url)
                                .await
                                .map_err(Failure::from)
                        },
                        move |result| Message::ThumbnailLoaded {
                            ticket,
                            index,
                            result,
                        },
                    )
                }))
            }
            Message::ThumbnailLoaded {
                ticket,
                index,
                result,
            } => {
                if let Some(gallery) = self.gallery.as_mut() {
                    let image = result.map_err(|failure| failure.to_string());
                    if gallery.apply_thumbnail(ticket, index, image) {
                        self.gallery_grid.sync(gallery.view());
                    }
                }
                Command::none()
            }
            Message::Gallery(GalleryMessage::Refresh) => self.load_captures(),
            Message::Gallery(GalleryMessage::ToggleVisible) => {
                let visible = self.gallery_grid.toggle_visible();
                debug!("Gallery panel visible: {}", visible);
                Command::none()
            }
            Message::Gallery(GalleryMessage::Delete(filename)) => {
                let Some(gallery) = self.gallery.as_ref() else {
                    return Command::none();
                };
                if !self.busy.start(Control::Delete(filename.clone())) {
                    return Command::none();
                }
                info!("Deleting capture {}", filename);
                let backend = self.backend.clone();
                let cedula = gallery.cedula().to_string();
                Command::perform(
                    delete_capture(backend, cedula, filename.clone()),
                    move |outcome| Message::CaptureDeleted {
                        filename: filename.clone(),
                        outcome,
                    },
                )
            }
            Message::CaptureDeleted { filename, outcome } => {
                self.busy.finish(&Control::Delete(filename));
                let kind = if outcome.is_success() {
                    NotificationKind::Success
                } else {
                    NotificationKind::Error
                };
                let toast = self.notify(kind, outcome.message().to_string());
                if outcome.should_reload() {
                    Command::batch([toast, self.load_captures()])
                } else {
                    toast
                }
            }

            // Camera
            Message::Capture => {
                let Some(gallery) = self.gallery.as_ref() else {
                    return Command::none();
                };
                if !self.busy.start(Control::Capture) {
                    return Command::none();
                }
                let backend = self.backend.clone();
                let cedula = gallery.cedula().to_string();
                Command::perform(
                    async move {
                        capture::capture_and_upload(backend, cedula)
                            .await
                            .map_err(Failure::from)
                    },
                    Message::Captured,
                )
            }
            Message::Captured(result) => {
                self.busy.finish(&Control::Capture);
                match result {
                    Ok(outcome) => {
                        let toast = self.notify(NotificationKind::Success, outcome.message.clone());
                        if outcome.should_reload_gallery() {
                            Command::batch([toast, self.load_captures()])
                        } else {
                            toast
                        }
                    }
                    Err(failure) => {
                        warn!("Capture failed: {}", failure);
                        self.notify(
                            NotificationKind::Error,
                            failure.notice(capture::CAPTURE_FAILED_MESSAGE),
                        )
                    }
                }
            }
            Message::PreviewTick => {
                if self.page != Page::Camera || self.preview_pending {
                    return Command::none();
                }
                self.preview_pending = true;
                let backend = self.backend.clone();
                Command::perform(
                    async move { backend.grab_frame().await.map_err(Failure::from) },
                    Message::PreviewFrame,
                )
            }
            Message::PreviewFrame(result) => {
                self.preview_pending = false;
                match result {
                    Ok(frame) if self.page == Page::Camera => {
                        self.preview = Some(Handle::from_memory(frame));
                    }
                    Ok(_) => {}
                    Err(failure) => debug!("Preview frame unavailable: {}", failure),
                }
                Command::none()
            }
            Message::TogglePredictions(enabled) => {
                self.predictions_enabled = enabled;
                self.push_predictions()
            }
            Message::PredictionsToggled(result) => {
                if let Err(failure) = result {
                    warn!("Prediction toggle failed: {}", failure);
                }
                Command::none()
            }

            // Thresholds
            Message::ThresholdsLoaded(result) => {
                match result {
                    Ok(values) => self.thresholds.apply(values),
                    Err(failure) => warn!("Could not load thresholds: {}", failure),
                }
                Command::none()
            }
            Message::Threshold(message) => match self.thresholds.update(message) {
                ThresholdAction::Save(values) => {
                    self.auto_save.schedule(values);
                    Command::none()
                }
                ThresholdAction::Reset => {
                    if !self.busy.start(Control::ResetThresholds) {
                        return Command::none();
                    }
                    let backend = self.backend.clone();
                    Command::perform(
                        async move { reset_thresholds(backend).await.map_err(Failure::from) },
                        Message::ThresholdsReset,
                    )
                }
                ThresholdAction::None => Command::none(),
            },
            Message::ThresholdsReset(result) => {
                self.busy.finish(&Control::ResetThresholds);
                match result {
                    Ok(values) => {
                        self.thresholds.apply(values);
                        Command::none()
                    }
                    Err(failure) => {
                        warn!("Threshold reset failed: {}", failure);
                        self.notify(NotificationKind::Error, failure.notice(RESET_FAILED_MESSAGE))
                    }
                }
            }
            Message::KeyPressed(press) => {
                if self.page != Page::Camera {
                    return Command::none();
                }
                if let KeyOutcome::Handled { visible } = self.thresholds.handle_key(press) {
                    debug!("Threshold panel visible: {}", visible);
                }
                Command::none()
            }

            // Notifications
            Message::Toast(ToastMessage::Dismiss(id)) | Message::NotificationExpired(id) => {
                self.notifier.dismiss(id);
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        main_view(self)
    }

    fn theme(&self) -> Theme {
        self.theme.clone()
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = event::listen_with(key_press);
        match (self.page, self.config.preview_interval()) {
            (Page::Camera, Some(interval)) => Subscription::batch([
                keys,
                time::every(interval).map(|_| Message::PreviewTick),
            ]),
            _ => keys,
        }
    }
}

impl StationApp {
    fn open_patient(&mut self, cedula: String) -> Command<Message> {
        info!("Opening camera page for {}", cedula);
        self.page = Page::Camera;
        self.preview = None;
        self.gallery = Some(Gallery::new(
            cedula,
            self.config
                .resolve_template(&self.config.endpoints.capture_image),
        ));

        let backend = self.backend.clone();
        let thresholds = Command::perform(
            async move { load_thresholds(backend).await.map_err(Failure::from) },
            Message::ThresholdsLoaded,
        );
        Command::batch([self.load_captures(), thresholds, self.push_predictions()])
    }

    /// Send the switch state so the backend matches what the checkbox shows
    fn push_predictions(&self) -> Command<Message> {
        let enabled = self.predictions_enabled;
        let backend = self.backend.clone();
        Command::perform(
            async move {
                backend
                    .set_predictions(enabled)
                    .await
                    .map_err(Failure::from)
            },
            Message::PredictionsToggled,
        )
    }

    /// Start a gallery load; any load in flight is superseded
    fn load_captures(&mut self) -> Command<Message> {
        let Some(gallery) = self.gallery.as_mut() else {
            return Command::none();
        };
        let ticket = gallery.begin_load();
        self.gallery_grid.sync(gallery.view());

        let backend = self.backend.clone();
        let cedula = gallery.cedula().to_string();
        Command::perform(
            async move {
                backend
                    .list_captures(&cedula)
                    .await
                    .map_err(Failure::from)
            },
            move |result| Message::CapturesListed { ticket, result },
        )
    }

    fn load_patients(&mut self) -> Command<Message> {
        self.patients_loading = true;
        let backend = self.backend.clone();
        Command::perform(
            async move { backend.list_patients().await.map_err(Failure::from) },
            Message::PatientsLoaded,
        )
    }

    fn download_report(&mut self, cedula: String) -> Command<Message> {
        if !self.busy.start(Control::Download(cedula.clone())) {
            return Command::none();
        }
        let backend = self.backend.clone();
        let dir = report::download_dir();
        let target = cedula.clone();
        Command::perform(
            async move {
                report::download_report(backend, target, dir)
                    .await
                    .map_err(Failure::from)
            },
            move |result| Message::ReportDownloaded {
                cedula: cedula.clone(),
                result,
            },
        )
    }

    /// Show a toast and schedule its removal
    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) -> Command<Message> {
        let id = self.notifier.push(kind, message);
        let lifetime = self.notifier.lifetime();
        Command::perform(tokio::time::sleep(lifetime), move |_| {
            Message::NotificationExpired(id)
        })
    }
}

fn key_press(event: Event, status: event::Status) -> Option<Message> {
    let Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) = event else {
        return None;
    };
    let key = match key {
        Key::Named(Named::Escape) => PanelKey::Escape,
        Key::Character(c) => match c.chars().next() {
            Some(ch) => PanelKey::Character(ch),
            None => return None,
        },
        _ => return None,
    };
    Some(Message::KeyPressed(KeyPress {
        key,
        shift: modifiers.shift(),
        typing: status == event::Status::Captured,
    }))
}

/// Short log form; thumbnail and preview payloads are not printed
fn describe(message: &Message) -> String {
    match message {
        Message::ThumbnailLoaded { index, result, .. } => {
            format!("ThumbnailLoaded #{} ok={}", index, result.is_ok())
        }
        Message::PreviewFrame(result) => format!("PreviewFrame ok={}", result.is_ok()),
        other => format!("{:?}", other),
    }
}
