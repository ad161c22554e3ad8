//! Patient history table, its live search filter and patient registration

use crate::api::Backend;
use crate::{StationError, StationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Column holding the patient name
pub const NAME_COLUMN: usize = 0;
/// Column holding the patient identifier
pub const CEDULA_COLUMN: usize = 2;

pub const HEADER: [&str; 5] = ["Name", "Age", "Cedula", "Gender", "History"];

fn not_available() -> String {
    "N/A".to_string()
}

/// One entry of the backend's patient summary listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    #[serde(default = "not_available")]
    pub nombre: String,
    #[serde(default = "not_available")]
    pub edad: String,
    pub cedula: String,
    #[serde(default = "not_available")]
    pub genero: String,
    #[serde(default = "not_available")]
    pub antecedentes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub hidden: bool,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            hidden: false,
        }
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

impl From<&PatientSummary> for TableRow {
    fn from(p: &PatientSummary) -> Self {
        TableRow::new(vec![
            p.nombre.clone(),
            p.edad.clone(),
            p.cedula.clone(),
            p.genero.clone(),
            p.antecedentes.clone(),
        ])
    }
}

/// Hide every data row whose name or cedula does not contain `query`.
///
/// Row 0 is the header and is never touched. The query is trimmed and
/// compared case-insensitively; cell text is not trimmed. A row with neither
/// a name nor a cedula cell is left exactly as it was.
pub fn filter_rows(rows: &mut [TableRow], query: &str) {
    let filter = query.to_uppercase();
    let filter = filter.trim();

    for row in rows.iter_mut().skip(1) {
        let name = row.cell(NAME_COLUMN);
        let cedula = row.cell(CEDULA_COLUMN);
        if name.is_none() && cedula.is_none() {
            continue;
        }

        let name = name.unwrap_or_default().to_uppercase();
        let cedula = cedula.unwrap_or_default().to_uppercase();
        row.hidden = !(name.contains(filter) || cedula.contains(filter));
    }
}

/// History table: header row followed by one row per patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientTable {
    rows: Vec<TableRow>,
    query: String,
}

impl Default for PatientTable {
    fn default() -> Self {
        Self::from_rows(Vec::new())
    }
}

impl PatientTable {
    pub fn from_patients(patients: &[PatientSummary]) -> Self {
        Self::from_rows(patients.iter().map(TableRow::from).collect())
    }

    pub fn from_rows(data: Vec<TableRow>) -> Self {
        let header = TableRow::new(HEADER.iter().map(|h| h.to_string()).collect());
        let mut rows = Vec::with_capacity(data.len() + 1);
        rows.push(header);
        rows.extend(data);
        Self {
            rows,
            query: String::new(),
        }
    }

    /// Replace the data rows, keeping the current query applied
    pub fn set_patients(&mut self, patients: &[PatientSummary]) {
        let query = std::mem::take(&mut self.query);
        *self = Self::from_patients(patients);
        self.filter(&query);
    }

    pub fn filter(&mut self, query: &str) {
        self.query = query.to_string();
        filter_rows(&mut self.rows, query);
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn header(&self) -> &TableRow {
        &self.rows[0]
    }

    /// Data rows, including hidden ones
    pub fn data_rows(&self) -> &[TableRow] {
        &self.rows[1..]
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.data_rows().iter().filter(|row| !row.hidden)
    }
}

/// Intake form for a new patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientRegistration {
    pub nombre: String,
    pub cedula: String,
    pub edad: String,
    pub genero: String,
    pub antecedentes: String,
}

impl PatientRegistration {
    /// Form fields in the order the registration endpoint expects them
    pub fn form_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("nombre", self.nombre.trim()),
            ("cedula", self.cedula.trim()),
            ("edad", self.edad.trim()),
            ("genero", self.genero.trim()),
            ("antecedentes", self.antecedentes.trim()),
        ]
    }

    /// Name and cedula are mandatory; the cedula names files on the server
    pub fn validate(&self) -> StationResult<()> {
        if self.nombre.trim().is_empty() {
            return Err(StationError::Validation("name is required".into()));
        }
        let cedula = self.cedula.trim();
        if cedula.is_empty() {
            return Err(StationError::Validation("cedula is required".into()));
        }
        if cedula.contains(['/', '\\']) || cedula.contains("..") {
            return Err(StationError::Validation(format!(
                "cedula {:?} is not a valid identifier",
                cedula
            )));
        }
        Ok(())
    }
}

/// Register a patient and return the cedula to open
pub async fn register_patient(
    backend: Arc<dyn Backend>,
    patient: PatientRegistration,
) -> StationResult<String> {
    patient.validate()?;
    backend.register_patient(&patient).await?;
    let cedula = patient.cedula.trim().to_string();
    info!("Registered patient {}", cedula);
    Ok(cedula)
}
