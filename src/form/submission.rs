use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::appointment::Appointment;

/// Stored when the reviewer leaves the notes input empty
pub const DEFAULT_NOTES: &str = "No notes.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No appointments was provided.")]
    EmptyBatch,

    #[error("invalid source date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Persisted form of a reviewed appointment.
/// Source and date are batch-level: every record of one save shares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAppointment {
    pub name: String,
    pub from_city: String,
    pub to_city: String,
    pub from_title: String,
    pub to_title: String,
    pub salary: String,
    pub education: String,
    pub date: String,
    pub source: String,
    pub notes: String,
    pub saved_at: String,
}

impl SavedAppointment {
    pub fn to_appointment(&self) -> Appointment {
        Appointment {
            name: self.name.clone(),
            from_city: self.from_city.clone(),
            to_city: self.to_city.clone(),
            from_title: self.from_title.clone(),
            to_title: self.to_title.clone(),
            education: self.education.clone(),
            salary: self.salary.clone(),
            source: self.source.clone(),
            source_date: self.date.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Validates a collected table and turns it into records ready for storage.
/// The first row's source and source date apply to the whole batch.
pub fn prepare_batch(
    appointments: &[Appointment],
    saved_at: DateTime<Utc>,
) -> Result<Vec<SavedAppointment>, StoreError> {
    let first = appointments.first().ok_or(StoreError::EmptyBatch)?;

    let raw_date = first.source_date.trim();
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
        .map_err(|_| StoreError::InvalidDate(raw_date.to_string()))?;
    let date = date.format("%Y-%m-%d").to_string();
    let source = first.source.trim().to_string();
    let saved_at = saved_at.to_rfc3339();

    Ok(appointments
        .iter()
        .map(|a| SavedAppointment {
            name: a.name.clone(),
            from_city: a.from_city.clone(),
            to_city: a.to_city.clone(),
            from_title: a.from_title.clone(),
            to_title: a.to_title.clone(),
            salary: a.salary.clone(),
            education: a.education.clone(),
            date: date.clone(),
            source: source.clone(),
            notes: if a.notes.trim().is_empty() {
                DEFAULT_NOTES.to_string()
            } else {
                a.notes.clone()
            },
            saved_at: saved_at.clone(),
        })
        .collect())
}
