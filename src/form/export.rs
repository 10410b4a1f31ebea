use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use csv::{Reader, WriterBuilder};

use super::appointment::Appointment;
use super::submission::{prepare_batch, SavedAppointment, StoreError};

/// Append-only CSV store for reviewed appointments
pub struct AppointmentStore {
    path: PathBuf,
    // serializes appends so two saves never interleave rows
    write_lock: Mutex<()>,
}

impl AppointmentStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates and appends one reviewed table. Returns the number of stored records.
    pub fn save_batch(&self, appointments: &[Appointment]) -> Result<usize, StoreError> {
        let records = prepare_batch(appointments, Utc::now())?;

        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Header only goes into a new (or empty) file
        let needs_header = std::fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut wtr = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        for record in &records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;

        Ok(records.len())
    }

    /// Reads every stored record in insertion order. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<SavedAppointment>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for result in reader.deserialize() {
            records.push(result?);
        }
        Ok(records)
    }
}
