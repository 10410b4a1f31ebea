use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::form::{Appointment, AppointmentTable};
use crate::panels::{Spinner, TextPanels};
use crate::preview::{ImagePreview, PreviewToken};

const DESK_ID_LEN: usize = 24;

/// How long a session cookie lives, and how long an untouched desk is kept
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Review state of one browser session: preview, text cards and appointment table
#[derive(Debug)]
pub struct Desk {
    pub preview: ImagePreview,
    pub panels: TextPanels,
    pub spinners: Vec<Spinner>,
    pub table: AppointmentTable,
}

impl Default for Desk {
    fn default() -> Self {
        Self {
            preview: ImagePreview::default(),
            panels: TextPanels::default(),
            spinners: vec![Spinner::new("ocr_spinner"), Spinner::new("latinized_spinner")],
            table: AppointmentTable::default(),
        }
    }
}

/// What the page needs to redraw itself. Keys are the element ids they fill.
#[derive(Debug, Serialize)]
pub struct DeskView {
    pub image_preview: String,
    pub ocr_text: String,
    pub ocr_text_info: String,
    pub latinized_text: String,
    pub latinized_text_info: String,
    pub extract_data_visible: bool,
    pub save_to_db_visible: bool,
    pub spinners: Vec<Spinner>,
    pub appointments_table_body: String,
    pub appointments: Vec<Appointment>,
}

impl Desk {
    /// Only the latest upload may speak for the panels in replace mode.
    /// Appended pages all count.
    fn owns_panels(&self, token: PreviewToken, append_mode: bool) -> bool {
        append_mode || self.preview.is_latest(token)
    }

    /// Shows OCR output for the upload holding `token`. Returns false when it was superseded.
    pub fn show_text(&mut self, token: PreviewToken, append_mode: bool, ocr: &str, latinized: &str) -> bool {
        if !self.owns_panels(token, append_mode) {
            return false;
        }
        self.panels
            .render_extracted_text(ocr, latinized, append_mode, &mut self.spinners);
        true
    }

    /// Reports a failed upload unless a newer one is still in flight
    pub fn show_failure(&mut self, token: PreviewToken, append_mode: bool, message: &str) -> bool {
        if !self.owns_panels(token, append_mode) {
            return false;
        }
        self.panels.render_failure(message, &mut self.spinners);
        true
    }

    pub fn view(&self) -> DeskView {
        DeskView {
            image_preview: self.preview.to_html(),
            ocr_text: self.panels.ocr_html(),
            ocr_text_info: self.panels.ocr_info.clone(),
            latinized_text: self.panels.latinized_html(),
            latinized_text_info: self.panels.latinized_info.clone(),
            extract_data_visible: self.panels.extract_visible,
            save_to_db_visible: self.panels.save_visible,
            spinners: self.spinners.clone(),
            appointments_table_body: self.table.to_html(),
            appointments: self.table.collect(),
        }
    }
}

struct Entry {
    desk: Desk,
    last_seen: Instant,
}

/// All live desks, keyed by the id stored in the session cookie.
/// Desks nobody touched for `idle_ttl` are dropped.
pub struct DeskRegistry {
    desks: Mutex<HashMap<String, Entry>>,
    idle_ttl: Duration,
}

impl Default for DeskRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(SESSION_TTL)
    }
}

impl DeskRegistry {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            desks: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Runs `f` on the desk for `id`, creating it on first use.
    /// Keep `f` short: every session shares this lock.
    pub fn with_desk<R>(&self, id: &str, f: impl FnOnce(&mut Desk) -> R) -> R {
        let now = Instant::now();
        let mut desks = self.desks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = desks.len();
        desks.retain(|key, entry| key == id || now.duration_since(entry.last_seen) <= self.idle_ttl);
        if desks.len() < before {
            debug!("dropped {} idle desks", before - desks.len());
        }

        let entry = desks.entry(id.to_string()).or_insert_with(|| Entry {
            desk: Desk::default(),
            last_seen: now,
        });
        entry.last_seen = now;
        f(&mut entry.desk)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.desks.lock().map(|d| d.len()).unwrap_or(0)
    }
}

pub fn new_desk_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DESK_ID_LEN)
        .map(char::from)
        .collect()
}
