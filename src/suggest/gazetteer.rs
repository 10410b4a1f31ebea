use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use strsim::levenshtein;

use super::normalize::{fold_turkish, strip_admin_suffix};
use crate::form::{Appointment, LocationSuggestionSet};
use crate::parser::{load_locations, GazetteerError};

/// Returned alone when a raw name cannot be looked up
pub const NO_SUGGESTION: &str = "No suggestion.";
pub const MAX_SUGGESTIONS: usize = 25;

static HAS_LATIN_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]").expect("static regex"));

/// Known location names used to rank OCR'ed place names
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    names: Vec<String>,
}

impl Gazetteer {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, GazetteerError> {
        Ok(Self::new(load_locations(path)?))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Up to 25 closest known names, nearest first.
    /// An administrative suffix on the input is carried over to every suggestion.
    pub fn suggest(&self, raw_name: &str) -> Vec<String> {
        let raw_name = raw_name.trim();
        if raw_name.is_empty() || raw_name == "Not specified" || !HAS_LATIN_LETTER.is_match(raw_name) {
            return vec![NO_SUGGESTION.to_string()];
        }

        let folded = fold_turkish(raw_name);
        let (stem, suffix) = strip_admin_suffix(&folded);

        let mut ranked: Vec<(usize, &str)> = self
            .names
            .iter()
            .map(|name| (levenshtein(name, stem), name.as_str()))
            .collect();
        // stable, ties keep gazetteer order
        ranked.sort_by_key(|(distance, _)| *distance);

        let mut seen = HashSet::new();
        ranked
            .into_iter()
            .filter(|(_, name)| seen.insert(*name))
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| format!("{}{}", name, suffix))
            .collect()
    }

    /// From/to suggestions for one appointment row
    pub fn suggest_for(&self, appointment: &Appointment) -> LocationSuggestionSet {
        LocationSuggestionSet::new(
            self.suggest(&appointment.from_city),
            self.suggest(&appointment.to_city),
        )
    }
}
