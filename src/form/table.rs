use std::collections::BTreeMap;
use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::appointment::{Appointment, AppointmentField};

const INPUT_CLASS: &str = "block w-full p-2 text-gray-900 bg-gray-50 rounded-lg border border-gray-300";
const SELECT_CLASS: &str = "bg-gray-50 border border-gray-300 text-gray-900 text-sm rounded-lg focus:ring-blue-500 focus:border-blue-500 block w-full p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:placeholder-gray-400 dark:text-white dark:focus:ring-blue-500 dark:focus:border-blue-500";

// `{field}_{index}`, the only handle between a rendered row and its submitted values
static INPUT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)_(\d+)$").expect("static regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no location suggestions for row {row}")]
    MissingSuggestions { row: usize },

    #[error("row {row} is missing the '{field}' input")]
    MissingField { row: usize, field: &'static str },

    #[error("unknown table input '{0}'")]
    UnknownInput(String),

    #[error("submitted {found} rows but the table has {expected}")]
    RowCountMismatch { expected: usize, found: usize },
}

/// Candidate location names for one side of an appointment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSuggestions {
    pub suggestions: Vec<String>,
}

/// `(from, to)` suggestions for one appointment row.
/// Serialized as a two-element array, matching the suggestion service output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSuggestionSet(pub LocationSuggestions, pub LocationSuggestions);

impl LocationSuggestionSet {
    pub fn new(from: Vec<String>, to: Vec<String>) -> Self {
        LocationSuggestionSet(
            LocationSuggestions { suggestions: from },
            LocationSuggestions { suggestions: to },
        )
    }

    pub fn from_suggestions(&self) -> &[String] {
        &self.0.suggestions
    }

    pub fn to_suggestions(&self) -> &[String] {
        &self.1.suggestions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub appointment: Appointment,
    pub suggestions: LocationSuggestionSet,
}

/// Editable appointment table. Rows are identified by position only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentTable {
    rows: Vec<TableRow>,
}

impl AppointmentTable {
    /// Replaces every row with `appointments`, pairing row `i` with `suggestion_sets[i]`.
    /// Lengths are checked before anything changes, so a failed render leaves the old table.
    pub fn render(
        &mut self,
        appointments: &[Appointment],
        suggestion_sets: &[LocationSuggestionSet],
    ) -> Result<(), TableError> {
        if suggestion_sets.len() < appointments.len() {
            return Err(TableError::MissingSuggestions {
                row: suggestion_sets.len(),
            });
        }

        self.rows = appointments
            .iter()
            .zip(suggestion_sets)
            .map(|(appointment, suggestions)| TableRow {
                appointment: appointment.as_rendered(),
                suggestions: suggestions.clone(),
            })
            .collect();
        Ok(())
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Applies a reviewer edit addressed by input name, e.g. `toCity_0`
    pub fn set_input(&mut self, input_name: &str, value: &str) -> Result<(), TableError> {
        let (field, index) =
            parse_input_name(input_name).ok_or_else(|| TableError::UnknownInput(input_name.to_string()))?;
        let row = self
            .rows
            .get_mut(index)
            .ok_or_else(|| TableError::UnknownInput(input_name.to_string()))?;
        row.appointment.set(field, value);
        Ok(())
    }

    /// Current appointments in row order
    pub fn collect(&self) -> Vec<Appointment> {
        self.rows.iter().map(|r| r.appointment.clone()).collect()
    }

    /// Takes over the values the browser submitted for this table.
    /// Row count must match; suggestions stay as rendered.
    pub fn apply_collected(&mut self, appointments: &[Appointment]) -> Result<(), TableError> {
        if appointments.len() != self.rows.len() {
            return Err(TableError::RowCountMismatch {
                expected: self.rows.len(),
                found: appointments.len(),
            });
        }
        for (row, appointment) in self.rows.iter_mut().zip(appointments) {
            row.appointment = appointment.clone();
        }
        Ok(())
    }

    /// Rebuilds appointments from submitted `{field}_{index}` pairs.
    /// Every row up to the highest index seen must carry all ten inputs.
    pub fn from_form<I, K, V>(pairs: I) -> Result<Vec<Appointment>, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut rows: BTreeMap<usize, BTreeMap<AppointmentField, String>> = BTreeMap::new();
        for (name, value) in pairs {
            // selects and other controls are not part of the protocol
            let Some((field, index)) = parse_input_name(name.as_ref()) else {
                continue;
            };
            rows.entry(index).or_default().insert(field, value.into());
        }

        // Indices come from the client; the first one out of place is a missing row
        if let Some(gap) = rows.keys().enumerate().find_map(|(pos, &index)| (pos != index).then_some(pos)) {
            return Err(TableError::MissingField {
                row: gap,
                field: AppointmentField::Name.wire_name(),
            });
        }

        let mut appointments = Vec::with_capacity(rows.len());
        for (index, mut values) in rows {
            let mut appointment = Appointment::default();
            for field in AppointmentField::ALL {
                let value = values.remove(&field).ok_or(TableError::MissingField {
                    row: index,
                    field: field.wire_name(),
                })?;
                appointment.set(field, value);
            }
            appointments.push(appointment);
        }
        Ok(appointments)
    }

    /// Inner HTML of `#appointments-table-body`
    pub fn to_html(&self) -> String {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| render_row(index, row))
            .collect()
    }
}

fn parse_input_name(name: &str) -> Option<(AppointmentField, usize)> {
    let caps = INPUT_NAME.captures(name)?;
    let field = AppointmentField::from_wire_name(&caps[1])?;
    let index = caps[2].parse().ok()?;
    Some((field, index))
}

fn render_row(index: usize, row: &TableRow) -> String {
    let mut html = String::from("<tr>\n");
    for field in AppointmentField::ALL {
        html.push_str(&render_input(index, field, &row.appointment));
        match field {
            AppointmentField::FromCity => {
                html.push_str(&render_select("fromCitySugg", index, row.suggestions.from_suggestions()))
            }
            AppointmentField::ToCity => {
                html.push_str(&render_select("toCitySugg", index, row.suggestions.to_suggestions()))
            }
            _ => {}
        }
    }
    html.push_str("</tr>\n");
    html
}

fn render_input(index: usize, field: AppointmentField, appointment: &Appointment) -> String {
    let name = field.input_name(index);
    match field.placeholder() {
        None => format!(
            "    <td><input type=\"text\" name=\"{}\" value=\"{}\" class=\"{}\"></td>\n",
            name,
            encode_double_quoted_attribute(appointment.get(field)),
            INPUT_CLASS
        ),
        Some(placeholder) => format!(
            "    <td><input type=\"text\" name=\"{}\" placeholder=\"{}\" class=\"{}\"></td>\n",
            name, placeholder, INPUT_CLASS
        ),
    }
}

fn render_select(prefix: &str, index: usize, locations: &[String]) -> String {
    let options: String = locations
        .iter()
        .map(|location| {
            format!(
                "<option value=\"{}\">{}</option>",
                encode_double_quoted_attribute(location),
                encode_text(location)
            )
        })
        .collect();
    format!(
        "    <td>\n        <select id=\"{}_{}\" class=\"{}\">\n            {}\n        </select>\n    </td>\n",
        prefix, index, SELECT_CLASS, options
    )
}
