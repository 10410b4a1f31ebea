use serde::{Deserialize, Serialize};

/// One appointment decision as extracted from a latinized document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appointment {
    pub name: String,
    pub from_city: String,
    pub to_city: String,
    pub from_title: String,
    pub to_title: String,
    pub education: String,
    pub salary: String,
    pub source: String,
    pub source_date: String,
    pub notes: String,
}

/// The ten appointment fields in table column order.
/// `wire_name` is both the JSON key and the input-name prefix in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AppointmentField {
    Name,
    FromCity,
    ToCity,
    FromTitle,
    ToTitle,
    Education,
    Salary,
    Source,
    SourceDate,
    Notes,
}

impl AppointmentField {
    pub const ALL: [AppointmentField; 10] = [
        AppointmentField::Name,
        AppointmentField::FromCity,
        AppointmentField::ToCity,
        AppointmentField::FromTitle,
        AppointmentField::ToTitle,
        AppointmentField::Education,
        AppointmentField::Salary,
        AppointmentField::Source,
        AppointmentField::SourceDate,
        AppointmentField::Notes,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            AppointmentField::Name => "name",
            AppointmentField::FromCity => "fromCity",
            AppointmentField::ToCity => "toCity",
            AppointmentField::FromTitle => "fromTitle",
            AppointmentField::ToTitle => "toTitle",
            AppointmentField::Education => "education",
            AppointmentField::Salary => "salary",
            AppointmentField::Source => "source",
            AppointmentField::SourceDate => "sourceDate",
            AppointmentField::Notes => "notes",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<AppointmentField> {
        AppointmentField::ALL.into_iter().find(|f| f.wire_name() == name)
    }

    /// Placeholder hint for the fields the reviewer fills in by hand.
    /// `None` means the field is pre-filled from extraction.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            AppointmentField::Source => Some("Source"),
            AppointmentField::SourceDate => Some("Source Date"),
            AppointmentField::Notes => Some("Notes"),
            _ => None,
        }
    }

    pub fn is_prefilled(self) -> bool {
        self.placeholder().is_none()
    }

    /// Input name for this field on a given row, e.g. `toCity_3`
    pub fn input_name(self, index: usize) -> String {
        format!("{}_{}", self.wire_name(), index)
    }
}

impl Appointment {
    pub fn get(&self, field: AppointmentField) -> &str {
        match field {
            AppointmentField::Name => &self.name,
            AppointmentField::FromCity => &self.from_city,
            AppointmentField::ToCity => &self.to_city,
            AppointmentField::FromTitle => &self.from_title,
            AppointmentField::ToTitle => &self.to_title,
            AppointmentField::Education => &self.education,
            AppointmentField::Salary => &self.salary,
            AppointmentField::Source => &self.source,
            AppointmentField::SourceDate => &self.source_date,
            AppointmentField::Notes => &self.notes,
        }
    }

    pub fn set(&mut self, field: AppointmentField, value: impl Into<String>) {
        let slot = match field {
            AppointmentField::Name => &mut self.name,
            AppointmentField::FromCity => &mut self.from_city,
            AppointmentField::ToCity => &mut self.to_city,
            AppointmentField::FromTitle => &mut self.from_title,
            AppointmentField::ToTitle => &mut self.to_title,
            AppointmentField::Education => &mut self.education,
            AppointmentField::Salary => &mut self.salary,
            AppointmentField::Source => &mut self.source,
            AppointmentField::SourceDate => &mut self.source_date,
            AppointmentField::Notes => &mut self.notes,
        };
        *slot = value.into();
    }

    /// Copy of this appointment as it looks right after a table render:
    /// reviewer-only fields are cleared.
    pub fn as_rendered(&self) -> Appointment {
        let mut rendered = self.clone();
        for field in AppointmentField::ALL {
            if !field.is_prefilled() {
                rendered.set(field, "");
            }
        }
        rendered
    }
}
