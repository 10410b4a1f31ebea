pub mod appointment;
pub mod table;
pub mod submission;
pub mod export;

pub use appointment::Appointment;
pub use table::{AppointmentTable, LocationSuggestionSet, TableError};
pub use submission::{SavedAppointment, StoreError, DEFAULT_NOTES};
pub use export::AppointmentStore;
