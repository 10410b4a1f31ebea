use csv::Reader;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("failed to read gazetteer: {0}")]
    Csv(#[from] csv::Error),
}

/// Loads cleaned location names from a gazetteer CSV file
///
/// # Arguments
/// * `csv_path` - Path to the CSV file, one location per row
///
/// The name column is looked up by its `cleaned_location_name` header and
/// falls back to the first column when the header is absent.
pub fn load_locations<P: AsRef<Path>>(csv_path: P) -> Result<Vec<String>, GazetteerError> {
    let reader = Reader::from_path(csv_path)?;
    read_locations(reader)
}

/// Same as `load_locations`, from any reader
pub fn load_locations_from_reader<R: Read>(rdr: R) -> Result<Vec<String>, GazetteerError> {
    read_locations(Reader::from_reader(rdr))
}

fn read_locations<R: Read>(mut reader: Reader<R>) -> Result<Vec<String>, GazetteerError> {
    let headers = reader.headers()?;
    let name_col = headers
        .iter()
        .position(|h| h.trim() == "cleaned_location_name")
        .unwrap_or(0);

    let mut locations = Vec::new();
    for result in reader.records() {
        let record = result?;
        let name = record.get(name_col).unwrap_or("").trim();
        // Skip blank cells, the sheet has spacer rows
        if name.is_empty() {
            continue;
        }
        locations.push(name.to_string());
    }

    Ok(locations)
}
