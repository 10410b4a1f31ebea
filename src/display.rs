use html_escape::encode_text;
use crate::form::Appointment;

/// Escapes OCR output for a panel paragraph, keeping line structure as `<br>`
pub fn text_to_paragraph_html(text: &str) -> String {
    encode_text(text).replace('\n', "<br>")
}

/// Formats a person with their move, e.g. `Ali Riza Efendi (Bingazi -> Tiran)`
pub fn format_appointment_line(appointment: &Appointment) -> String {
    let from = if appointment.from_city.is_empty() { "?" } else { &appointment.from_city };
    let to = if appointment.to_city.is_empty() { "?" } else { &appointment.to_city };
    if appointment.to_title.is_empty() {
        format!("{} ({} -> {})", appointment.name, from, to)
    } else {
        format!("{} ({} -> {}, {})", appointment.name, from, to, appointment.to_title)
    }
}

/// Prints a ranked suggestion list in a readable format
pub fn print_suggestions(raw_name: &str, suggestions: &[String]) {
    println!("\n=== Suggestions for \"{}\" ===", raw_name);
    for (rank, name) in suggestions.iter().enumerate() {
        println!("  {:>2}. {}", rank + 1, name);
    }
}

/// Prints saved appointments grouped under their source
pub fn print_saved_appointments(records: &[crate::form::SavedAppointment]) {
    println!("\n=== Saved appointments ({}) ===", records.len());
    let mut current_source: Option<(&str, &str)> = None;
    for record in records {
        let key = (record.source.as_str(), record.date.as_str());
        if current_source != Some(key) {
            println!("\n** {} ({}) **", record.source, record.date);
            current_source = Some(key);
        }
        println!("  {}", format_appointment_line(&record.to_appointment()));
        if record.notes != crate::form::DEFAULT_NOTES {
            println!("      notes: {}", record.notes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_html_escapes_and_breaks_lines() {
        assert_eq!(
            text_to_paragraph_html("Tiran kazasi <riyaset>\nBingazi"),
            "Tiran kazasi &lt;riyaset&gt;<br>Bingazi"
        );
    }

    #[test]
    fn appointment_line_marks_unknown_cities() {
        let appt = Appointment {
            name: "Tevfik Bey".to_string(),
            to_city: "Seydisehir".to_string(),
            ..Default::default()
        };
        assert_eq!(format_appointment_line(&appt), "Tevfik Bey (? -> Seydisehir)");

        let titled = Appointment { to_title: "Prosecutor".to_string(), ..appt };
        assert_eq!(format_appointment_line(&titled), "Tevfik Bey (? -> Seydisehir, Prosecutor)");
    }
}
