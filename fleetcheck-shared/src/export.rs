/// CSV export helpers
///
/// Produces RFC 4180 style output: fields containing commas, quotes, or
/// newlines are wrapped in double quotes and embedded quotes are doubled.
/// Everything else is written bare.

use crate::models::inspection::InspectionListRow;
use chrono::{DateTime, Utc};

/// Escapes a single CSV field
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Joins fields into one CSV line
fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders inspections as a CSV document
///
/// Columns match what the dashboard export expects; timestamps are RFC 3339.
pub fn inspections_to_csv(rows: &[InspectionListRow]) -> String {
    let mut out = String::from(
        "id,vehicle,license_plate,template,inspector,status,notes,completed_at,created_at\n",
    );

    for row in rows {
        let line = csv_line(&[
            row.id.to_string(),
            row.vehicle_name.clone(),
            row.license_plate.clone(),
            row.template_name.clone(),
            row.inspector_name.clone(),
            row.status.clone(),
            row.notes.clone().unwrap_or_default(),
            row.completed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            row.created_at.to_rfc3339(),
        ]);
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Builds the attachment filename for an export, e.g. "inspections_2026-08-25.csv"
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("inspections_{}.csv", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn sample_row(notes: Option<&str>) -> InspectionListRow {
        InspectionListRow {
            id: Uuid::nil(),
            vehicle_id: Uuid::nil(),
            vehicle_name: "Truck 7".to_string(),
            license_plate: "ABC-1".to_string(),
            template_id: Uuid::nil(),
            template_name: "Daily pre-trip".to_string(),
            inspector_id: Uuid::nil(),
            inspector_name: "Ada Lovelace".to_string(),
            status: "completed".to_string(),
            notes: notes.map(|s| s.to_string()),
            completed_at: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_escape_field_plain() {
        assert_eq!(escape_field("Truck 7"), "Truck 7");
    }

    #[test]
    fn test_escape_field_comma() {
        assert_eq!(escape_field("left, rear"), "\"left, rear\"");
    }

    #[test]
    fn test_escape_field_quotes() {
        assert_eq!(escape_field("6\" crack"), "\"6\"\" crack\"");
    }

    #[test]
    fn test_escape_field_newline() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_csv_header_and_row_count() {
        let rows = vec![sample_row(None), sample_row(Some("ok"))];
        let csv = inspections_to_csv(&rows);

        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,vehicle,license_plate"));
    }

    #[test]
    fn test_csv_escapes_notes() {
        let rows = vec![sample_row(Some("brakes worn, replace soon"))];
        let csv = inspections_to_csv(&rows);

        assert!(csv.contains("\"brakes worn, replace soon\""));
    }

    #[test]
    fn test_export_filename() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(export_filename(now), "inspections_2026-08-25.csv");
    }
}
