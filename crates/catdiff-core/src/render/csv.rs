use crate::report::DiffReport;

/// Render a report as CSV
///
/// One header row of column headers, then one row per entry. Fields that
/// contain a comma, a double quote, CR or LF are quoted with inner quotes
/// doubled. Absent cells are empty.
pub fn render_csv(report: &DiffReport) -> String {
    let mut output = String::new();

    let header: Vec<String> = report
        .columns()
        .iter()
        .map(|field| quote_field(field.header()))
        .collect();
    output.push_str(&header.join(","));
    output.push_str("\r\n");

    for row in report.rows() {
        let fields: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(cell) => quote_field(&cell.to_string()),
                None => String::new(),
            })
            .collect();
        output.push_str(&fields.join(","));
        output.push_str("\r\n");
    }

    output
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
