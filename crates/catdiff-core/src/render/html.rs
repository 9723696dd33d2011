use crate::compare::PairDiff;
use crate::report::DiffReport;

/// Render a report as an HTML table
pub fn render_html_table(report: &DiffReport) -> String {
    let mut output = String::new();

    output.push_str("<table border=\"1\" class=\"catdiff\">\n");
    output.push_str("  <thead>\n    <tr>");
    for field in report.columns() {
        output.push_str(&format!("<th>{}</th>", escape_html(field.header())));
    }
    output.push_str("</tr>\n  </thead>\n  <tbody>\n");

    for row in report.rows() {
        output.push_str("    <tr>");
        for cell in row {
            match cell {
                Some(cell) => {
                    output.push_str(&format!("<td>{}</td>", escape_html(&cell.to_string())))
                }
                None => output.push_str("<td></td>"),
            }
        }
        output.push_str("</tr>\n");
    }

    output.push_str("  </tbody>\n</table>\n");
    output
}

/// Render the pairwise reports of a catalog chain as one HTML document
///
/// Each pair gets a heading, the two catalog labels, its table, and the
/// shell command that removes the older catalog once the changes are
/// reviewed.
pub fn render_html_sequence(pairs: &[PairDiff]) -> String {
    let mut output = String::new();

    output.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>catdiff</title></head>\n<body>\n");

    for pair in pairs {
        output.push_str(&format!(
            "<h1>Compare {} vs {}</h1>\n",
            pair.index,
            pair.index + 1
        ));
        output.push_str("<ul>\n");
        output.push_str(&format!("  <li>{}</li>\n", escape_html(&pair.left_label)));
        output.push_str(&format!("  <li>{}</li>\n", escape_html(&pair.right_label)));
        output.push_str("</ul>\n");

        if pair.report.is_empty() {
            output.push_str("<p>No changes.</p>\n");
        } else {
            output.push_str(&render_html_table(&pair.report));
        }

        let command = format!("rm \"{}\"", pair.left_label);
        output.push_str(&format!("<pre>{}</pre>\n", escape_html(&command)));
    }

    output.push_str("</body>\n</html>\n");
    output
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
