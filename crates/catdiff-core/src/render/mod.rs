//! Text renderings of finished reports.

pub mod csv;
pub mod html;

pub use self::csv::render_csv;
pub use self::html::{render_html_sequence, render_html_table};
