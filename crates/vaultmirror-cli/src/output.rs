//! Terminal output for humans or scripts
//!
//! Commands write through a [`Report`] so the same code path serves both
//! `--json` and the default human form.

use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

pub trait Report {
    /// Final line of a successful command
    fn done(&self, message: &str);
    fn warning(&self, message: &str);
    fn failure(&self, message: &str);
    /// Indented detail under the last headline; dropped in JSON mode
    fn detail(&self, message: &str);
    /// Machine-readable result; dropped in human mode
    fn document(&self, value: &Value);

    /// Titled list of non-zero counters, or one JSON object with all of them
    fn counts(&self, title: &str, rows: &[(&str, usize)]) {
        let object: serde_json::Map<String, Value> = rows
            .iter()
            .map(|(label, n)| (label.to_lowercase(), json!(n)))
            .collect();
        self.document(&Value::Object(object));

        self.done(title);
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, n) in rows.iter().filter(|(_, n)| *n > 0) {
            self.detail(&format!("{label:<width$}  {n}"));
        }
    }
}

pub struct HumanReport;

impl Report for HumanReport {
    fn done(&self, message: &str) {
        println!("\u{2713} {message}");
    }
    fn warning(&self, message: &str) {
        eprintln!("\u{26a0} {message}");
    }
    fn failure(&self, message: &str) {
        eprintln!("\u{2717} {message}");
    }
    fn detail(&self, message: &str) {
        println!("  {message}");
    }
    fn document(&self, _value: &Value) {}
}

/// Results on stdout, problems on stderr, one JSON value per line
pub struct JsonReport;

impl Report for JsonReport {
    fn done(&self, _message: &str) {}
    fn warning(&self, message: &str) {
        eprintln!("{}", json!({"level": "warning", "message": message}));
    }
    fn failure(&self, message: &str) {
        eprintln!("{}", json!({"level": "error", "message": message}));
    }
    fn detail(&self, _message: &str) {}
    fn document(&self, value: &Value) {
        println!("{value}");
    }
}

pub fn reporter(format: OutputFormat) -> Box<dyn Report> {
    match format {
        OutputFormat::Json => Box::new(JsonReport),
        OutputFormat::Human => Box::new(HumanReport),
    }
}

/// "1 file", "2 files"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
