use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, ContentArrangement, Row, Table};
use formsync_rs_sdk::SyncReport;
use std::io::{IsTerminal, Write};

/// A single status line rewritten in place. Silent when stdout is not a TTY.
pub struct StatusLine {
    enabled: bool,
    dirty: bool,
}

impl StatusLine {
    pub fn stdout() -> Self {
        Self {
            enabled: std::io::stdout().is_terminal(),
            dirty: false,
        }
    }

    pub fn update(&mut self, message: &str) {
        if !self.enabled {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r\x1b[2K{message}");
        let _ = stdout.flush();
        self.dirty = true;
    }

    pub fn finish(&mut self) {
        if self.dirty {
            println!();
            self.dirty = false;
        }
    }
}

pub fn print_sync_report(report: &SyncReport) {
    println!("{}", sync_report_table(report));
    println!(
        "synced {} records across {} forms for {}",
        report.total_records(),
        report.forms.len(),
        report.account.name
    );
}

pub fn print_event_counts(counts: &[(&str, usize)]) {
    let mut table = new_table();
    table.set_header(Row::from(vec![Cell::new("event"), Cell::new("count")]));
    for (event, count) in counts {
        table.add_row(Row::from(vec![Cell::new(event), Cell::new(count)]));
    }
    println!("{table}");
}

fn sync_report_table(report: &SyncReport) -> Table {
    let mut table = new_table();
    table.set_header(Row::from(vec![
        Cell::new("form"),
        Cell::new("tables"),
        Cell::new("records"),
    ]));
    for form in &report.forms {
        table.add_row(Row::from(vec![
            Cell::new(&form.form_name),
            Cell::new(form.tables),
            Cell::new(form.records),
        ]));
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}
