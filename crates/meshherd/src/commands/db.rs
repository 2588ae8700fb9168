//! Database inspection.

use std::fmt::Write as _;

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use meshherd_core::Controller;

use crate::cli::{DbArgs, DbCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct KindCount {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Records")]
    count: usize,
}

#[derive(Serialize)]
struct DbSummary {
    path: String,
    total: usize,
    /// Lines with an id but no recognized type, kept as-is.
    untyped: usize,
    kinds: Vec<KindCount>,
}

fn detail(summary: &DbSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Database: {}", summary.path);
    if !summary.kinds.is_empty() {
        let _ = writeln!(out, "{}", Table::new(&summary.kinds).with(Style::rounded()));
    }
    if summary.untyped > 0 {
        let _ = writeln!(out, "Untyped: {}", summary.untyped);
    }
    let _ = write!(out, "Total: {}", summary.total);
    out
}

pub fn handle(controller: &Controller, args: &DbArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DbCommand::Inspect => {
            let store = controller.store();
            let summary = DbSummary {
                path: store.path().display().to_string(),
                total: store.len(),
                untyped: store.opaque_len(),
                kinds: store
                    .kind_counts()
                    .into_iter()
                    .map(|(kind, count)| KindCount {
                        kind: kind.to_string(),
                        count,
                    })
                    .collect(),
            };
            let out = output::render_single(&global.output, &summary, detail, |s| s.total.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
