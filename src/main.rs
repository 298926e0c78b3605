mod app;
mod commit;
mod config;
mod modules;
mod scan;
mod ui;
mod viewport;

use crate::app::{App, LogLevel};
use anyhow::{Context, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    let module_dir = PathBuf::from(config::MODULE_DIR);
    let scan = scan::scan_modules(&module_dir)
        .with_context(|| format!("scan module directory {}", module_dir.display()))?;

    let mut app = App::new(module_dir, scan);
    ui::run(&mut app)?;

    report_outcome(&app);
    Ok(())
}

fn report_outcome(app: &App) {
    for entry in &app.logs {
        match entry.level {
            LogLevel::Info => {}
            LogLevel::Warn => eprintln!("warning: {}", entry.message),
            LogLevel::Error => eprintln!("error: {}", entry.message),
        }
    }

    match &app.report {
        None => println!("No changes saved."),
        Some(report) if report.is_clean() => {
            println!("Saved {} module(s).", report.applied.len());
        }
        Some(report) => {
            println!(
                "Saved {} module(s); {} operation(s) failed (see above).",
                report.applied.len(),
                report.failures.len()
            );
        }
    }

    if let Some(report) = &app.report {
        if let Err(err) = commit::save_report(report) {
            eprintln!("warning: commit report not saved: {err}");
        }
    }
}
