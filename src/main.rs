// Entry point and high-level CLI flow.
//
// - Option [1] loads the merged real-estate/tourism CSV and prints diagnostics.
// - Option [2] runs the correlation, investment, seasonal and risk passes,
//   writing CSV tables, HTML charts and a JSON summary.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
mod bands;
mod chart;
mod config;
mod correlation;
mod error;
mod investment;
mod loader;
mod output;
mod reports;
mod risk;
mod seasonal;
mod stats;
mod types;
mod util;

use config::AppConfig;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing::error;
use tracing_subscriber::EnvFilter;
use types::Record;

// Simple in-memory app state so we only load the CSV once but can
// generate reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<Record>>,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the CSV and keep the parsed records in `APP_STATE`.
fn handle_load(cfg: &AppConfig) {
    println!("Loading merged dataset...");
    match loader::load_records(&cfg.input_path) {
        Ok((data, load_report)) => {
            println!(
                "Processing dataset... ({} rows loaded)",
                util::format_int(load_report.total_rows)
            );
            if load_report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(load_report.parse_errors)
                );
            }
            if load_report.invalid_cells > 0 {
                println!(
                    "Info: {} unusable values treated as missing.",
                    util::format_int(load_report.invalid_cells)
                );
            }
            println!();
            app_state().data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: run every analysis pass.
///
/// Returns `false` when the run was aborted.
fn handle_generate_reports(cfg: &AppConfig) -> bool {
    let data = app_state().data.clone();
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return true;
    };

    println!("Generating reports...");
    println!(
        "Tables saved to {}, charts saved to {}\n",
        cfg.reports_dir.display(),
        cfg.charts_dir.display()
    );

    match reports::run_all(&data, cfg) {
        Ok(summary) => {
            println!("Summary Stats (summary.json):");
            println!(
                "{{\"scored_areas\": {}, \"emerging\": {}, \"stable\": {}, \"high_risk\": {}}}\n",
                summary.scored_areas, summary.emerging_areas, summary.stable_areas, summary.high_risk_areas
            );
            true
        }
        Err(e) if e.aborts_run() => {
            error!(error = %e, "report generation aborted");
            false
        }
        Err(e) => {
            eprintln!("Report error: {}\n", e);
            true
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cfg = match config::load_config(config::DEFAULT_CONFIG_PATH) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    loop {
        println!("Tourism & Real Estate Analysis:");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice() else {
            println!("Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&cfg),
            "2" => {
                println!();
                if !handle_generate_reports(&cfg) {
                    println!("Exiting the program.");
                    break;
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
