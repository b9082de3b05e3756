// Runs the four analysis passes in order, writing each pass's tables, charts
// and console previews as it goes.
//
// Passes are independent: each one re-filters the loaded records for the
// columns it needs. The only fatal outcome is the investment pass finding no
// area to score, which stops the run before the seasonal and risk passes.
use crate::chart;
use crate::config::AppConfig;
use crate::correlation::{self, CorrelationReport};
use crate::error::AnalysisError;
use crate::investment::{self, InvestmentReport};
use crate::output;
use crate::risk::{self, RiskReport};
use crate::seasonal::{self, SeasonalReport};
use crate::types::{Record, RunSummary};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

fn save_csv<T: Serialize>(dir: &Path, file: &str, rows: &[T]) {
    let path = dir.join(file);
    match output::write_csv(&path, rows) {
        Ok(()) => info!(path = %path.display(), rows = rows.len(), "table written"),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn save_charts(dir: &Path, figures: Vec<(&str, chart::Figure)>) {
    if figures.is_empty() {
        warn!("no chartable rows, charts skipped");
        return;
    }
    if let Err(e) = chart::write_all(dir, figures) {
        eprintln!("Chart error: {}", e);
    }
}

pub fn correlation_pass(records: &[Record], cfg: &AppConfig) -> CorrelationReport {
    let report = correlation::analyze(records);
    println!("Report 1: Tourism Impact on Prices\n");
    println!("Records used for analysis: {}", format_int(report.overall.records));
    match (report.overall.correlation, report.overall.p_value) {
        (Some(r), Some(p)) => println!("Overall correlation: {:.4}\nP-value: {:.6}\n", r, p),
        (Some(r), None) => println!("Overall correlation: {:.4}\n", r),
        _ => println!("Overall correlation: undefined\n"),
    }

    println!("Correlation by Property Type (>50 rows)\n");
    output::preview_table_rows(&report.by_property, 5);
    println!("Top Impacted Areas (>30 rows)\n");
    output::preview_table_rows(report.top_areas(10), 5);

    save_csv(&cfg.reports_dir, "correlation_by_property_type.csv", &report.by_property);
    save_csv(&cfg.reports_dir, "correlation_by_area.csv", &report.by_area);
    save_charts(&cfg.charts_dir, chart::correlation_figures(&report));
    report
}

pub fn investment_pass(records: &[Record], cfg: &AppConfig) -> Result<InvestmentReport, AnalysisError> {
    let report = investment::analyze(records, cfg.growth_split_year)?;
    println!("Report 2: Area Investment Scores\n");
    println!("Top Investment Areas (>=12 months)\n");
    output::preview_table_rows(&report.scores, 5);
    println!(
        "Emerging areas: {} | Stable areas: {}\n",
        report.emerging().len(),
        report.stable().len()
    );

    save_csv(&cfg.reports_dir, "investment_scores.csv", &report.scores);
    save_csv(&cfg.reports_dir, "investment_ratings.csv", &report.rating_distribution());
    save_charts(&cfg.charts_dir, chart::investment_figures(&report));
    Ok(report)
}

pub fn seasonal_pass(records: &[Record], cfg: &AppConfig) -> SeasonalReport {
    let report = seasonal::analyze(records);
    println!("Report 3: Best Time to Buy\n");
    if let Some((lo, hi)) = report.year_range {
        println!("Records: {} | Years: {}-{}\n", format_int(report.observations), lo, hi);
    }
    println!("Months Ranked by Buy Score (lowest first)\n");
    output::preview_table_rows(&report.patterns, 12);
    match &report.season {
        Some(s) => {
            println!(
                "Winter avg price: {} | Summer avg price: {}",
                format_number(s.winter_price, 2),
                format_number(s.summer_price, 2)
            );
            println!("Better buying season: {}\n", s.better_season);
        }
        None => println!("Seasonal comparison skipped: winter or summer has no rows.\n"),
    }
    println!("Property timing calculated for {} types\n", report.property_timing.len());
    output::preview_table_rows(&report.property_timing, 5);

    save_csv(&cfg.reports_dir, "monthly_stats.csv", &report.monthly_stats);
    save_csv(&cfg.reports_dir, "monthly_buy_scores.csv", &report.patterns);
    if let Some(s) = &report.season {
        save_csv(&cfg.reports_dir, "season_comparison.csv", std::slice::from_ref(s));
    }
    save_csv(&cfg.reports_dir, "property_timing.csv", &report.property_timing);
    save_charts(&cfg.charts_dir, chart::seasonal_figures(&report));
    report
}

pub fn risk_pass(records: &[Record], cfg: &AppConfig) -> RiskReport {
    let report = risk::analyze(records);
    println!("Report 4: Area Risk, Dependency and Stability\n");
    println!(
        "Records loaded: {} | Areas detected: {}",
        format_int(report.observations),
        format_int(report.areas)
    );
    println!("Market smoothed mean price: {}", format_number(report.market_price, 2));
    println!("High risk areas detected: {}\n", report.high_risk_count());
    output::preview_table_rows(report.top_risk(15), 5);
    println!("Stability analysis completed: {} areas\n", report.stability.len());
    output::preview_table_rows(&report.stability, 5);

    save_csv(&cfg.reports_dir, "area_risk.csv", &report.risk);
    save_csv(&cfg.reports_dir, "area_dependency.csv", &report.dependency);
    save_csv(&cfg.reports_dir, "area_stability.csv", &report.stability);
    save_charts(&cfg.charts_dir, chart::risk_figures(&report));
    report
}

/// Run every pass and write `summary.json`.
///
/// Errors only when scoring finds no area; write failures are printed and skipped.
pub fn run_all(records: &[Record], cfg: &AppConfig) -> Result<RunSummary, AnalysisError> {
    let correlation = correlation_pass(records, cfg);
    let investment = match investment_pass(records, cfg) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "investment scoring aborted the run");
            println!("No valid areas for scoring");
            return Err(e);
        }
    };
    let seasonal = seasonal_pass(records, cfg);
    let risk = risk_pass(records, cfg);

    let summary = RunSummary {
        overall_correlation: correlation.overall.correlation,
        overall_p_value: correlation.overall.p_value,
        scored_areas: investment.scores.len(),
        emerging_areas: investment.emerging().len(),
        stable_areas: investment.stable().len(),
        better_season: seasonal.season.map(|s| s.better_season),
        high_risk_areas: risk.high_risk_count(),
        stability_areas: risk.stability.len(),
    };
    let path = cfg.reports_dir.join("summary.json");
    match output::write_json(&path, &summary) {
        Ok(()) => info!(path = %path.display(), "summary written"),
        Err(e) => eprintln!("Write error: {}", e),
    }
    Ok(summary)
}
