// Static interactive charts.
//
// A `Figure` is a Plotly figure (traces + layout) kept as JSON. Writing it
// produces a standalone HTML page that pulls plotly.js from the CDN, so the
// files open in any browser without a local install.
use crate::correlation::CorrelationReport;
use crate::error::AnalysisError;
use crate::investment::InvestmentReport;
use crate::risk::RiskReport;
use crate::seasonal::SeasonalReport;
use crate::types::LabelCount;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    fn new(title: &str, data: Vec<Value>) -> Self {
        Figure {
            title: title.to_string(),
            data,
            layout: json!({
                "title": { "text": title, "x": 0.5 },
                "plot_bgcolor": "white",
            }),
        }
    }

    pub fn bar(title: &str, x: Vec<Value>, y: Vec<Value>) -> Self {
        Self::new(title, vec![json!({ "type": "bar", "x": x, "y": y })])
    }

    /// Horizontal bars listed top-down in the given order.
    pub fn hbar(title: &str, labels: Vec<String>, values: Vec<f64>) -> Self {
        let mut fig = Self::new(
            title,
            vec![json!({ "type": "bar", "orientation": "h", "x": values, "y": labels })],
        );
        fig.layout["yaxis"] = json!({ "autorange": "reversed" });
        fig
    }

    pub fn scatter(title: &str, x: Vec<f64>, y: Vec<f64>, opacity: f64) -> Self {
        Self::new(
            title,
            vec![json!({
                "type": "scatter",
                "mode": "markers",
                "x": x,
                "y": y,
                "marker": { "size": 6, "opacity": opacity },
            })],
        )
    }

    pub fn pie(title: &str, counts: &[LabelCount]) -> Self {
        let mut fig = Self::new(
            title,
            vec![json!({
                "type": "pie",
                "labels": counts.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
                "values": counts.iter().map(|c| c.count).collect::<Vec<_>>(),
                "textinfo": "percent+label",
            })],
        );
        if let Some(layout) = fig.layout.as_object_mut() {
            layout.remove("plot_bgcolor");
        }
        fig
    }

    /// One line per named series over shared x labels.
    pub fn lines(title: &str, x: &[String], series: Vec<(String, Vec<Option<f64>>)>) -> Self {
        let data = series
            .into_iter()
            .map(|(name, ys)| json!({ "type": "scatter", "mode": "lines", "name": name, "x": x, "y": ys }))
            .collect();
        Self::new(title, data)
    }

    pub fn axis_titles(mut self, x: &str, y: &str) -> Self {
        self.layout["xaxis"]["title"] = json!({ "text": x });
        self.layout["yaxis"]["title"] = json!({ "text": y });
        self
    }

    /// Dashed reference line at zero, vertical (`x = 0`) or horizontal (`y = 0`).
    pub fn zero_line(mut self, vertical: bool) -> Self {
        let shape = if vertical {
            json!({ "type": "line", "xref": "x", "yref": "paper", "x0": 0, "x1": 0, "y0": 0, "y1": 1,
                    "line": { "dash": "dash" } })
        } else {
            json!({ "type": "line", "xref": "paper", "yref": "y", "x0": 0, "x1": 1, "y0": 0, "y1": 0,
                    "line": { "dash": "dash" } })
        };
        self.layout["shapes"] = json!([shape]);
        self
    }

    /// Color markers of the first trace by a numeric column.
    pub fn color_by(mut self, values: Vec<f64>, scale: &str, label: &str) -> Self {
        if let Some(trace) = self.data.first_mut() {
            trace["marker"]["color"] = json!(values);
            trace["marker"]["colorscale"] = json!(scale);
            trace["marker"]["showscale"] = json!(true);
            trace["marker"]["colorbar"] = json!({ "title": { "text": label } });
        }
        self
    }

    pub fn trace_color(mut self, color: &str) -> Self {
        for trace in &mut self.data {
            trace["marker"]["color"] = json!(color);
        }
        self
    }

    pub fn to_html(&self) -> String {
        // keep user-supplied labels from closing the script element
        let data = Value::Array(self.data.clone()).to_string().replace("</", "<\\/");
        let layout = self.layout.to_string().replace("</", "<\\/");
        let title = self
            .title
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", title));
        html.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_CDN));
        html.push_str("</head>\n<body>\n<div id=\"chart\" style=\"width:100%;height:100vh;\"></div>\n");
        html.push_str("<script>\n");
        html.push_str(&format!(
            "Plotly.newPlot(\"chart\", {}, {}, {{\"responsive\": true}});\n",
            data, layout
        ));
        html.push_str("</script>\n</body>\n</html>\n");
        html
    }

    pub fn write_html(&self, path: &Path) -> Result<(), AnalysisError> {
        std::fs::write(path, self.to_html()).map_err(|e| AnalysisError::io(path, e))
    }
}

/// Write each named figure into `dir`; returns the paths written.
pub fn write_all(dir: &Path, figures: Vec<(&str, Figure)>) -> Result<Vec<PathBuf>, AnalysisError> {
    std::fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))?;
    let mut written = Vec::new();
    for (name, fig) in figures {
        let path = dir.join(format!("{name}.html"));
        fig.write_html(&path)?;
        debug!(path = %path.display(), "chart written");
        written.push(path);
    }
    info!(dir = %dir.display(), charts = written.len(), "charts rendered");
    Ok(written)
}

pub fn correlation_figures(report: &CorrelationReport) -> Vec<(&'static str, Figure)> {
    let mut figs = Vec::new();
    if !report.points.is_empty() {
        let title = match report.overall.correlation {
            Some(r) => format!("Overall Relationship (corr={:.3})", r),
            None => "Overall Relationship".to_string(),
        };
        figs.push((
            "chart-1.1",
            Figure::scatter(
                &title,
                report.points.iter().map(|p| p.tourism).collect(),
                report.points.iter().map(|p| p.price).collect(),
                0.3,
            )
            .axis_titles("Tourism Activity", "Average Meter Price"),
        ));
    }
    if !report.by_property.is_empty() {
        figs.push((
            "chart-1.2",
            Figure::bar(
                "Correlation by Property Type",
                report.by_property.iter().map(|p| json!(p.property_type)).collect(),
                report.by_property.iter().map(|p| json!(p.correlation)).collect(),
            )
            .zero_line(false),
        ));
    }
    if !report.by_area.is_empty() {
        let top = report.top_areas(10);
        figs.push((
            "chart-1.3",
            Figure::hbar(
                "Top 10 Areas by Tourism Impact",
                top.iter().map(|a| a.area.clone()).collect(),
                top.iter().map(|a| a.correlation).collect(),
            )
            .zero_line(true),
        ));
        figs.push(("chart-1.4", Figure::pie("Impact Distribution", &report.impact_distribution())));
    }
    figs
}

pub fn investment_figures(report: &InvestmentReport) -> Vec<(&'static str, Figure)> {
    if report.scores.is_empty() {
        return Vec::new();
    }
    let top = report.top(10);
    vec![
        (
            "chart-2.1",
            Figure::hbar(
                "Top 10 Investment Areas",
                top.iter().map(|s| s.area.clone()).collect(),
                top.iter().map(|s| s.investment_score).collect(),
            ),
        ),
        (
            "chart-2.2",
            Figure::pie("Investment Rating Distribution", &report.rating_distribution()),
        ),
        (
            "chart-2.3",
            Figure::scatter(
                "Price vs Investment Score (Tourism Growth Colored)",
                report.scores.iter().map(|s| s.avg_meter_price).collect(),
                report.scores.iter().map(|s| s.investment_score).collect(),
                0.7,
            )
            .color_by(
                report.scores.iter().map(|s| s.tourism_growth_pct).collect(),
                "RdYlGn",
                "Tourism Growth %",
            )
            .axis_titles("Avg Meter Price", "Investment Score"),
        ),
    ]
}

pub fn seasonal_figures(report: &SeasonalReport) -> Vec<(&'static str, Figure)> {
    let mut figs = Vec::new();
    if !report.monthly_stats.is_empty() {
        // month x year pivot of mean price
        let mut by_year: BTreeMap<i32, Vec<Option<f64>>> = BTreeMap::new();
        for s in &report.monthly_stats {
            by_year.entry(s.year).or_insert_with(|| vec![None; 12])[(s.month - 1) as usize] =
                Some(s.avg_meter_price);
        }
        let months: Vec<String> = (1..=12).map(|m| crate::util::month_name(m).to_string()).collect();
        let series = by_year.into_iter().map(|(y, ys)| (y.to_string(), ys)).collect();
        figs.push((
            "chart-3.1",
            Figure::lines("Monthly Price Trends", &months, series).axis_titles("Month", "Average Meter Price"),
        ));
    }
    if !report.patterns.is_empty() {
        figs.push((
            "chart-3.2",
            Figure::hbar(
                "Best Months to Buy",
                report.patterns.iter().map(|p| p.month_name.clone()).collect(),
                report.patterns.iter().map(|p| p.buy_score).collect(),
            )
            .axis_titles("Buy Score", "Month Name"),
        ));
    }
    if let Some(season) = &report.season {
        figs.push((
            "chart-3.3",
            Figure::bar(
                "Seasonal Price Comparison",
                vec![json!("Winter"), json!("Summer")],
                vec![json!(season.winter_price), json!(season.summer_price)],
            )
            .axis_titles("Season", "Average Price"),
        ));
    }
    figs
}

pub fn risk_figures(report: &RiskReport) -> Vec<(&'static str, Figure)> {
    let mut figs = Vec::new();
    if !report.risk.is_empty() {
        let top = report.top_risk(15);
        figs.push((
            "chart-3.4",
            Figure::hbar(
                "Top High Risk Areas",
                top.iter().map(|r| r.area.clone()).collect(),
                top.iter().map(|r| r.risk_score as f64).collect(),
            )
            .trace_color("#e74c3c")
            .axis_titles("Risk Score", "Area"),
        ));
    }
    let deps: Vec<_> = report
        .dependency
        .iter()
        .filter_map(|d| Some((d.tourism_dependency_lagged?, d.avg_price)))
        .collect();
    if !deps.is_empty() {
        figs.push((
            "chart-3.5",
            Figure::scatter(
                "Lagged Tourism Sensitivity vs Avg Price",
                deps.iter().map(|d| d.0).collect(),
                deps.iter().map(|d| d.1).collect(),
                0.7,
            )
            .trace_color("#3498db")
            .zero_line(true)
            .axis_titles("Lagged Tourism Dependency", "Average Price"),
        ));
    }
    if !report.stability.is_empty() {
        let counts: Vec<LabelCount> = crate::bands::STABILITY
            .labels()
            .map(|label| LabelCount {
                label: label.to_string(),
                count: report.stability.iter().filter(|s| s.stability_class == label).count(),
            })
            .filter(|c| c.count > 0)
            .collect();
        figs.push(("chart-3.6", Figure::pie("Price Stability Distribution", &counts)));
    }
    figs
}
