// Risk, lagged tourism dependency and price stability per area.
//
// Every metric here works on the smoothed series: within each area, rows are
// put in chronological order, price and tourism get a trailing rolling mean,
// and smoothed tourism is shifted back by a few months. Only rows where all
// three derived values exist take part.
use crate::bands::STABILITY;
use crate::stats::{average, lag, pearson, rolling_mean, round_to, sample_std};
use crate::types::{AreaDependency, AreaRisk, AreaStability, Observation, Record};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

pub const SMOOTHING_WINDOW: usize = 6;
pub const SMOOTHING_MIN_PERIODS: usize = 3;
pub const TOURISM_LAG: usize = 3;

/// Complete smoothed rows needed for the risk and dependency tables.
pub const MIN_RISK_ROWS: usize = 18;
/// Complete smoothed rows needed for the stability table.
pub const MIN_STABILITY_ROWS: usize = 24;

/// Areas at or above this score are counted as high risk.
pub const HIGH_RISK_SCORE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedRow {
    pub price_smooth: f64,
    pub tourism_lag: f64,
    pub transactions: f64,
}

#[derive(Debug, Clone)]
pub struct AreaSeries {
    pub area: String,
    pub rows: Vec<SmoothedRow>,
}

impl AreaSeries {
    fn prices(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.price_smooth).collect()
    }

    fn lag_correlation(&self) -> Option<f64> {
        let lagged: Vec<f64> = self.rows.iter().map(|r| r.tourism_lag).collect();
        pearson(&self.prices(), &lagged)
    }
}

#[derive(Debug, Clone)]
pub struct RiskReport {
    pub observations: usize,
    pub areas: usize,
    /// Mean of every defined smoothed price, across all areas.
    pub market_price: f64,
    /// Highest risk first.
    pub risk: Vec<AreaRisk>,
    pub dependency: Vec<AreaDependency>,
    /// Most stable first.
    pub stability: Vec<AreaStability>,
}

impl RiskReport {
    pub fn high_risk_count(&self) -> usize {
        self.risk.iter().filter(|r| r.risk_score >= HIGH_RISK_SCORE).count()
    }

    pub fn top_risk(&self, n: usize) -> &[AreaRisk] {
        &self.risk[..n.min(self.risk.len())]
    }
}

/// Smooth and lag one area's chronologically ordered rows.
///
/// Returns the complete rows plus every defined smoothed price (including the
/// edge rows the lag leaves incomplete) for the market mean.
pub fn smooth_area(rows: &[&Observation]) -> (Vec<SmoothedRow>, Vec<f64>) {
    let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
    let tourism: Vec<f64> = rows.iter().map(|r| r.tourism).collect();
    let price_smooth = rolling_mean(&prices, SMOOTHING_WINDOW, SMOOTHING_MIN_PERIODS);
    let tourism_smooth = rolling_mean(&tourism, SMOOTHING_WINDOW, SMOOTHING_MIN_PERIODS);
    let tourism_lag = lag(&tourism_smooth, TOURISM_LAG);

    let complete = rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            tourism_smooth[i]?;
            Some(SmoothedRow {
                price_smooth: price_smooth[i]?,
                tourism_lag: tourism_lag[i]?,
                transactions: r.transactions,
            })
        })
        .collect();
    let defined = price_smooth.into_iter().flatten().collect();
    (complete, defined)
}

pub fn assess_risk(series: &AreaSeries, market_price: f64) -> AreaRisk {
    let prices = series.prices();
    let price_mean = average(&prices);
    let price_vol = if price_mean > 0.0 {
        sample_std(&prices).unwrap_or(0.0) / price_mean
    } else {
        0.0
    };
    let corr = series.lag_correlation();
    let avg_tx = average(&series.rows.iter().map(|r| r.transactions).collect::<Vec<_>>());

    let penalties = [
        (price_vol > 0.4, 25, "High price volatility"),
        (corr.is_some_and(|c| c.abs() > 0.6), 25, "Lagged tourism sensitivity"),
        (avg_tx < 2.0, 20, "Low liquidity"),
        (price_mean > market_price * 1.4, 15, "Above market pricing"),
    ];
    let mut risk_score = 0u32;
    let mut notes = Vec::new();
    for (triggered, points, note) in penalties {
        if triggered {
            risk_score += points;
            notes.push(note);
        }
    }

    AreaRisk {
        area: series.area.clone(),
        risk_score,
        price_volatility: round_to(price_vol, 3),
        tourism_corr_lagged: corr.map(|c| round_to(c, 3)),
        avg_price: round_to(price_mean, 2),
        avg_transactions: round_to(avg_tx, 2),
        notes: notes.join(" | "),
    }
}

pub fn assess_dependency(series: &AreaSeries) -> AreaDependency {
    AreaDependency {
        area: series.area.clone(),
        tourism_dependency_lagged: series.lag_correlation().map(|c| round_to(c, 3)),
        avg_price: round_to(average(&series.prices()), 2),
    }
}

pub fn assess_stability(series: &AreaSeries) -> AreaStability {
    let prices = series.prices();
    let mean = average(&prices);
    let cv = if mean > 0.0 {
        sample_std(&prices).unwrap_or(0.0) / mean * 100.0
    } else {
        0.0
    };
    AreaStability {
        area: series.area.clone(),
        price_volatility_pct: round_to(cv, 2),
        stability_class: STABILITY.classify(cv).to_string(),
        avg_price: round_to(mean, 2),
        transactions: series.rows.iter().map(|r| r.transactions).sum::<f64>() as u64,
    }
}

pub fn analyze(records: &[Record]) -> RiskReport {
    let mut rows: Vec<Observation> = records
        .iter()
        .filter_map(Record::observation)
        .filter(|o| o.area.is_some())
        .collect();
    rows.sort_by(|a, b| a.area.cmp(&b.area).then(a.period.cmp(&b.period)));

    let mut by_area: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for r in &rows {
        if let Some(area) = r.area.as_deref() {
            by_area.entry(area).or_default().push(r);
        }
    }

    let mut all_smoothed: Vec<f64> = Vec::new();
    let mut series: Vec<AreaSeries> = Vec::new();
    for (area, group) in &by_area {
        let (complete, defined) = smooth_area(group);
        all_smoothed.extend(defined);
        series.push(AreaSeries {
            area: area.to_string(),
            rows: complete,
        });
    }
    let market_price = average(&all_smoothed);

    let mut risk = Vec::new();
    let mut dependency = Vec::new();
    let mut stability = Vec::new();
    for s in &series {
        if s.rows.len() < MIN_RISK_ROWS {
            debug!(area = %s.area, rows = s.rows.len(), "too few smoothed rows");
            continue;
        }
        risk.push(assess_risk(s, market_price));
        dependency.push(assess_dependency(s));
        if s.rows.len() >= MIN_STABILITY_ROWS {
            stability.push(assess_stability(s));
        }
    }

    risk.sort_by(|a, b| b.risk_score.cmp(&a.risk_score).then_with(|| a.area.cmp(&b.area)));
    stability.sort_by(|a, b| {
        a.price_volatility_pct
            .partial_cmp(&b.price_volatility_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.area.cmp(&b.area))
    });

    RiskReport {
        observations: rows.len(),
        areas: by_area.len(),
        market_price,
        risk,
        dependency,
        stability,
    }
}
