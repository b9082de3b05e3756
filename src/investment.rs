// Composite 0-100 investment score per area.
use crate::bands::{price_segment, RATING};
use crate::error::AnalysisError;
use crate::stats::{average, min_max, min_max_fraction, round_to, sample_std};
use crate::types::{AreaScore, LabelCount, Observation, Record};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Areas with fewer monthly rows are not scored.
pub const MIN_MONTHS: usize = 12;
/// Tourism growth is only measured once an area has this many rows.
pub const GROWTH_MIN_MONTHS: usize = 24;

const W_GROWTH: f64 = 0.30;
const W_STABILITY: f64 = 0.25;
const W_LIQUIDITY: f64 = 0.20;
const W_TOURISM: f64 = 0.15;
const W_ATTRACTIVENESS: f64 = 0.10;

#[derive(Debug, Clone)]
pub struct InvestmentReport {
    /// Sorted by investment score, best first.
    pub scores: Vec<AreaScore>,
    pub global_mean_price: f64,
}

impl InvestmentReport {
    pub fn top(&self, n: usize) -> &[AreaScore] {
        &self.scores[..n.min(self.scores.len())]
    }

    /// Growing tourism while still priced below the market.
    pub fn emerging(&self) -> Vec<&AreaScore> {
        self.scores
            .iter()
            .filter(|s| s.tourism_growth_pct > 20.0 && s.avg_meter_price < self.global_mean_price)
            .collect()
    }

    /// Steady prices with regular turnover.
    pub fn stable(&self) -> Vec<&AreaScore> {
        self.scores
            .iter()
            .filter(|s| s.price_stability_pct > 80.0 && s.monthly_liquidity > 3.0)
            .collect()
    }

    pub fn rating_distribution(&self) -> Vec<LabelCount> {
        RATING
            .labels()
            .map(|label| LabelCount {
                label: label.to_string(),
                count: self.scores.iter().filter(|s| s.rating == label).count(),
            })
            .filter(|c| c.count > 0)
            .collect()
    }
}

/// Percent change of mean tourism from the years before `split_year` to the
/// years from `split_year` on. 0 when either side is empty or the earlier
/// mean is not positive.
pub fn tourism_growth(rows: &[&Observation], split_year: i32) -> f64 {
    let (recent, prior): (Vec<&&Observation>, Vec<&&Observation>) =
        rows.iter().partition(|r| r.period.year >= split_year);
    if recent.is_empty() || prior.is_empty() {
        return 0.0;
    }
    let mean_of = |v: &[&&Observation]| average(&v.iter().map(|r| r.tourism).collect::<Vec<_>>());
    let old = mean_of(&prior[..]);
    if old <= 0.0 {
        return 0.0;
    }
    (mean_of(&recent[..]) - old) / old * 100.0
}

pub fn price_stability(prices: &[f64]) -> f64 {
    let mean = average(prices);
    if mean <= 0.0 {
        return 0.0;
    }
    100.0 * (1.0 - sample_std(prices).unwrap_or(0.0) / mean)
}

pub fn price_attractiveness(area_mean: f64, global_mean: f64) -> f64 {
    if global_mean <= 0.0 {
        return 0.0;
    }
    (100.0 * (1.0 - area_mean / global_mean)).max(0.0)
}

pub fn composite_score(
    growth: f64,
    stability: f64,
    liquidity: f64,
    tourism_percentile: f64,
    attractiveness: f64,
) -> f64 {
    let raw = growth.clamp(-50.0, 100.0) * W_GROWTH
        + stability.max(0.0) * W_STABILITY
        + (liquidity * 10.0).min(100.0) * W_LIQUIDITY
        + tourism_percentile * W_TOURISM
        + attractiveness * W_ATTRACTIVENESS;
    round_to(raw, 2)
}

pub fn analyze(records: &[Record], split_year: i32) -> Result<InvestmentReport, AnalysisError> {
    let rows: Vec<Observation> = records
        .iter()
        .filter_map(Record::observation)
        .filter(|o| o.area.is_some())
        .collect();

    let all_tourism: Vec<f64> = rows.iter().map(|r| r.tourism).collect();
    let all_price: Vec<f64> = rows.iter().map(|r| r.price).collect();
    let (tourism_min, tourism_max) = min_max(&all_tourism).unwrap_or((0.0, 0.0));
    let global_mean_price = average(&all_price);

    let mut by_area: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for r in &rows {
        if let Some(area) = r.area.as_deref() {
            by_area.entry(area).or_default().push(r);
        }
    }

    let mut scores: Vec<AreaScore> = Vec::new();
    for (area, group) in by_area {
        if group.len() < MIN_MONTHS {
            debug!(area, months = group.len(), "too few months to score");
            continue;
        }
        let months = group.len();
        let prices: Vec<f64> = group.iter().map(|r| r.price).collect();
        let tourism: Vec<f64> = group.iter().map(|r| r.tourism).collect();
        let transactions: f64 = group.iter().map(|r| r.transactions).sum();

        let growth = if months >= GROWTH_MIN_MONTHS {
            tourism_growth(&group, split_year)
        } else {
            0.0
        };
        let stability = price_stability(&prices);
        let liquidity = transactions / months as f64;
        let tourism_level = average(&tourism);
        let tourism_percentile = min_max_fraction(tourism_level, tourism_min, tourism_max) * 100.0;
        let area_mean_price = average(&prices);
        let attractiveness = price_attractiveness(area_mean_price, global_mean_price);

        let score = composite_score(growth, stability, liquidity, tourism_percentile, attractiveness);
        let avg_meter_price = round_to(area_mean_price, 2);

        scores.push(AreaScore {
            area: area.to_string(),
            investment_score: score,
            tourism_growth_pct: round_to(growth, 2),
            price_stability_pct: round_to(stability, 2),
            monthly_liquidity: round_to(liquidity, 2),
            tourism_level: round_to(tourism_level, 2),
            tourism_percentile: round_to(tourism_percentile, 2),
            price_attractiveness: round_to(attractiveness, 2),
            avg_meter_price,
            months,
            transactions: transactions as u64,
            rating: RATING.classify(score).to_string(),
            price_segment: price_segment(avg_meter_price).map(str::to_string),
        });
    }

    if scores.is_empty() {
        return Err(AnalysisError::NoScorableAreas);
    }

    scores.sort_by(|a, b| {
        b.investment_score
            .partial_cmp(&a.investment_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.area.cmp(&b.area))
    });

    Ok(InvestmentReport {
        scores,
        global_mean_price,
    })
}
