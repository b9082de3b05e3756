use crate::util::{fmt2, fmt3, fmt_opt2, fmt_opt3, fmt_opt_label};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV line as it comes off the reader, before any parsing.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "area_name_en")]
    pub area_name: Option<String>,
    #[serde(rename = "property_type_en")]
    pub property_type: Option<String>,
    #[serde(rename = "year_month")]
    pub year_month: Option<String>,
    #[serde(rename = "tourism_activity")]
    pub tourism_activity: Option<String>,
    #[serde(rename = "avg_meter_price")]
    pub avg_meter_price: Option<String>,
    #[serde(rename = "transactions_count")]
    pub transactions_count: Option<String>,
}

/// Calendar month of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn quarter(&self) -> u32 {
        (self.month - 1) / 3 + 1
    }
}

/// A parsed row. Any field may be missing; each pass projects the records it
/// can use through [`Record::price_point`] or [`Record::observation`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub area: Option<String>,
    pub property_type: Option<String>,
    pub period: Option<Period>,
    pub tourism: Option<f64>,
    pub price: Option<f64>,
    pub transactions: Option<f64>,
}

impl Record {
    pub fn price_point(&self) -> Option<PricePoint> {
        Some(PricePoint {
            area: self.area.clone()?,
            property_type: self.property_type.clone()?,
            tourism: self.tourism?,
            price: self.price?,
        })
    }

    pub fn observation(&self) -> Option<Observation> {
        Some(Observation {
            area: self.area.clone(),
            property_type: self.property_type.clone(),
            period: self.period?,
            tourism: self.tourism?,
            price: self.price?,
            transactions: self.transactions?,
        })
    }
}

/// Correlation view: every categorical and numeric field present.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub area: String,
    pub property_type: String,
    pub tourism: f64,
    pub price: f64,
}

/// Time-series view used by the scoring, seasonal and risk passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub area: Option<String>,
    pub property_type: Option<String>,
    pub period: Period,
    pub tourism: f64,
    pub price: f64,
    pub transactions: f64,
}

#[derive(Debug, Serialize, Clone)]
pub struct OverallCorrelation {
    pub records: usize,
    pub correlation: Option<f64>,
    pub p_value: Option<f64>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PropertyCorrelation {
    #[serde(rename = "Property Type")]
    #[tabled(rename = "Property Type")]
    pub property_type: String,
    #[serde(rename = "Correlation")]
    #[tabled(rename = "Correlation", display_with = "fmt3")]
    pub correlation: f64,
    #[serde(rename = "Transactions")]
    #[tabled(rename = "Transactions")]
    pub transactions: usize,
    #[serde(rename = "Avg Tourism")]
    #[tabled(rename = "Avg Tourism", display_with = "fmt2")]
    pub avg_tourism: f64,
    #[serde(rename = "Avg Price")]
    #[tabled(rename = "Avg Price", display_with = "fmt2")]
    pub avg_price: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AreaCorrelation {
    #[serde(rename = "Area")]
    #[tabled(rename = "Area")]
    pub area: String,
    #[serde(rename = "Correlation")]
    #[tabled(rename = "Correlation", display_with = "fmt3")]
    pub correlation: f64,
    #[serde(rename = "Observations")]
    #[tabled(rename = "Observations")]
    pub observations: usize,
    #[serde(rename = "Avg Tourism")]
    #[tabled(rename = "Avg Tourism", display_with = "fmt2")]
    pub avg_tourism: f64,
    #[serde(rename = "Avg Price")]
    #[tabled(rename = "Avg Price", display_with = "fmt2")]
    pub avg_price: f64,
    #[serde(rename = "Impact Class")]
    #[tabled(rename = "Impact Class")]
    pub impact_class: String,
}

/// Label frequency, used for the pie-chart distributions.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct LabelCount {
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AreaScore {
    #[serde(rename = "Area")]
    #[tabled(rename = "Area")]
    pub area: String,
    #[serde(rename = "Investment Score")]
    #[tabled(rename = "Investment Score", display_with = "fmt2")]
    pub investment_score: f64,
    #[serde(rename = "Tourism Growth %")]
    #[tabled(rename = "Tourism Growth %", display_with = "fmt2")]
    pub tourism_growth_pct: f64,
    #[serde(rename = "Price Stability %")]
    #[tabled(rename = "Price Stability %", display_with = "fmt2")]
    pub price_stability_pct: f64,
    #[serde(rename = "Monthly Liquidity")]
    #[tabled(rename = "Monthly Liquidity", display_with = "fmt2")]
    pub monthly_liquidity: f64,
    #[serde(rename = "Tourism Level")]
    #[tabled(skip)]
    pub tourism_level: f64,
    #[serde(rename = "Tourism Percentile")]
    #[tabled(skip)]
    pub tourism_percentile: f64,
    #[serde(rename = "Price Attractiveness")]
    #[tabled(skip)]
    pub price_attractiveness: f64,
    #[serde(rename = "Avg Meter Price")]
    #[tabled(rename = "Avg Meter Price", display_with = "fmt2")]
    pub avg_meter_price: f64,
    #[serde(rename = "Months")]
    #[tabled(skip)]
    pub months: usize,
    #[serde(rename = "Transactions")]
    #[tabled(skip)]
    pub transactions: u64,
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Price Segment")]
    #[tabled(rename = "Price Segment", display_with = "fmt_opt_label")]
    pub price_segment: Option<String>,
}

/// Aggregate of every observation falling in one (year, month).
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub avg_meter_price: f64,
    pub tourism_activity: f64,
    pub transactions_count: f64,
    pub areas: usize,
}

/// One calendar month aggregated over all years.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyPattern {
    #[tabled(skip)]
    pub month: u32,
    #[tabled(rename = "Month")]
    pub month_name: String,
    #[tabled(skip)]
    pub quarter: u32,
    #[tabled(rename = "Price Mean", display_with = "fmt2")]
    pub price_mean: f64,
    #[tabled(rename = "Price Std", display_with = "fmt_opt2")]
    pub price_std: Option<f64>,
    #[tabled(skip)]
    pub price_min: f64,
    #[tabled(skip)]
    pub price_max: f64,
    #[tabled(rename = "Tourism Mean", display_with = "fmt2")]
    pub tourism_mean: f64,
    #[tabled(rename = "Transactions Mean", display_with = "fmt2")]
    pub transactions_mean: f64,
    #[tabled(skip)]
    pub areas_mean: f64,
    #[tabled(rename = "Buy Score", display_with = "fmt2")]
    pub buy_score: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SeasonComparison {
    #[tabled(rename = "Winter Price", display_with = "fmt2")]
    pub winter_price: f64,
    #[tabled(rename = "Summer Price", display_with = "fmt2")]
    pub summer_price: f64,
    #[tabled(rename = "Better Season")]
    pub better_season: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PropertyTiming {
    #[tabled(rename = "Property Type")]
    pub property_type: String,
    #[tabled(rename = "Best Price Month")]
    pub best_price_month: String,
    #[tabled(rename = "Best Price", display_with = "fmt2")]
    pub best_price: f64,
    #[tabled(rename = "Highest Activity Month")]
    pub highest_activity_month: String,
    #[tabled(rename = "Activity", display_with = "fmt2")]
    pub activity: f64,
    #[tabled(rename = "Saving %", display_with = "fmt2")]
    pub saving_pct: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AreaRisk {
    #[tabled(rename = "Area")]
    pub area: String,
    #[tabled(rename = "Risk Score")]
    pub risk_score: u32,
    #[tabled(rename = "Price Volatility", display_with = "fmt3")]
    pub price_volatility: f64,
    #[tabled(rename = "Lagged Corr", display_with = "fmt_opt3")]
    pub tourism_corr_lagged: Option<f64>,
    #[tabled(rename = "Avg Price", display_with = "fmt2")]
    pub avg_price: f64,
    #[tabled(rename = "Avg Transactions", display_with = "fmt2")]
    pub avg_transactions: f64,
    #[tabled(rename = "Notes")]
    pub notes: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AreaDependency {
    #[tabled(rename = "Area")]
    pub area: String,
    #[tabled(rename = "Lagged Dependency", display_with = "fmt_opt3")]
    pub tourism_dependency_lagged: Option<f64>,
    #[tabled(rename = "Avg Price", display_with = "fmt2")]
    pub avg_price: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AreaStability {
    #[tabled(rename = "Area")]
    pub area: String,
    #[serde(rename = "price_volatility_%")]
    #[tabled(rename = "Price Volatility %", display_with = "fmt2")]
    pub price_volatility_pct: f64,
    #[tabled(rename = "Stability Class")]
    pub stability_class: String,
    #[tabled(rename = "Avg Price", display_with = "fmt2")]
    pub avg_price: f64,
    #[tabled(rename = "Transactions")]
    pub transactions: u64,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub overall_correlation: Option<f64>,
    pub overall_p_value: Option<f64>,
    pub scored_areas: usize,
    pub emerging_areas: usize,
    pub stable_areas: usize,
    pub better_season: Option<String>,
    pub high_risk_areas: usize,
    pub stability_areas: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_from_month() {
        let q = |m| Period { year: 2023, month: m }.quarter();
        assert_eq!((q(1), q(3), q(4), q(9), q(12)), (1, 1, 2, 3, 4));
    }

    #[test]
    fn periods_order_chronologically() {
        let a = Period { year: 2021, month: 12 };
        let b = Period { year: 2022, month: 1 };
        assert!(a < b);
    }

    #[test]
    fn projections_require_their_columns() {
        let full = Record {
            area: Some("Marina".into()),
            property_type: Some("Unit".into()),
            period: Some(Period { year: 2022, month: 5 }),
            tourism: Some(1.5),
            price: Some(12_000.0),
            transactions: Some(4.0),
        };
        assert!(full.price_point().is_some());
        assert!(full.observation().is_some());

        let no_type = Record {
            property_type: None,
            ..full.clone()
        };
        assert!(no_type.price_point().is_none());
        // the time-series view tolerates a missing category
        assert!(no_type.observation().is_some());

        let no_period = Record {
            period: None,
            ..full
        };
        assert!(no_period.price_point().is_some());
        assert!(no_period.observation().is_none());
    }
}
