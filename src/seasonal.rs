// Calendar-month buy timing, winter/summer comparison and per-type timing.
use crate::bands::better_season;
use crate::stats::{average, min_max, min_max_fraction, round_to, sample_std};
use crate::types::{MonthlyPattern, MonthlyStat, Observation, Period, PropertyTiming, Record, SeasonComparison};
use crate::util::month_name;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Property types need at least this many rows for a timing entry.
pub const MIN_PROPERTY_ROWS: usize = 100;

const WINTER: [u32; 3] = [12, 1, 2];
const SUMMER: [u32; 3] = [6, 7, 8];

const W_PRICE: f64 = 40.0;
const VOLATILITY_CAP: f64 = 30.0;
const W_TRANSACTIONS: f64 = 20.0;
const W_TOURISM: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct SeasonalReport {
    pub observations: usize,
    pub year_range: Option<(i32, i32)>,
    /// One row per (year, month), chronological.
    pub monthly_stats: Vec<MonthlyStat>,
    /// One row per calendar month, lowest buy score first.
    pub patterns: Vec<MonthlyPattern>,
    pub season: Option<SeasonComparison>,
    pub property_timing: Vec<PropertyTiming>,
}

/// Sum of the four buy-score components.
///
/// The fractions are min-max positions among the calendar months; a cheaper
/// month has a lower price fraction and therefore a lower score.
pub fn weighted_buy_score(price_frac: f64, volatility: f64, transactions_frac: f64, tourism_frac: f64) -> f64 {
    price_frac * W_PRICE
        + (volatility * 100.0).min(VOLATILITY_CAP)
        + transactions_frac * W_TRANSACTIONS
        + tourism_frac * W_TOURISM
}

fn monthly_stats(rows: &[Observation]) -> Vec<MonthlyStat> {
    #[derive(Default)]
    struct Acc<'a> {
        prices: Vec<f64>,
        tourism: Vec<f64>,
        transactions: f64,
        areas: BTreeSet<&'a str>,
    }

    let mut map: BTreeMap<Period, Acc<'_>> = BTreeMap::new();
    for r in rows {
        let e = map.entry(r.period).or_default();
        e.prices.push(r.price);
        e.tourism.push(r.tourism);
        e.transactions += r.transactions;
        if let Some(area) = r.area.as_deref() {
            e.areas.insert(area);
        }
    }

    map.into_iter()
        .map(|(period, acc)| MonthlyStat {
            year: period.year,
            month: period.month,
            month_name: month_name(period.month).to_string(),
            avg_meter_price: average(&acc.prices),
            tourism_activity: average(&acc.tourism),
            transactions_count: acc.transactions,
            areas: acc.areas.len(),
        })
        .collect()
}

fn monthly_patterns(stats: &[MonthlyStat]) -> Vec<MonthlyPattern> {
    let mut by_month: BTreeMap<u32, Vec<&MonthlyStat>> = BTreeMap::new();
    for s in stats {
        by_month.entry(s.month).or_default().push(s);
    }

    let mut patterns: Vec<MonthlyPattern> = by_month
        .into_iter()
        .map(|(month, group)| {
            let prices: Vec<f64> = group.iter().map(|s| s.avg_meter_price).collect();
            let tourism: Vec<f64> = group.iter().map(|s| s.tourism_activity).collect();
            let tx: Vec<f64> = group.iter().map(|s| s.transactions_count).collect();
            let areas: Vec<f64> = group.iter().map(|s| s.areas as f64).collect();
            let (lo, hi) = min_max(&prices).unwrap_or((0.0, 0.0));
            MonthlyPattern {
                month,
                month_name: month_name(month).to_string(),
                quarter: Period { year: 0, month }.quarter(),
                price_mean: round_to(average(&prices), 2),
                price_std: sample_std(&prices).map(|s| round_to(s, 2)),
                price_min: round_to(lo, 2),
                price_max: round_to(hi, 2),
                tourism_mean: round_to(average(&tourism), 2),
                transactions_mean: round_to(average(&tx), 2),
                areas_mean: round_to(average(&areas), 2),
                buy_score: 0.0,
            }
        })
        .collect();

    let price_range = spread(&patterns, |p| p.price_mean);
    let tx_range = spread(&patterns, |p| p.transactions_mean);
    let tourism_range = spread(&patterns, |p| p.tourism_mean);

    for p in &mut patterns {
        let volatility = if p.price_mean > 0.0 {
            p.price_std.unwrap_or(0.0) / p.price_mean
        } else {
            1.0
        };
        let score = weighted_buy_score(
            min_max_fraction(p.price_mean, price_range.0, price_range.1),
            volatility,
            min_max_fraction(p.transactions_mean, tx_range.0, tx_range.1),
            min_max_fraction(p.tourism_mean, tourism_range.0, tourism_range.1),
        );
        p.buy_score = round_to(score, 2);
    }

    patterns.sort_by(|a, b| {
        a.buy_score
            .partial_cmp(&b.buy_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.month.cmp(&b.month))
    });
    patterns
}

fn spread(patterns: &[MonthlyPattern], f: impl Fn(&MonthlyPattern) -> f64) -> (f64, f64) {
    min_max(&patterns.iter().map(f).collect::<Vec<_>>()).unwrap_or((0.0, 0.0))
}

fn season_comparison(rows: &[Observation]) -> Option<SeasonComparison> {
    let mean_in = |months: &[u32]| {
        let prices: Vec<f64> = rows
            .iter()
            .filter(|r| months.contains(&r.period.month))
            .map(|r| r.price)
            .collect();
        (!prices.is_empty()).then(|| average(&prices))
    };
    let winter_price = mean_in(&WINTER[..])?;
    let summer_price = mean_in(&SUMMER[..])?;
    Some(SeasonComparison {
        winter_price,
        summer_price,
        better_season: better_season(winter_price, summer_price).to_string(),
    })
}

fn property_timing(rows: &[Observation]) -> Vec<PropertyTiming> {
    let mut by_type: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for r in rows {
        if let Some(t) = r.property_type.as_deref() {
            by_type.entry(t).or_default().push(r);
        }
    }

    by_type
        .into_iter()
        .filter(|(_, group)| group.len() >= MIN_PROPERTY_ROWS)
        .filter_map(|(ptype, group)| {
            let mut by_month: BTreeMap<u32, (Vec<f64>, f64)> = BTreeMap::new();
            for r in group {
                let e = by_month.entry(r.period.month).or_default();
                e.0.push(r.price);
                e.1 += r.transactions;
            }
            let months: Vec<(u32, f64, f64)> = by_month
                .into_iter()
                .map(|(m, (prices, tx))| (m, average(&prices), tx))
                .collect();

            // first minimum / first maximum in calendar order
            let mut cheapest = *months.first()?;
            let mut busiest = cheapest;
            let mut priciest = cheapest.1;
            for &m in &months[1..] {
                if m.1 < cheapest.1 {
                    cheapest = m;
                }
                if m.2 > busiest.2 {
                    busiest = m;
                }
                priciest = priciest.max(m.1);
            }
            let saving_pct = if cheapest.1 > 0.0 {
                (priciest - cheapest.1) / cheapest.1 * 100.0
            } else {
                0.0
            };

            Some(PropertyTiming {
                property_type: ptype.to_string(),
                best_price_month: month_name(cheapest.0).to_string(),
                best_price: cheapest.1,
                highest_activity_month: month_name(busiest.0).to_string(),
                activity: busiest.2,
                saving_pct,
            })
        })
        .collect()
}

pub fn analyze(records: &[Record]) -> SeasonalReport {
    let rows: Vec<Observation> = records.iter().filter_map(Record::observation).collect();
    let years = rows.iter().map(|r| r.period.year);
    let year_range = years.clone().min().zip(years.max());

    let monthly_stats = monthly_stats(&rows);
    let patterns = monthly_patterns(&monthly_stats);

    SeasonalReport {
        observations: rows.len(),
        year_range,
        season: season_comparison(&rows),
        property_timing: property_timing(&rows),
        monthly_stats,
        patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(area: &str, ptype: &str, year: i32, month: u32, price: f64, tx: f64, tourism: f64) -> Record {
        Record {
            area: Some(area.into()),
            property_type: Some(ptype.into()),
            period: Some(Period { year, month }),
            tourism: Some(tourism),
            price: Some(price),
            transactions: Some(tx),
        }
    }

    #[test]
    fn buy_score_is_monotonic_in_each_component() {
        let base = weighted_buy_score(0.5, 0.1, 0.5, 0.5);
        assert!(weighted_buy_score(0.6, 0.1, 0.5, 0.5) > base);
        assert!(weighted_buy_score(0.5, 0.15, 0.5, 0.5) > base);
        assert!(weighted_buy_score(0.5, 0.1, 0.6, 0.5) > base);
        assert!(weighted_buy_score(0.5, 0.1, 0.5, 0.6) > base);
        // volatility contribution saturates at 30
        assert_eq!(weighted_buy_score(0.0, 0.5, 0.0, 0.0), 30.0);
        assert_eq!(weighted_buy_score(1.0, 0.0, 1.0, 1.0), 70.0);
    }

    #[test]
    fn monthly_stats_group_by_year_and_month() {
        let records = vec![
            obs("A", "Unit", 2022, 1, 100.0, 2.0, 1.0),
            obs("B", "Unit", 2022, 1, 300.0, 3.0, 3.0),
            obs("A", "Unit", 2022, 1, 200.0, 1.0, 2.0),
            obs("A", "Unit", 2021, 1, 50.0, 1.0, 1.0),
        ];
        let report = analyze(&records);
        assert_eq!(report.monthly_stats.len(), 2);
        let jan22 = &report.monthly_stats[1];
        assert_eq!((jan22.year, jan22.month), (2022, 1));
        assert_eq!(jan22.avg_meter_price, 200.0);
        assert_eq!(jan22.transactions_count, 6.0);
        assert_eq!(jan22.areas, 2);
        assert_eq!(report.year_range, Some((2021, 2022)));
    }

    #[test]
    fn patterns_sorted_cheapest_first() {
        // one year, prices rise through the year, flat volume and tourism
        let records: Vec<Record> = (1..=12)
            .map(|m| obs("A", "Unit", 2022, m, 1_000.0 + m as f64 * 100.0, 1.0, 1.0))
            .collect();
        let report = analyze(&records);
        assert_eq!(report.patterns.len(), 12);
        assert_eq!(report.patterns[0].month_name, "Jan");
        assert_eq!(report.patterns[0].buy_score, 0.0);
        assert_eq!(report.patterns[11].month_name, "Dec");
        assert_eq!(report.patterns[11].buy_score, 40.0);
        // single year: no spread to measure
        assert!(report.patterns.iter().all(|p| p.price_std.is_none()));
        assert_eq!(report.patterns[11].quarter, 4);
    }

    #[test]
    fn cross_year_volatility_feeds_the_score() {
        let records = vec![
            obs("A", "Unit", 2021, 3, 900.0, 1.0, 1.0),
            obs("A", "Unit", 2022, 3, 1_100.0, 1.0, 1.0),
            obs("A", "Unit", 2021, 4, 1_000.0, 1.0, 1.0),
            obs("A", "Unit", 2022, 4, 1_000.0, 1.0, 1.0),
        ];
        let report = analyze(&records);
        let mar = report.patterns.iter().find(|p| p.month == 3).unwrap();
        let apr = report.patterns.iter().find(|p| p.month == 4).unwrap();
        assert_eq!(mar.price_std, Some(141.42));
        // same mean price, so only volatility differs: 141.42 / 1000 * 100
        assert_eq!(mar.buy_score, 14.14);
        assert_eq!(apr.buy_score, 0.0);
        assert_eq!(report.patterns[0].month, 4);
    }

    #[test]
    fn cheaper_summer_is_better_season() {
        let records = vec![
            obs("A", "Unit", 2022, 1, 9_000.0, 1.0, 1.0),
            obs("A", "Unit", 2022, 12, 9_000.0, 1.0, 1.0),
            obs("A", "Unit", 2022, 7, 8_000.0, 1.0, 1.0),
            obs("A", "Unit", 2022, 8, 9_000.0, 1.0, 1.0),
        ];
        let season = analyze(&records).season.unwrap();
        assert_eq!(season.winter_price, 9_000.0);
        assert_eq!(season.summer_price, 8_500.0);
        assert_eq!(season.better_season, "Summer");
    }

    #[test]
    fn missing_season_skips_comparison() {
        let records = vec![obs("A", "Unit", 2022, 1, 9_000.0, 1.0, 1.0)];
        assert!(analyze(&records).season.is_none());
    }

    #[test]
    fn property_timing_needs_one_hundred_rows() {
        let mut records = Vec::new();
        for i in 0..120 {
            let month = (i % 12) as u32 + 1;
            // March cheapest, October busiest
            let price = if month == 3 { 800.0 } else if month == 9 { 1_200.0 } else { 1_000.0 };
            let tx = if month == 10 { 9.0 } else { 1.0 };
            records.push(obs("A", "Villa", 2015 + (i / 12) as i32, month, price, tx, 1.0));
        }
        for i in 0..99 {
            records.push(obs("A", "Land", 2022, (i % 12) as u32 + 1, 500.0, 1.0, 1.0));
        }
        let timing = analyze(&records).property_timing;
        assert_eq!(timing.len(), 1);
        let villa = &timing[0];
        assert_eq!(villa.property_type, "Villa");
        assert_eq!(villa.best_price_month, "Mar");
        assert_eq!(villa.highest_activity_month, "Oct");
        assert_eq!(villa.activity, 90.0);
        assert!((villa.saving_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rerun_is_identical() {
        let records: Vec<Record> = (0..36)
            .map(|i| obs("A", "Unit", 2020 + i / 12, (i % 12) as u32 + 1, 900.0 + (i * 7 % 13) as f64, 2.0, 3.0))
            .collect();
        let a = analyze(&records);
        let b = analyze(&records);
        let scores = |r: &SeasonalReport| -> Vec<(u32, f64)> {
            r.patterns.iter().map(|p| (p.month, p.buy_score)).collect()
        };
        assert_eq!(scores(&a), scores(&b));
        assert_eq!(a.monthly_stats, b.monthly_stats);
    }
}
