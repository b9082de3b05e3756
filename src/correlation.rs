// Tourism activity vs. price correlation, overall and per category.
use crate::bands::IMPACT;
use crate::stats::{average, pearson, pearson_p_value};
use crate::types::{AreaCorrelation, LabelCount, OverallCorrelation, PricePoint, PropertyCorrelation, Record};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Property types need strictly more rows than this to be reported.
pub const MIN_PROPERTY_ROWS: usize = 50;
/// Areas need strictly more rows than this to be reported.
pub const MIN_AREA_ROWS: usize = 30;

#[derive(Debug, Clone)]
pub struct CorrelationReport {
    pub points: Vec<PricePoint>,
    pub overall: OverallCorrelation,
    pub by_property: Vec<PropertyCorrelation>,
    pub by_area: Vec<AreaCorrelation>,
}

impl CorrelationReport {
    pub fn top_areas(&self, n: usize) -> &[AreaCorrelation] {
        &self.by_area[..n.min(self.by_area.len())]
    }

    /// Area count per impact class, in ladder order, empty classes omitted.
    pub fn impact_distribution(&self) -> Vec<LabelCount> {
        IMPACT
            .labels()
            .map(|label| LabelCount {
                label: label.to_string(),
                count: self.by_area.iter().filter(|a| a.impact_class == label).count(),
            })
            .filter(|c| c.count > 0)
            .collect()
    }
}

struct GroupStats {
    correlation: f64,
    rows: usize,
    avg_tourism: f64,
    avg_price: f64,
}

fn group_stats(points: &[&PricePoint]) -> Option<GroupStats> {
    let tourism: Vec<f64> = points.iter().map(|p| p.tourism).collect();
    let price: Vec<f64> = points.iter().map(|p| p.price).collect();
    Some(GroupStats {
        correlation: pearson(&tourism, &price)?,
        rows: points.len(),
        avg_tourism: average(&tourism),
        avg_price: average(&price),
    })
}

fn by_correlation_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

pub fn analyze(records: &[Record]) -> CorrelationReport {
    let points: Vec<PricePoint> = records.iter().filter_map(Record::price_point).collect();

    let tourism: Vec<f64> = points.iter().map(|p| p.tourism).collect();
    let price: Vec<f64> = points.iter().map(|p| p.price).collect();
    let correlation = pearson(&tourism, &price);
    let overall = OverallCorrelation {
        records: points.len(),
        correlation,
        p_value: correlation.and_then(|r| pearson_p_value(r, points.len())),
    };

    let mut by_type: BTreeMap<&str, Vec<&PricePoint>> = BTreeMap::new();
    let mut by_area_map: BTreeMap<&str, Vec<&PricePoint>> = BTreeMap::new();
    for p in &points {
        by_type.entry(p.property_type.as_str()).or_default().push(p);
        by_area_map.entry(p.area.as_str()).or_default().push(p);
    }

    let mut by_property: Vec<PropertyCorrelation> = by_type
        .into_iter()
        .filter(|(_, group)| group.len() > MIN_PROPERTY_ROWS)
        .filter_map(|(name, group)| {
            let s = group_stats(&group)?;
            Some(PropertyCorrelation {
                property_type: name.to_string(),
                correlation: s.correlation,
                transactions: s.rows,
                avg_tourism: s.avg_tourism,
                avg_price: s.avg_price,
            })
        })
        .collect();
    by_property.sort_by(|a, b| by_correlation_desc(a.correlation, b.correlation));

    let mut by_area: Vec<AreaCorrelation> = by_area_map
        .into_iter()
        .filter(|(_, group)| group.len() > MIN_AREA_ROWS)
        .filter_map(|(name, group)| {
            let s = group_stats(&group)?;
            Some(AreaCorrelation {
                area: name.to_string(),
                correlation: s.correlation,
                observations: s.rows,
                avg_tourism: s.avg_tourism,
                avg_price: s.avg_price,
                impact_class: IMPACT.classify(s.correlation).to_string(),
            })
        })
        .collect();
    by_area.sort_by(|a, b| by_correlation_desc(a.correlation, b.correlation));

    CorrelationReport {
        points,
        overall,
        by_property,
        by_area,
    }
}
