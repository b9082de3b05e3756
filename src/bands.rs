// Threshold ladders that turn a numeric score into a label.
//
// Each ladder is data: steps are checked top to bottom and the first match
// wins, the fallback catches everything below the last step.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    /// `value > threshold`
    Above,
    /// `value >= threshold`
    AtLeast,
    /// `value < threshold`
    Below,
}

#[derive(Debug)]
pub struct Ladder {
    pub cmp: Cmp,
    pub steps: &'static [(f64, &'static str)],
    pub fallback: &'static str,
}

impl Ladder {
    pub fn classify(&self, value: f64) -> &'static str {
        self.steps
            .iter()
            .find(|(threshold, _)| match self.cmp {
                Cmp::Above => value > *threshold,
                Cmp::AtLeast => value >= *threshold,
                Cmp::Below => value < *threshold,
            })
            .map(|(_, label)| *label)
            .unwrap_or(self.fallback)
    }

    /// All labels in ladder order, fallback last.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps
            .iter()
            .map(|(_, label)| *label)
            .chain(std::iter::once(self.fallback))
    }
}

/// Tourism/price correlation strength of an area.
pub const IMPACT: Ladder = Ladder {
    cmp: Cmp::Above,
    steps: &[
        (0.5, "Very Strong"),
        (0.3, "Moderate"),
        (0.1, "Weak"),
        (-0.1, "No Clear Impact"),
    ],
    fallback: "Negative",
};

pub const RATING: Ladder = Ladder {
    cmp: Cmp::AtLeast,
    steps: &[
        (70.0, "Excellent"),
        (60.0, "Very Good"),
        (50.0, "Good"),
        (40.0, "Average"),
    ],
    fallback: "Weak",
};

/// Coefficient of variation (percent) of smoothed price.
pub const STABILITY: Ladder = Ladder {
    cmp: Cmp::Below,
    steps: &[(15.0, "Very Stable"), (25.0, "Stable"), (40.0, "Moderate")],
    fallback: "Volatile",
};

/// Half-open `[lower, upper)` price-per-meter buckets.
pub const PRICE_SEGMENTS: &[(f64, f64, &str)] = &[
    (0.0, 5_000.0, "Low"),
    (5_000.0, 10_000.0, "Medium"),
    (10_000.0, 20_000.0, "High"),
    (20_000.0, 50_000.0, "Very High"),
    (50_000.0, f64::INFINITY, "Luxury"),
];

pub fn price_segment(avg_price: f64) -> Option<&'static str> {
    PRICE_SEGMENTS
        .iter()
        .find(|(lo, hi, _)| avg_price >= *lo && avg_price < *hi)
        .map(|(_, _, label)| *label)
}

/// The season with the strictly lower mean price; ties go to winter.
pub fn better_season(winter_price: f64, summer_price: f64) -> &'static str {
    if summer_price < winter_price {
        "Summer"
    } else {
        "Winter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_boundaries_fall_to_next_band() {
        assert_eq!(IMPACT.classify(0.51), "Very Strong");
        assert_eq!(IMPACT.classify(0.5), "Moderate");
        assert_eq!(IMPACT.classify(0.3), "Weak");
        assert_eq!(IMPACT.classify(0.1), "No Clear Impact");
        assert_eq!(IMPACT.classify(-0.1), "Negative");
        assert_eq!(IMPACT.classify(-0.05), "No Clear Impact");
    }

    #[test]
    fn rating_thresholds_are_inclusive() {
        assert_eq!(RATING.classify(70.0), "Excellent");
        assert_eq!(RATING.classify(69.99), "Very Good");
        assert_eq!(RATING.classify(60.0), "Very Good");
        assert_eq!(RATING.classify(50.0), "Good");
        assert_eq!(RATING.classify(40.0), "Average");
        assert_eq!(RATING.classify(39.99), "Weak");
        assert_eq!(RATING.classify(-15.0), "Weak");
    }

    #[test]
    fn rating_bands_cover_range_without_gaps() {
        // walk the reachable composite range and check each score lands in
        // exactly one band consistent with the thresholds
        let mut score = -15.0;
        while score <= 100.0 {
            let label = RATING.classify(score);
            let expected = if score >= 70.0 {
                "Excellent"
            } else if score >= 60.0 {
                "Very Good"
            } else if score >= 50.0 {
                "Good"
            } else if score >= 40.0 {
                "Average"
            } else {
                "Weak"
            };
            assert_eq!(label, expected, "score {score}");
            score += 0.25;
        }
    }

    #[test]
    fn stability_is_strictly_below() {
        assert_eq!(STABILITY.classify(14.9), "Very Stable");
        assert_eq!(STABILITY.classify(15.0), "Stable");
        assert_eq!(STABILITY.classify(25.0), "Moderate");
        assert_eq!(STABILITY.classify(40.0), "Volatile");
    }

    #[test]
    fn price_segments_are_half_open() {
        assert_eq!(price_segment(0.0), Some("Low"));
        assert_eq!(price_segment(4_999.99), Some("Low"));
        assert_eq!(price_segment(5_000.0), Some("Medium"));
        assert_eq!(price_segment(10_000.0), Some("High"));
        assert_eq!(price_segment(20_000.0), Some("Very High"));
        assert_eq!(price_segment(50_000.0), Some("Luxury"));
        assert_eq!(price_segment(1e9), Some("Luxury"));
        assert_eq!(price_segment(-1.0), None);
    }

    #[test]
    fn labels_in_order() {
        let labels: Vec<_> = STABILITY.labels().collect();
        assert_eq!(labels, ["Very Stable", "Stable", "Moderate", "Volatile"]);
    }

    #[test]
    fn cheaper_summer_wins() {
        assert_eq!(better_season(9_000.0, 8_500.0), "Summer");
        assert_eq!(better_season(8_500.0, 9_000.0), "Winter");
        assert_eq!(better_season(9_000.0, 9_000.0), "Winter");
    }
}
