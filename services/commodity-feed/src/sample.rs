//! Fixed fallback series served when no live data is available

use crate::types::ChartPoint;

/// Dec 1..Dec 21, values in -40..=35
pub const SAMPLE_SERIES: [(&str, i32); 21] = [
    ("Dec 1", 10),
    ("Dec 2", -35),
    ("Dec 3", 20),
    ("Dec 4", 15),
    ("Dec 5", 25),
    ("Dec 6", 35),
    ("Dec 7", 30),
    ("Dec 8", 5),
    ("Dec 9", -40),
    ("Dec 10", 15),
    ("Dec 11", 10),
    ("Dec 12", 25),
    ("Dec 13", 5),
    ("Dec 14", -20),
    ("Dec 15", -25),
    ("Dec 16", -10),
    ("Dec 17", -30),
    ("Dec 18", 5),
    ("Dec 19", 35),
    ("Dec 20", 20),
    ("Dec 21", 20),
];

pub fn sample_series() -> Vec<ChartPoint> {
    SAMPLE_SERIES
        .iter()
        .map(|(label, value)| ChartPoint::new(*label, f64::from(*value)))
        .collect()
}
