//! Per-day rider statistics as one JSON document.
//!
//! Per-sex objects use the operator's codes `F` and `M` as keys.

use std::path::Path;

use serde_json::{json, Value};

use eb_trips::{Histogram, MotionHistograms, SexCounts};

use crate::atomic::atomic_write;
use crate::OutputResult;

/// Everything the day view plots, gathered for one departure date.
pub struct DayStats<'a> {
    pub sex_counts:  SexCounts,
    pub female_ages: Option<&'a Histogram>,
    pub male_ages:   Option<&'a Histogram>,
    pub motion:      &'a MotionHistograms,
}

fn histogram_json(h: &Histogram) -> Value {
    json!({ "start": h.start, "width": h.width, "counts": h.counts })
}

fn by_sex_json(female: &Histogram, male: &Histogram) -> Value {
    json!({ "F": histogram_json(female), "M": histogram_json(male) })
}

pub fn day_stats_json(stats: &DayStats<'_>) -> Value {
    let m = stats.motion;
    json!({
        "date": m.date.to_string(),
        "sex_counts": {
            "F": stats.sex_counts.female,
            "M": stats.sex_counts.male,
            "unspecified": stats.sex_counts.unspecified,
        },
        "ages": {
            "F": stats.female_ages.map(histogram_json),
            "M": stats.male_ages.map(histogram_json),
        },
        "duration_secs": by_sex_json(&m.duration_secs.female, &m.duration_secs.male),
        "distance_m": by_sex_json(&m.distance_m.female, &m.distance_m.male),
        "speed_mps": by_sex_json(&m.speed_mps.female, &m.speed_mps.male),
    })
}

pub fn write_day_stats(path: &Path, stats: &DayStats<'_>) -> OutputResult<()> {
    atomic_write(path, &serde_json::to_vec_pretty(&day_stats_json(stats))?)?;
    Ok(())
}
