//! Rider and trip statistics for one day: sex counts, age histograms, and
//! the duration / distance / speed histograms shown side by side per sex.
//!
//! Every statistic here is keyed on the *departure* date.

use std::ops::Index;

use chrono::NaiveDate;

use eb_matrix::DistanceMatrix;

use crate::record::{Sex, TripLog};

// ── Histogram ─────────────────────────────────────────────────────────────────

/// Fixed-width histogram over `[start, start + width * bins)`.
///
/// The right edge of the last bin is closed, so a value exactly at the end
/// of the range is counted.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub start:  f64,
    pub width:  f64,
    pub counts: Vec<u32>,
}

impl Histogram {
    /// Empty histogram covering `[start, end]` with bins of `width`.
    pub fn new(start: f64, end: f64, width: f64) -> Self {
        debug_assert!(width > 0.0 && end >= start);
        let bins = ((end - start) / width).ceil().max(1.0) as usize;
        Self { start, width, counts: vec![0; bins] }
    }

    pub fn end(&self) -> f64 {
        self.start + self.width * self.counts.len() as f64
    }

    /// Count `value`; returns `false` (and counts nothing) outside the range.
    pub fn add(&mut self, value: f64) -> bool {
        if !(self.start..=self.end()).contains(&value) {
            return false;
        }
        let bin = (((value - self.start) / self.width) as usize).min(self.counts.len() - 1);
        self.counts[bin] += 1;
        true
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }
}

// ── Sex counts ────────────────────────────────────────────────────────────────

/// Number of trips per rider sex.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SexCounts {
    pub female:      u32,
    pub male:        u32,
    pub unspecified: u32,
}

impl SexCounts {
    pub fn total(&self) -> u32 {
        self.female + self.male + self.unspecified
    }
}

impl Index<Sex> for SexCounts {
    type Output = u32;

    fn index(&self, sex: Sex) -> &u32 {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
            Sex::Unspecified => &self.unspecified,
        }
    }
}

/// Trips departing on `date`, by rider sex.
pub fn sex_counts(log: &TripLog, date: NaiveDate) -> SexCounts {
    let mut c = SexCounts::default();
    for trip in log.departing_on(date) {
        match trip.sex {
            Sex::Female => c.female += 1,
            Sex::Male => c.male += 1,
            Sex::Unspecified => c.unspecified += 1,
        }
    }
    c
}

// ── Age ───────────────────────────────────────────────────────────────────────

/// Ages of riders of `sex` departing on `date`, in one-year bins from the
/// youngest to the oldest rider.  `None` when there are no such trips.
pub fn age_histogram(log: &TripLog, date: NaiveDate, sex: Sex) -> Option<Histogram> {
    let ages: Vec<u16> = log
        .departing_on(date)
        .filter(|t| t.sex == sex)
        .map(|t| t.age)
        .collect();
    let min = *ages.iter().min()?;
    let max = *ages.iter().max()?;

    let mut h = Histogram::new(f64::from(min), f64::from(max) + 1.0, 1.0);
    for age in ages {
        h.add(f64::from(age));
    }
    Some(h)
}

// ── Motion ────────────────────────────────────────────────────────────────────

/// Longest trip, in seconds, included in the motion histograms.
pub const MAX_DURATION_SECS: i64 = 2_700;
pub const DURATION_BIN_SECS: f64 = 60.0;
pub const MAX_DISTANCE_M: f64 = 16_000.0;
pub const DISTANCE_BIN_M: f64 = 400.0;
pub const MAX_SPEED_MPS: f64 = 14.0;
pub const SPEED_BIN_MPS: f64 = 0.5;

/// The same statistic for female and male riders.
#[derive(Clone, Debug, PartialEq)]
pub struct BySex<T> {
    pub female: T,
    pub male:   T,
}

impl<T> BySex<T> {
    /// `None` for [`Sex::Unspecified`].
    pub fn get_mut(&mut self, sex: Sex) -> Option<&mut T> {
        match sex {
            Sex::Female => Some(&mut self.female),
            Sex::Male => Some(&mut self.male),
            Sex::Unspecified => None,
        }
    }
}

/// Duration, distance and mean-speed histograms of one day's trips.
///
/// Only trips with `0 < duration <= MAX_DURATION_SECS` and a known, positive
/// origin–destination distance are counted; riders of unspecified sex are
/// left out.  Distance is the matrix distance between the two stations, not
/// the path actually ridden.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionHistograms {
    pub date:          NaiveDate,
    pub duration_secs: BySex<Histogram>,
    pub distance_m:    BySex<Histogram>,
    pub speed_mps:     BySex<Histogram>,
}

impl MotionHistograms {
    pub fn for_day(log: &TripLog, date: NaiveDate, distances: &DistanceMatrix) -> Self {
        let both = |end, width| BySex {
            female: Histogram::new(0.0, end, width),
            male:   Histogram::new(0.0, end, width),
        };
        let mut m = Self {
            date,
            duration_secs: both(MAX_DURATION_SECS as f64, DURATION_BIN_SECS),
            distance_m:    both(MAX_DISTANCE_M, DISTANCE_BIN_M),
            speed_mps:     both(MAX_SPEED_MPS, SPEED_BIN_MPS),
        };

        for trip in log.departing_on(date) {
            let secs = trip.elapsed_secs();
            if secs <= 0 || secs > MAX_DURATION_SECS {
                continue;
            }
            let Some(dist) = distances.distance(trip.origin, trip.destination) else {
                continue;
            };
            if dist <= 0.0 {
                continue;
            }
            if let Some(h) = m.duration_secs.get_mut(trip.sex) {
                h.add(secs as f64);
            }
            if let Some(h) = m.distance_m.get_mut(trip.sex) {
                h.add(dist);
            }
            if let Some(h) = m.speed_mps.get_mut(trip.sex) {
                h.add(dist / secs as f64);
            }
        }
        m
    }
}
