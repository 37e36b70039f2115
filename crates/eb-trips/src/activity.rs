//! Per-station rentals and returns for one day.

use chrono::NaiveDate;

use eb_core::StationId;

use crate::record::TripLog;

/// Dense per-station counts for one calendar day, indexed by
/// [`StationId::slot`].
///
/// A trip that departs before midnight and arrives after it counts as a
/// rental on the first day and a return on the second.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DailyActivity {
    pub date:    NaiveDate,
    pub rentals: Vec<u32>,
    pub returns: Vec<u32>,
}

impl DailyActivity {
    /// Count rentals by origin and returns by destination on `date`, over
    /// stations `1..=station_count`.  Trips naming other stations are
    /// ignored.
    pub fn for_day(log: &TripLog, date: NaiveDate, station_count: usize) -> Self {
        let mut rentals = vec![0u32; station_count];
        let mut returns = vec![0u32; station_count];

        for trip in log {
            if trip.departs_on(date) && trip.origin.is_within(station_count) {
                rentals[trip.origin.slot()] += 1;
            }
            if trip.arrives_on(date) && trip.destination.is_within(station_count) {
                returns[trip.destination.slot()] += 1;
            }
        }
        Self { date, rentals, returns }
    }

    pub fn rentals_at(&self, station: StationId) -> u32 {
        self.rentals.get(station.slot()).copied().unwrap_or(0)
    }

    pub fn returns_at(&self, station: StationId) -> u32 {
        self.returns.get(station.slot()).copied().unwrap_or(0)
    }

    pub fn total_rentals(&self) -> u64 {
        self.rentals.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn total_returns(&self) -> u64 {
        self.returns.iter().map(|&c| u64::from(c)).sum()
    }

    /// `(station, rentals, returns)` in station order.
    pub fn iter(&self) -> impl Iterator<Item = (StationId, u32, u32)> + '_ {
        self.rentals
            .iter()
            .zip(&self.returns)
            .enumerate()
            .map(|(i, (&r, &t))| (StationId::from_slot(i), r, t))
    }
}
