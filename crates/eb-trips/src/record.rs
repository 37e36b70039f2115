//! Trip records and the in-memory trip log.

use chrono::{NaiveDate, NaiveDateTime};

use eb_core::StationId;

// ── Sex ───────────────────────────────────────────────────────────────────────

/// Rider sex as recorded by the operator (`Genero_Usuario`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum Sex {
    Female,
    Male,
    /// Blank or any code other than `F`/`M`.
    Unspecified,
}

impl Sex {
    pub fn from_code(code: &str) -> Sex {
        match code.trim() {
            "F" | "f" => Sex::Female,
            "M" | "m" => Sex::Male,
            _ => Sex::Unspecified,
        }
    }
}

// ── TripRecord ────────────────────────────────────────────────────────────────

/// One rental: a bike taken at `origin` and returned at `destination`.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRecord {
    pub bike:        u32,
    pub sex:         Sex,
    pub age:         u16,
    pub origin:      StationId,
    pub destination: StationId,
    pub departure:   NaiveDateTime,
    pub arrival:     NaiveDateTime,
}

impl TripRecord {
    /// Arrival minus departure, in whole seconds.  Negative for rows whose
    /// clocks disagree.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        (self.arrival - self.departure).num_seconds()
    }

    #[inline]
    pub fn departs_on(&self, date: NaiveDate) -> bool {
        self.departure.date() == date
    }

    #[inline]
    pub fn arrives_on(&self, date: NaiveDate) -> bool {
        self.arrival.date() == date
    }
}

// ── TripLog ───────────────────────────────────────────────────────────────────

/// Read-only collection of trips, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripLog {
    trips: Vec<TripRecord>,
}

impl TripLog {
    pub fn new(trips: Vec<TripRecord>) -> Self {
        Self { trips }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripRecord> {
        self.trips.iter()
    }

    /// Trips whose bike was taken on `date`.
    pub fn departing_on(&self, date: NaiveDate) -> impl Iterator<Item = &TripRecord> + '_ {
        self.trips.iter().filter(move |t| t.departs_on(date))
    }

    /// Distinct departure dates, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = self.trips.iter().map(|t| t.departure.date()).collect();
        days.sort_unstable();
        days.dedup();
        days
    }
}

impl<'a> IntoIterator for &'a TripLog {
    type Item = &'a TripRecord;
    type IntoIter = std::slice::Iter<'a, TripRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.trips.iter()
    }
}
