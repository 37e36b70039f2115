//! Ecobici monthly trip CSV loader.
//!
//! # CSV format
//!
//! The operator's open-data export, one row per trip.  Dates are day-first;
//! times may carry fractional seconds.  Extra columns are ignored.
//!
//! ```csv
//! Genero_Usuario,Edad_Usuario,Bici,Ciclo_Estacion_Retiro,Fecha_Retiro,Hora_Retiro,Ciclo_Estacion_Arribo,Fecha_Arribo,Hora_Arribo
//! M,30,11240,5,01/01/2018,0:22:35,9,01/01/2018,0:38:48
//! F,27,3321,271,01/01/2018,0:32:54.130000,271,01/01/2018,0:53:00
//! ```
//!
//! Rows referring to a station outside `1..=N` occur in the raw data (the
//! export includes retired stations); they are dropped and counted in
//! [`LoadStats`].

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use tracing::{info, warn};

use eb_core::StationId;

use crate::record::{Sex, TripLog, TripRecord};
use crate::{TripError, TripResult};

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

#[derive(Deserialize)]
struct RawTrip {
    #[serde(rename = "Genero_Usuario")]
    sex: String,
    #[serde(rename = "Edad_Usuario")]
    age: u16,
    #[serde(rename = "Bici")]
    bike: u32,
    #[serde(rename = "Ciclo_Estacion_Retiro")]
    origin: u32,
    #[serde(rename = "Fecha_Retiro")]
    departure_date: String,
    #[serde(rename = "Hora_Retiro")]
    departure_time: String,
    #[serde(rename = "Ciclo_Estacion_Arribo")]
    destination: u32,
    #[serde(rename = "Fecha_Arribo")]
    arrival_date: String,
    #[serde(rename = "Hora_Arribo")]
    arrival_time: String,
}

/// Row counts from one load.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows:    u64,
    pub kept:    u64,
    /// Rows whose origin or destination lies outside `1..=N`.
    pub dropped: u64,
}

/// Load a trip log from a CSV file, keeping only trips between stations
/// `1..=station_count`.
pub fn load_trips_csv(path: &Path, station_count: usize) -> TripResult<(TripLog, LoadStats)> {
    let file = std::fs::File::open(path)?;
    let (log, stats) = load_trips_reader(file, station_count)?;
    info!(
        path = %path.display(),
        trips = stats.kept,
        dropped = stats.dropped,
        "loaded trip log"
    );
    Ok((log, stats))
}

/// Like [`load_trips_csv`] but accepts any `Read` source.
pub fn load_trips_reader<R: Read>(reader: R, station_count: usize) -> TripResult<(TripLog, LoadStats)> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = csv::StringRecord::new();

    let mut trips = Vec::new();
    let mut stats = LoadStats::default();

    while csv_reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        stats.rows += 1;

        let raw: RawTrip = record
            .deserialize(Some(&headers))
            .map_err(|e| TripError::Parse { line, message: e.to_string() })?;

        let origin = StationId(raw.origin);
        let destination = StationId(raw.destination);
        if !origin.is_within(station_count) || !destination.is_within(station_count) {
            stats.dropped += 1;
            continue;
        }

        trips.push(TripRecord {
            bike: raw.bike,
            sex: Sex::from_code(&raw.sex),
            age: raw.age,
            origin,
            destination,
            departure: parse_timestamp(&raw.departure_date, &raw.departure_time, line)?,
            arrival: parse_timestamp(&raw.arrival_date, &raw.arrival_time, line)?,
        });
        stats.kept += 1;
    }

    if stats.dropped > 0 {
        warn!(dropped = stats.dropped, station_count, "dropped trips to or from unknown stations");
    }
    Ok((TripLog::new(trips), stats))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_timestamp(date: &str, time: &str, line: u64) -> TripResult<NaiveDateTime> {
    let d = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|e| TripError::Parse { line, message: format!("bad date {date:?}: {e}") })?;
    let t = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
        .map_err(|e| TripError::Parse { line, message: format!("bad time {time:?}: {e}") })?;
    Ok(d.and_time(t))
}
