//! CSV station loader.
//!
//! # CSV format
//!
//! One row per station.  Extra columns (address, zip code, district, …) in
//! the operator export are ignored.
//!
//! ```csv
//! id,name,lat,lon
//! 1,1 RIO SENA-RIO BALSAS,19.433571,-99.167809
//! 2,2 RIO GUADALQUIVIR-RIO BALSAS,19.431386,-99.171695
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use eb_core::{GeoPoint, StationId};

use crate::station::{Station, StationTable};
use crate::StationResult;

#[derive(Deserialize)]
struct StationRecord {
    id:   u32,
    name: String,
    lat:  f64,
    lon:  f64,
}

/// Load and validate a station table from a CSV file.
pub fn load_stations_csv(path: &Path) -> StationResult<StationTable> {
    let file = std::fs::File::open(path)?;
    let table = load_stations_reader(file)?;
    info!(stations = table.len(), path = %path.display(), "loaded station table");
    Ok(table)
}

/// Like [`load_stations_csv`] but accepts any `Read` source.
pub fn load_stations_reader<R: Read>(reader: R) -> StationResult<StationTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut stations = Vec::new();
    for result in csv_reader.deserialize::<StationRecord>() {
        let row = result?;
        stations.push(Station {
            id:   StationId(row.id),
            name: row.name,
            pos:  GeoPoint::new(row.lat, row.lon),
        });
    }
    StationTable::new(stations)
}
