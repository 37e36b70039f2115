//! Station metadata and the validated, dense station table.

use eb_core::{GeoPoint, StationId};

use crate::{StationError, StationResult};

/// A bike dock.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id:   StationId,
    /// Operator name, usually prefixed with the station code
    /// (`"271 CLAUDIO BERNARD-DR. LICEAGA"`).
    pub name: String,
    pub pos:  GeoPoint,
}

impl Station {
    /// Name without its leading code token.
    ///
    /// A name made of a single token is returned unchanged.
    pub fn short_name(&self) -> &str {
        let trimmed = self.name.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((_, rest)) => rest.trim_start(),
            None => trimmed,
        }
    }
}

/// Stations with ids exactly `1..=N`, stored in id order.
///
/// The constructor is the only place the dense-id invariant is checked;
/// every other crate indexes per-station arrays with [`StationId::slot`].
#[derive(Debug, Clone, PartialEq)]
pub struct StationTable {
    stations: Vec<Station>,
}

impl StationTable {
    /// Validate and sort `stations`.
    ///
    /// # Errors
    ///
    /// Fails on an empty list, id 0, duplicate ids, gaps in the id range, or
    /// coordinates outside the WGS-84 range.
    pub fn new(mut stations: Vec<Station>) -> StationResult<Self> {
        if stations.is_empty() {
            return Err(StationError::Empty);
        }
        stations.sort_by_key(|s| s.id);

        for (slot, station) in stations.iter().enumerate() {
            if station.id.0 == 0 {
                return Err(StationError::ZeroId);
            }
            let expected = StationId::from_slot(slot);
            if station.id != expected {
                if slot > 0 && stations[slot - 1].id == station.id {
                    return Err(StationError::Duplicate(station.id));
                }
                return Err(StationError::Gap { expected, found: station.id });
            }
            if !station.pos.is_valid() {
                return Err(StationError::InvalidCoordinate { station: station.id, pos: station.pos });
            }
        }

        Ok(Self { stations })
    }

    /// Number of stations, `N`.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Always `false` for a constructed table; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, id: StationId) -> Option<&Station> {
        if id.is_within(self.len()) {
            Some(&self.stations[id.slot()])
        } else {
            None
        }
    }

    pub fn contains(&self, id: StationId) -> bool {
        id.is_within(self.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> + '_ {
        self.stations.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = StationId> + '_ {
        self.stations.iter().map(|s| s.id)
    }

    /// Coordinate of station `id`.
    ///
    /// # Panics
    /// Panics if `id` is outside `1..=N`.
    #[inline]
    pub fn pos(&self, id: StationId) -> GeoPoint {
        self.stations[id.slot()].pos
    }

    /// Great-circle distance between two stations, in metres.
    pub fn straight_distance_m(&self, a: StationId, b: StationId) -> f64 {
        self.pos(a).distance_m(self.pos(b))
    }

    /// Hover label for the `(origin, destination)` cell of the heatmap,
    /// e.g. `"de CLAUDIO BERNARD a REFORMA"`.  `None` for unknown ids.
    pub fn pair_label(&self, origin: StationId, destination: StationId) -> Option<String> {
        let o = self.get(origin)?;
        let d = self.get(destination)?;
        Some(format!("de {} a {}", o.short_name(), d.short_name()))
    }
}
