//! Geographic coordinate type and spatial utilities.
//!
//! Station coordinates come from the operator feed with 6+ decimals, so
//! `GeoPoint` stores `f64` latitude/longitude.  Distances are great-circle
//! metres on a spherical Earth.

/// Mean Earth radius in metres (IUGG mean radius, rounded).
pub const EARTH_RADIUS_M: f64 = 6_371_009.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        // Clamp guards against a > 1.0 from rounding on antipodal points.
        let c = 2.0 * a.min(1.0).sqrt().asin();
        EARTH_RADIUS_M * c
    }

    /// `true` for finite coordinates inside the WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon box, inclusive on all sides.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub south: f64,
    pub west:  f64,
    pub north: f64,
    pub east:  f64,
}

impl BoundingBox {
    /// Degenerate box covering a single point.
    pub fn around(p: GeoPoint) -> Self {
        Self { south: p.lat, west: p.lon, north: p.lat, east: p.lon }
    }

    /// Smallest box enclosing all `points`, or `None` when empty.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::around(first), |mut bb, p| {
            bb.extend(p);
            bb
        }))
    }

    /// Grow the box so it contains `p`.
    pub fn extend(&mut self, p: GeoPoint) {
        self.south = self.south.min(p.lat);
        self.north = self.north.max(p.lat);
        self.west  = self.west.min(p.lon);
        self.east  = self.east.max(p.lon);
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lon)
    }
}
