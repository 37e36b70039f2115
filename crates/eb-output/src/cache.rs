//! On-disk cache of distance matrices.
//!
//! One file per [`DistanceKind`] in the cache directory.  A cached file is
//! reused only when its kind, station fingerprint and size match the
//! current station table; anything else is rebuilt and overwritten.
//!
//! [`load_or_build_routes`] applies the same rule to the route catalog,
//! keyed by the station to node assignment instead of the station table.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use eb_core::DistanceKind;
use eb_matrix::{DistanceMatrix, MatrixResult, RouteCatalog, RouteResult};
use eb_stations::StationTable;

use crate::matrix_file::{load_matrix, matrix_file_name, save_matrix, station_fingerprint};
use crate::routes_file::{read_route_catalog, write_route_catalog};
use crate::OutputResult;

/// How [`MatrixCache::load_or_build`] obtained its matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Read from a valid cache file.
    Hit,
    /// No cache file, or invalidation was requested.
    Built,
    /// A cache file existed but was corrupt or stale.
    Rebuilt,
}

pub struct MatrixCache {
    dir: PathBuf,
}

impl MatrixCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing matrices of `kind`.
    pub fn path(&self, kind: DistanceKind) -> PathBuf {
        self.dir.join(matrix_file_name(kind))
    }

    /// Return the cached matrix of `kind` for `stations`, or call `build`,
    /// persist its result and return it.
    ///
    /// `invalidate` skips the cached file without reading it.
    ///
    /// # Errors
    ///
    /// Build failures and write failures.  An unreadable cache file is not
    /// an error; it is rebuilt with a warning.
    pub fn load_or_build<F>(
        &self,
        kind: DistanceKind,
        stations: &StationTable,
        invalidate: bool,
        build: F,
    ) -> OutputResult<(DistanceMatrix, CacheStatus)>
    where
        F: FnOnce() -> MatrixResult<DistanceMatrix>,
    {
        let path = self.path(kind);
        let fingerprint = station_fingerprint(stations);

        let status = if invalidate || !path.exists() {
            CacheStatus::Built
        } else {
            match load_matrix(&path) {
                Ok((header, matrix))
                    if header.kind == kind
                        && header.fingerprint == fingerprint
                        && matrix.len() == stations.len() =>
                {
                    info!(kind = %kind, path = %path.display(), "distance matrix cache hit");
                    return Ok((matrix, CacheStatus::Hit));
                }
                Ok((header, _)) => {
                    warn!(
                        kind = %kind,
                        cached_fingerprint = header.fingerprint,
                        fingerprint,
                        "cached distance matrix is stale; rebuilding"
                    );
                    CacheStatus::Rebuilt
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "cached distance matrix unreadable; rebuilding");
                    CacheStatus::Rebuilt
                }
            }
        };

        let matrix = build()?;
        save_matrix(&path, &matrix, fingerprint)?;
        info!(kind = %kind, path = %path.display(), ?status, "distance matrix written");
        Ok((matrix, status))
    }
}

/// Return the route catalog at `path` if it was built for `fingerprint`
/// (see [`route_fingerprint`](crate::route_fingerprint)), or call `build`,
/// write its result and return it.
///
/// # Errors
///
/// Build failures and write failures.  An unreadable or stale catalog is
/// rebuilt with a warning.
pub fn load_or_build_routes<F>(
    path: &Path,
    fingerprint: u32,
    invalidate: bool,
    build: F,
) -> OutputResult<(RouteCatalog, CacheStatus)>
where
    F: FnOnce() -> RouteResult<RouteCatalog>,
{
    let status = if invalidate || !path.exists() {
        CacheStatus::Built
    } else {
        match read_route_catalog(path) {
            Ok((cached, catalog)) if cached == fingerprint => {
                info!(path = %path.display(), routes = catalog.len(), "route catalog cache hit");
                return Ok((catalog, CacheStatus::Hit));
            }
            Ok((cached, _)) => {
                warn!(cached_fingerprint = cached, fingerprint, "cached route catalog is stale; rebuilding");
                CacheStatus::Rebuilt
            }
            Err(e) => {
                warn!(error = %e, "cached route catalog unreadable; rebuilding");
                CacheStatus::Rebuilt
            }
        }
    };

    let catalog = build()?;
    write_route_catalog(path, &catalog, fingerprint)?;
    info!(path = %path.display(), routes = catalog.len(), ?status, "route catalog written");
    Ok((catalog, status))
}
