//! `eb-matrix`: station distance matrices and shortest-route geometries.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`matrix`]  | `DistanceMatrix` (row-major N×N, `NaN` = no path)          |
//! | [`builder`] | `build_straight`, `build_street`, `build_matrix`           |
//! | [`routes`]  | `RouteGeometry`, `route_between`, `RouteCatalog`           |
//! | [`error`]   | `MatrixError`, `RouteError`                                |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | One rayon task per origin for street rows and routes.   |

pub mod builder;
pub mod error;
pub mod matrix;
pub mod routes;

#[cfg(test)]
mod tests;

pub use builder::{build_matrix, build_straight, build_street};
pub use error::{MatrixError, MatrixResult, RouteError, RouteResult};
pub use matrix::DistanceMatrix;
pub use routes::{build_route_catalog, route_between, route_key, RouteCatalog, RouteGeometry};
