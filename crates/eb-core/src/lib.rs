//! `eb-core`: foundational types for the ecobici precompute workspace.
//!
//! This crate is a dependency of every other `eb-*` crate.  It intentionally
//! has no `eb-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `StationId`, `NodeId`, `EdgeId`                       |
//! | [`geo`]         | `GeoPoint`, haversine distance, `BoundingBox`         |
//! | [`config`]      | `PrecomputeConfig`, `DistanceKind`, `SnapPolicy`, ... |
//! | [`error`]       | `EbError`, `EbResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DistanceKind, NetworkSource, PrecomputeConfig, SnapPolicy};
pub use error::{EbError, EbResult};
pub use geo::{BoundingBox, GeoPoint};
pub use ids::{EdgeId, NodeId, StationId};
