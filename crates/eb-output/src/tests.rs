//! Integration tests for eb-output.

#[cfg(test)]
mod helpers {
    use eb_core::{GeoPoint, StationId};
    use eb_spatial::{RoadNetwork, RoadNetworkBuilder};
    use eb_stations::{Station, StationNodes, StationTable};
    use tempfile::TempDir;

    pub fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    pub fn stations(lat_of_third: f64) -> StationTable {
        StationTable::new(vec![
            Station { id: StationId(1), name: "1 A".into(), pos: GeoPoint::new(0.0, 0.0) },
            Station { id: StationId(2), name: "2 B".into(), pos: GeoPoint::new(0.0, 1.0) },
            Station { id: StationId(3), name: "3 C".into(), pos: GeoPoint::new(lat_of_third, 0.0) },
        ])
        .unwrap()
    }

    /// Triangle with a one-way C→A street, so C is a dead end from A.
    pub fn network() -> (RoadNetwork, StationNodes) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_external_node(9001, GeoPoint::new(0.0, 0.0));
        let bb = b.add_external_node(9002, GeoPoint::new(0.0, 1.0));
        let c = b.add_external_node(9003, GeoPoint::new(1.0, 0.0));
        b.add_road(a, bb, 1.0);
        b.add_directed_edge(c, a, 1.0);
        (b.build(), StationNodes::from_nodes(vec![a, bb, c]))
    }

    pub fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }
}

// ── Matrix file ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod matrix_file {
    use eb_core::{DistanceKind, StationId};
    use eb_matrix::{build_straight, build_street};
    use eb_spatial::DijkstraRouter;

    use super::helpers::{network, stations, tmp};
    use crate::matrix_file::{MatrixPayload, HEADER_SIZE};
    use crate::{decode_matrix, encode_matrix, load_matrix, save_matrix, station_fingerprint, OutputError};

    #[test]
    fn header_layout() {
        let m = build_straight(&stations(1.0));
        let bytes = encode_matrix(&m, 0xDEAD_BEEF);
        assert_eq!(&bytes[..4], b"ECBM");
        assert_eq!(&bytes[8..12], &0u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &0xDEAD_BEEFu32.to_le_bytes());
        assert!(bytes.len() > HEADER_SIZE);
    }

    #[test]
    fn nan_cells_survive_save_and_load() {
        let dir = tmp();
        let path = dir.path().join("street.bin");
        let (net, nodes) = network();
        let st = stations(1.0);
        let m = build_street(&st, &nodes, &net, &DijkstraRouter).unwrap();
        assert!(m.get(StationId(1), StationId(3)).is_nan());

        save_matrix(&path, &m, station_fingerprint(&st)).unwrap();
        let (header, loaded) = load_matrix(&path).unwrap();
        assert_eq!(header.kind, DistanceKind::Street);
        assert_eq!(header.fingerprint, station_fingerprint(&st));
        assert!(loaded.get(StationId(1), StationId(3)).is_nan());
        assert_eq!(loaded.get(StationId(3), StationId(2)), 2.0);
        assert!(!crate::atomic::tmp_path(&path).exists());
    }

    #[test]
    fn saving_twice_gives_identical_bytes() {
        let dir = tmp();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        let m = build_straight(&stations(1.0));
        save_matrix(&a, &m, 7).unwrap();
        save_matrix(&b, &m, 7).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }

    #[test]
    fn flipped_payload_byte_is_corrupt() {
        let mut bytes = encode_matrix(&build_straight(&stations(1.0)), 1);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(decode_matrix(&bytes), Err(OutputError::Corrupt(_))));
    }

    #[test]
    fn foreign_and_truncated_files_are_corrupt() {
        assert!(matches!(decode_matrix(b"\x93NUMPY\x01\x00"), Err(OutputError::Corrupt(_))));
        let bytes = encode_matrix(&build_straight(&stations(1.0)), 1);
        assert!(matches!(decode_matrix(&bytes[..10]), Err(OutputError::Corrupt(_))));
    }

    #[test]
    fn oversized_station_count_is_corrupt() {
        let payload = bitcode::encode(&MatrixPayload { n: u32::MAX, values: vec![0.0] });
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"ECBM");
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(&xxhash_rust::xxh32::xxh32(&payload, 0).to_le_bytes());
        bytes.extend_from_slice(&payload);
        assert!(matches!(decode_matrix(&bytes), Err(OutputError::Corrupt(_))));
    }

    #[test]
    fn fingerprint_tracks_coordinates_not_names() {
        assert_ne!(station_fingerprint(&stations(1.0)), station_fingerprint(&stations(1.5)));

        let mut renamed: Vec<_> = stations(1.0).iter().cloned().collect();
        renamed[0].name = "1 RENAMED".into();
        let renamed = eb_stations::StationTable::new(renamed).unwrap();
        assert_eq!(station_fingerprint(&renamed), station_fingerprint(&stations(1.0)));
    }
}

// ── Cache ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use std::cell::Cell;

    use eb_core::DistanceKind;
    use eb_matrix::build_straight;

    use super::helpers::{stations, tmp};
    use crate::{CacheStatus, MatrixCache};

    #[test]
    fn second_load_is_a_hit_and_does_not_rebuild() {
        let dir = tmp();
        let cache = MatrixCache::new(dir.path());
        let st = stations(1.0);
        let builds = Cell::new(0);
        let build = || {
            builds.set(builds.get() + 1);
            Ok(build_straight(&st))
        };

        let (first, s1) = cache.load_or_build(DistanceKind::Straight, &st, false, build).unwrap();
        let bytes = std::fs::read(cache.path(DistanceKind::Straight)).unwrap();
        let (second, s2) = cache.load_or_build(DistanceKind::Straight, &st, false, build).unwrap();

        assert_eq!((s1, s2), (CacheStatus::Built, CacheStatus::Hit));
        assert_eq!(builds.get(), 1);
        assert_eq!(first, second);
        assert_eq!(std::fs::read(cache.path(DistanceKind::Straight)).unwrap(), bytes);
    }

    #[test]
    fn invalidate_forces_rebuild_with_same_bytes() {
        let dir = tmp();
        let cache = MatrixCache::new(dir.path());
        let st = stations(1.0);
        cache.load_or_build(DistanceKind::Straight, &st, false, || Ok(build_straight(&st))).unwrap();
        let before = std::fs::read(cache.path(DistanceKind::Straight)).unwrap();

        let (_, status) =
            cache.load_or_build(DistanceKind::Straight, &st, true, || Ok(build_straight(&st))).unwrap();
        assert_eq!(status, CacheStatus::Built);
        assert_eq!(std::fs::read(cache.path(DistanceKind::Straight)).unwrap(), before);
    }

    #[test]
    fn moved_station_makes_cache_stale() {
        let dir = tmp();
        let cache = MatrixCache::new(dir.path());
        let old = stations(1.0);
        let new = stations(1.5);
        cache.load_or_build(DistanceKind::Straight, &old, false, || Ok(build_straight(&old))).unwrap();

        let (m, status) =
            cache.load_or_build(DistanceKind::Straight, &new, false, || Ok(build_straight(&new))).unwrap();
        assert_eq!(status, CacheStatus::Rebuilt);
        assert_eq!(m, build_straight(&new));
    }

    #[test]
    fn corrupt_file_is_rebuilt() {
        let dir = tmp();
        let cache = MatrixCache::new(dir.path());
        let st = stations(1.0);
        std::fs::write(cache.path(DistanceKind::Straight), b"garbage").unwrap();

        let (_, status) =
            cache.load_or_build(DistanceKind::Straight, &st, false, || Ok(build_straight(&st))).unwrap();
        assert_eq!(status, CacheStatus::Rebuilt);
    }

    #[test]
    fn build_error_propagates() {
        let dir = tmp();
        let cache = MatrixCache::new(dir.path());
        let st = stations(1.0);
        let r = cache.load_or_build(DistanceKind::Street, &st, false, || {
            Err(eb_matrix::MatrixError::NodeCountMismatch { stations: 3, nodes: 0 })
        });
        assert!(matches!(r, Err(crate::OutputError::Build(_))));
        assert!(!cache.path(DistanceKind::Street).exists());
    }
}

// ── Route catalog ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod routes_file {
    use std::cell::Cell;

    use eb_core::{GeoPoint, StationId};
    use eb_matrix::build_route_catalog;
    use eb_spatial::DijkstraRouter;
    use eb_stations::StationNodes;

    use super::helpers::{network, stations, tmp};
    use crate::{
        load_or_build_routes, read_route_catalog, route_fingerprint, write_route_catalog, CacheStatus,
        OutputError,
    };

    #[test]
    fn catalog_file_is_keyed_by_pair() {
        let dir = tmp();
        let path = dir.path().join("routes.json");
        let (net, nodes) = network();
        let catalog = build_route_catalog(&stations(1.0), &nodes, &net, &DijkstraRouter).unwrap();
        write_route_catalog(&path, &catalog, 42).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), catalog.len() + 1);
        assert_eq!(obj["fingerprint"], 42);
        assert!(obj.contains_key("3 to 2"));
        assert!(!obj.contains_key("1 to 3"));
        assert_eq!(obj["3 to 2"]["type"], "Feature");
        assert_eq!(obj["3 to 2"]["geometry"]["coordinates"][0], serde_json::json!([0.0, 1.0]));

        let (fingerprint, back) = read_route_catalog(&path).unwrap();
        assert_eq!(fingerprint, 42);
        assert_eq!(back.len(), catalog.len());
        assert_eq!(back.get(StationId(3), StationId(2)), catalog.get(StationId(3), StationId(2)));
    }

    #[test]
    fn mismatched_key_is_corrupt() {
        let dir = tmp();
        let path = dir.path().join("routes.json");
        let (net, nodes) = network();
        let catalog = build_route_catalog(&stations(1.0), &nodes, &net, &DijkstraRouter).unwrap();
        let feature = catalog.get(StationId(1), StationId(2)).unwrap().to_feature();
        let doc = serde_json::json!({ "fingerprint": 7, "2 to 1": feature });
        std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
        assert!(matches!(read_route_catalog(&path), Err(OutputError::Corrupt(_))));
    }

    #[test]
    fn missing_fingerprint_is_corrupt() {
        let dir = tmp();
        let path = dir.path().join("routes.json");
        std::fs::write(&path, b"{}").unwrap();
        assert!(matches!(read_route_catalog(&path), Err(OutputError::Corrupt(_))));
    }

    #[test]
    fn fingerprint_follows_station_nodes() {
        let (net, nodes) = network();
        let s = nodes.as_slice();
        let moved = StationNodes::from_nodes(vec![s[0], s[0], s[2]]);
        assert_eq!(route_fingerprint(&nodes, &net), route_fingerprint(&nodes, &net));
        assert_ne!(route_fingerprint(&nodes, &net), route_fingerprint(&moved, &net));
    }

    #[test]
    fn unchanged_nodes_reuse_catalog() {
        let dir = tmp();
        let path = dir.path().join("routes.json");
        let (net, nodes) = network();
        let st = stations(1.0);
        let fp = route_fingerprint(&nodes, &net);
        let builds = Cell::new(0);
        let build = || {
            builds.set(builds.get() + 1);
            build_route_catalog(&st, &nodes, &net, &DijkstraRouter)
        };

        let (first, s1) = load_or_build_routes(&path, fp, false, build).unwrap();
        let (second, s2) = load_or_build_routes(&path, fp, false, build).unwrap();

        assert_eq!((s1, s2), (CacheStatus::Built, CacheStatus::Hit));
        assert_eq!(builds.get(), 1);
        assert_eq!(second.len(), first.len());
        assert_eq!(second.get(StationId(1), StationId(2)), first.get(StationId(1), StationId(2)));
    }

    #[test]
    fn moved_station_rebuilds_stale_catalog() {
        let dir = tmp();
        let path = dir.path().join("routes.json");
        let (net, nodes) = network();
        let st = stations(1.0);
        load_or_build_routes(&path, route_fingerprint(&nodes, &net), false, || {
            build_route_catalog(&st, &nodes, &net, &DijkstraRouter)
        })
        .unwrap();

        // Station 2 now sits on station 1's node.
        let s = nodes.as_slice();
        let moved = StationNodes::from_nodes(vec![s[0], s[0], s[2]]);
        let (catalog, status) = load_or_build_routes(&path, route_fingerprint(&moved, &net), false, || {
            build_route_catalog(&st, &moved, &net, &DijkstraRouter)
        })
        .unwrap();
        assert_eq!(status, CacheStatus::Rebuilt);
        let route = catalog.get(StationId(1), StationId(2)).unwrap();
        assert_eq!(route.coords, vec![GeoPoint::new(0.0, 0.0)]);

        let (_, on_disk) = read_route_catalog(&path).unwrap();
        assert_eq!(on_disk.get(StationId(1), StationId(2)), Some(route));
    }

    #[test]
    fn invalidate_and_unreadable_catalog_rebuild() {
        let dir = tmp();
        let path = dir.path().join("routes.json");
        let (net, nodes) = network();
        let st = stations(1.0);
        let fp = route_fingerprint(&nodes, &net);
        let build = || build_route_catalog(&st, &nodes, &net, &DijkstraRouter);

        load_or_build_routes(&path, fp, false, build).unwrap();
        let (_, status) = load_or_build_routes(&path, fp, true, build).unwrap();
        assert_eq!(status, CacheStatus::Built);

        std::fs::write(&path, b"not json").unwrap();
        let (_, status) = load_or_build_routes(&path, fp, false, build).unwrap();
        assert_eq!(status, CacheStatus::Rebuilt);
    }

    #[test]
    fn failed_build_is_routes_error() {
        let dir = tmp();
        let path = dir.path().join("routes.json");
        let r = load_or_build_routes(&path, 1, false, || {
            Err(eb_matrix::RouteError::InvalidInput("no stations".into()))
        });
        assert!(matches!(r, Err(OutputError::Routes(_))));
        assert!(!path.exists());
    }
}

// ── CSV tables ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tables {
    use chrono::NaiveDate;

    use eb_core::StationId;
    use eb_stations::{assign_nodes_to_stations, StationNodes};
    use eb_trips::{connections, DailyActivity, Sex, TripLog, TripRecord};

    use super::helpers::{headers, network, stations, tmp};
    use crate::{write_connections, write_daily_activity, write_node_assignment, write_station_nodes};

    #[test]
    fn station_nodes_use_external_ids() {
        let dir = tmp();
        let path = dir.path().join("station_nodes.csv");
        let (net, nodes) = network();
        write_station_nodes(&path, &stations(1.0), &nodes, &net).unwrap();

        assert_eq!(headers(&path), ["station_id", "name", "lat", "lon", "node_id", "snap_distance_m"]);
        let rows: Vec<_> = csv::Reader::from_path(&path).unwrap().records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[2][0], "3");
        assert_eq!(&rows[2][4], "9003");
    }

    #[test]
    fn station_nodes_reject_foreign_nodes() {
        let dir = tmp();
        let (net, _) = network();
        let short = StationNodes::from_nodes(vec![eb_core::NodeId(0)]);
        assert!(write_station_nodes(&dir.path().join("x.csv"), &stations(1.0), &short, &net).is_err());
    }

    #[test]
    fn node_assignment_rows() {
        let dir = tmp();
        let path = dir.path().join("node_stations.csv");
        let (net, _) = network();
        let assignment = assign_nodes_to_stations(&net, &stations(1.0));
        write_node_assignment(&path, &net, &assignment).unwrap();

        assert_eq!(headers(&path), ["node_id", "lat", "lon", "station_id"]);
        let rows: Vec<_> = csv::Reader::from_path(&path).unwrap().records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[1][0], "9002");
        assert_eq!(&rows[1][3], "2");
    }

    #[test]
    fn connections_outbound_then_inbound() {
        let dir = tmp();
        let path = dir.path().join("connections_5.csv");
        let t0 = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let trip = |o, d| TripRecord {
            bike: 1,
            sex: Sex::Male,
            age: 30,
            origin: StationId(o),
            destination: StationId(d),
            departure: t0,
            arrival: t0 + chrono::Duration::seconds(120),
        };
        let log = TripLog::new(vec![trip(2, 1), trip(1, 3)]);
        let c = connections(StationId(1), &log, &stations(1.0)).unwrap();
        write_connections(&path, &c).unwrap();

        assert_eq!(headers(&path), ["direction", "counterpart", "trips", "mean_duration_secs", "distance_m"]);
        let rows: Vec<_> = csv::Reader::from_path(&path).unwrap().records().map(|r| r.unwrap()).collect();
        assert_eq!((&rows[0][0], &rows[0][1]), ("outbound", "3"));
        assert_eq!((&rows[1][0], &rows[1][1]), ("inbound", "2"));
        assert_eq!(&rows[1][2], "1");
    }

    #[test]
    fn daily_activity_one_row_per_station() {
        let dir = tmp();
        let path = dir.path().join("activity.csv");
        let day = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        let a = DailyActivity::for_day(&TripLog::default(), day, 4);
        write_daily_activity(&path, &a).unwrap();

        assert_eq!(headers(&path), ["station_id", "rentals", "returns"]);
        assert_eq!(csv::Reader::from_path(&path).unwrap().records().count(), 4);
    }
}

// ── Day stats ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod day_stats {
    use chrono::NaiveDate;

    use eb_matrix::build_straight;
    use eb_trips::{age_histogram, sex_counts, MotionHistograms, Sex, TripLog};

    use super::helpers::{stations, tmp};
    use crate::{day_stats_json, write_day_stats, DayStats};

    #[test]
    fn empty_day_has_null_age_histograms() {
        let day = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        let log = TripLog::default();
        let motion = MotionHistograms::for_day(&log, day, &build_straight(&stations(1.0)));
        let female = age_histogram(&log, day, Sex::Female);
        let stats = DayStats {
            sex_counts:  sex_counts(&log, day),
            female_ages: female.as_ref(),
            male_ages:   None,
            motion:      &motion,
        };

        let json = day_stats_json(&stats);
        assert_eq!(json["date"], "2018-01-03");
        assert!(json["ages"]["F"].is_null());
        assert_eq!(json["duration_secs"]["M"]["counts"].as_array().unwrap().len(), 45);

        let dir = tmp();
        let path = dir.path().join("day_stats_2018-01-03.json");
        write_day_stats(&path, &stats).unwrap();
        assert!(path.exists());
    }
}
