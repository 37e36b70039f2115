//! Unit tests for eb-matrix.

#[cfg(test)]
mod helpers {
    use eb_core::{GeoPoint, NodeId, StationId};
    use eb_spatial::{RoadNetwork, RoadNetworkBuilder};
    use eb_stations::{Station, StationNodes, StationTable};

    pub fn station(id: u32, lat: f64, lon: f64) -> Station {
        Station { id: StationId(id), name: format!("{id} TEST"), pos: GeoPoint::new(lat, lon) }
    }

    /// A=(0,0), B=(0,1), C=(1,0); roads A–B and A–C of length 1.
    /// Stations 1, 2, 3 sit exactly on A, B, C.
    pub fn triangle() -> (StationTable, StationNodes, RoadNetwork) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let bb = b.add_node(GeoPoint::new(0.0, 1.0));
        let c = b.add_node(GeoPoint::new(1.0, 0.0));
        b.add_road(a, bb, 1.0);
        b.add_road(a, c, 1.0);

        let table = StationTable::new(vec![
            station(1, 0.0, 0.0),
            station(2, 0.0, 1.0),
            station(3, 1.0, 0.0),
        ])
        .unwrap();
        (table, StationNodes::from_nodes(vec![a, bb, c]), b.build())
    }

    /// Two disconnected components: {1, 2} and {3}.  The 1→2 street is
    /// one-way, so 2→1 is unreachable as well.
    pub fn split() -> (StationTable, StationNodes, RoadNetwork) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 0.01));
        let n2 = b.add_node(GeoPoint::new(0.5, 0.5));
        let n3 = b.add_node(GeoPoint::new(0.5, 0.51));
        b.add_directed_edge(n0, n1, 1_200.0);
        b.add_road(n2, n3, 1_000.0);

        let table = StationTable::new(vec![
            station(1, 0.0, 0.0),
            station(2, 0.0, 0.01),
            station(3, 0.5, 0.5),
        ])
        .unwrap();
        (table, StationNodes::from_nodes(vec![n0, n1, n2]), b.build())
    }

    pub fn nodes(ids: &[u32]) -> StationNodes {
        StationNodes::from_nodes(ids.iter().map(|&i| NodeId(i)).collect())
    }
}

// ── Distance matrices ─────────────────────────────────────────────────────────

#[cfg(test)]
mod matrix {
    use approx::assert_relative_eq;

    use eb_core::{DistanceKind, GeoPoint, StationId};
    use eb_spatial::DijkstraRouter;

    use super::helpers::{nodes, split, triangle};
    use crate::{build_matrix, build_straight, build_street, DistanceMatrix, MatrixError};

    const S1: StationId = StationId(1);
    const S2: StationId = StationId(2);
    const S3: StationId = StationId(3);

    #[test]
    fn street_goes_through_the_shared_corner() {
        let (table, located, net) = triangle();
        let m = build_street(&table, &located, &net, &DijkstraRouter).unwrap();
        assert_eq!(m.kind(), DistanceKind::Street);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(S2, S3), 2.0);
        assert_eq!(m.get(S3, S2), 2.0);
        assert_eq!(m.get(S1, S2), 1.0);
        assert_eq!(m.get(S2, S2), 0.0);
        assert!(m.missing_pairs().is_empty());
    }

    #[test]
    fn straight_is_great_circle() {
        let (table, _, _) = triangle();
        let m = build_straight(&table);
        let expected = GeoPoint::new(0.0, 1.0).distance_m(GeoPoint::new(1.0, 0.0));
        assert_relative_eq!(m.get(S2, S3), expected, max_relative = 1e-12);
        // One degree of arc along the equator on a 6 371 009 m sphere.
        assert_relative_eq!(m.get(S1, S2), 111_195.08, epsilon = 0.1);
        assert!(m.is_symmetric());
        assert_eq!(m.get(S1, S1), 0.0);
    }

    #[test]
    fn unreachable_pairs_are_nan_and_nothing_else() {
        let (table, located, net) = split();
        let m = build_street(&table, &located, &net, &DijkstraRouter).unwrap();

        assert_eq!(m.get(S1, S2), 1_200.0);
        assert!(m.get(S2, S1).is_nan());
        assert!(m.get(S1, S3).is_nan());
        assert!(m.get(S3, S1).is_nan());
        assert!(m.distance(S3, S2).is_none());
        assert!(!m.is_symmetric());

        let missing = m.missing_pairs();
        assert_eq!(missing, vec![(S1, S3), (S2, S1), (S2, S3), (S3, S1), (S3, S2)]);
    }

    #[test]
    fn node_count_mismatch_is_rejected_before_routing() {
        let (table, _, net) = triangle();
        let err = build_street(&table, &nodes(&[0, 1]), &net, &DijkstraRouter).unwrap_err();
        assert!(matches!(err, MatrixError::NodeCountMismatch { stations: 3, nodes: 2 }));
    }

    #[test]
    fn node_outside_network_is_rejected() {
        let (table, _, net) = triangle();
        let err = build_street(&table, &nodes(&[0, 1, 9]), &net, &DijkstraRouter).unwrap_err();
        assert!(matches!(err, MatrixError::Spatial(_)));
    }

    #[test]
    fn build_matrix_dispatches_on_kind() {
        let (table, located, net) = triangle();
        let straight = build_matrix(DistanceKind::Straight, &table, &located, &net, &DijkstraRouter).unwrap();
        let street = build_matrix(DistanceKind::Street, &table, &located, &net, &DijkstraRouter).unwrap();
        assert_eq!(straight.kind(), DistanceKind::Straight);
        assert_eq!(street.kind(), DistanceKind::Street);
        assert!(straight.get(S2, S3) > street.get(S2, S3));
    }

    #[test]
    fn distance_rejects_unknown_ids() {
        let (table, _, _) = triangle();
        let m = build_straight(&table);
        assert!(m.distance(StationId(4), S1).is_none());
        assert!(m.distance(S1, S2).is_some());
        assert_eq!(m.row(S1).len(), 3);
    }

    #[test]
    fn from_values_checks_shape() {
        assert!(matches!(
            DistanceMatrix::from_values(DistanceKind::Straight, 2, vec![0.0; 3]),
            Err(MatrixError::ShapeMismatch { n: 2, expected: 4, got: 3 })
        ));
        let m = DistanceMatrix::from_values(DistanceKind::Street, 1, vec![0.0]).unwrap();
        assert_eq!(m.into_values(), vec![0.0]);
    }

    #[test]
    fn from_values_rejects_overflowing_size() {
        assert!(matches!(
            DistanceMatrix::from_values(DistanceKind::Street, usize::MAX, vec![]),
            Err(MatrixError::ShapeMismatch { got: 0, .. })
        ));
    }
}

// ── Route geometries ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routes {
    use eb_core::{GeoPoint, StationId};
    use eb_spatial::DijkstraRouter;
    use eb_stations::StationNodes;

    use super::helpers::{nodes, split, triangle};
    use crate::{build_route_catalog, route_between, route_key, RouteError, RouteGeometry};

    #[test]
    fn endpoints_match_located_nodes_both_ways() {
        let (_, located, net) = triangle();
        let there = route_between(StationId(2), StationId(3), &located, &net, &DijkstraRouter).unwrap();
        let back = route_between(StationId(3), StationId(2), &located, &net, &DijkstraRouter).unwrap();

        assert_eq!(there.coords.first(), Some(&GeoPoint::new(0.0, 1.0)));
        assert_eq!(there.coords.last(), Some(&GeoPoint::new(1.0, 0.0)));
        assert_eq!(there.coords.len(), 3);
        assert_eq!(there.length_m, 2.0);

        assert_eq!(back.coords.first(), Some(&GeoPoint::new(1.0, 0.0)));
        assert_eq!(back.coords.last(), Some(&GeoPoint::new(0.0, 1.0)));
        assert_eq!(there.key(), "2 to 3");
    }

    #[test]
    fn shared_node_gives_single_point_route() {
        let (_, _, net) = triangle();
        let shared = nodes(&[0, 0, 2]);
        let r = route_between(StationId(1), StationId(2), &shared, &net, &DijkstraRouter).unwrap();
        assert_eq!(r.coords, vec![GeoPoint::new(0.0, 0.0)]);
        assert_eq!(r.length_m, 0.0);
    }

    #[test]
    fn unreachable_pair_is_no_route() {
        let (_, located, net) = split();
        let err = route_between(StationId(2), StationId(1), &located, &net, &DijkstraRouter).unwrap_err();
        assert!(matches!(
            err,
            RouteError::NoRoute { origin: StationId(2), destination: StationId(1) }
        ));
    }

    #[test]
    fn bad_request_is_invalid_input() {
        let (_, located, net) = triangle();
        let unknown = route_between(StationId(1), StationId(7), &located, &net, &DijkstraRouter);
        assert!(matches!(unknown, Err(RouteError::InvalidInput(_))));

        let off_network = StationNodes::from_nodes(vec![eb_core::NodeId(0), eb_core::NodeId(42)]);
        let r = route_between(StationId(1), StationId(2), &off_network, &net, &DijkstraRouter);
        assert!(matches!(r, Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn catalog_covers_every_ordered_pair() {
        let (table, located, net) = triangle();
        let catalog = build_route_catalog(&table, &located, &net, &DijkstraRouter).unwrap();
        assert_eq!(catalog.len(), 6);
        assert!(catalog.unreachable().is_empty());
        assert!(catalog.get(StationId(1), StationId(1)).is_none());

        let keys: Vec<String> = catalog.iter().map(RouteGeometry::key).collect();
        assert_eq!(keys, ["1 to 2", "1 to 3", "2 to 1", "2 to 3", "3 to 1", "3 to 2"]);

        let single = route_between(StationId(3), StationId(2), &located, &net, &DijkstraRouter).unwrap();
        assert_eq!(catalog.lookup(StationId(3), StationId(2)).unwrap(), &single);
    }

    #[test]
    fn catalog_lists_unreachable_pairs() {
        let (table, located, net) = split();
        let catalog = build_route_catalog(&table, &located, &net, &DijkstraRouter).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.unreachable().len(), 5);
        assert!(matches!(
            catalog.lookup(StationId(1), StationId(3)),
            Err(RouteError::NoRoute { .. })
        ));
    }

    #[test]
    fn catalog_rejects_mismatched_nodes() {
        let (table, _, net) = triangle();
        let r = build_route_catalog(&table, &nodes(&[0]), &net, &DijkstraRouter);
        assert!(matches!(r, Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn geojson_feature_uses_lon_lat_order() {
        let (_, located, net) = triangle();
        let r = route_between(StationId(2), StationId(3), &located, &net, &DijkstraRouter).unwrap();
        let json = serde_json::to_value(r.to_feature()).unwrap();

        assert_eq!(json["geometry"]["type"], "LineString");
        assert_eq!(json["geometry"]["coordinates"][0], serde_json::json!([1.0, 0.0]));
        assert_eq!(json["properties"]["origin"], 2);
        assert_eq!(json["properties"]["destination"], 3);

        assert_eq!(RouteGeometry::from_feature(&r.to_feature()), Some(r));
    }

    #[test]
    fn single_point_feature_is_a_valid_linestring() {
        let r = RouteGeometry {
            origin: StationId(1),
            destination: StationId(2),
            coords: vec![GeoPoint::new(19.4, -99.1)],
            length_m: 0.0,
        };
        let f = r.to_feature();
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["geometry"]["coordinates"].as_array().unwrap().len(), 2);
        assert_eq!(RouteGeometry::from_feature(&f), Some(r));
    }

    #[test]
    fn street_context_is_limited_to_route_box() {
        let (_, located, net) = triangle();
        let r = route_between(StationId(1), StationId(2), &located, &net, &DijkstraRouter).unwrap();
        // Only the A–B road lies in the route's box.
        assert_eq!(r.street_context(&net).len(), 2);
        assert_eq!(route_key(StationId(12), StationId(345)), "12 to 345");
    }
}
