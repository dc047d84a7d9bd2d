/// Number of records `/closest/` answers with.
pub const DEFAULT_CLOSEST: usize = 3;

// Mean Earth radius (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

pub trait Located {
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

/// Great-circle distance in kilometers, using the haversine formula.
pub fn geodesic_distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat_from.cos() * lat_to.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns up to `k` records ordered by distance to `target`, nearest first.
///
/// The sort is stable, so records at the same distance keep their input order.
pub fn find_closest<T: Located>(target: Coordinate, records: Vec<T>, k: usize) -> Vec<T> {
    let mut by_distance: Vec<(f64, T)> = records
        .into_iter()
        .map(|record| (geodesic_distance_km(target, record.coordinate()), record))
        .collect();

    by_distance.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    by_distance
        .into_iter()
        .take(k)
        .map(|(_, record)| record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tagged(&'static str, Coordinate);

    impl Located for Tagged {
        fn coordinate(&self) -> Coordinate {
            self.1
        }
    }

    fn ferry_building() -> Coordinate {
        Coordinate::new(37.7955, -122.3937)
    }

    #[test]
    fn distance_to_self_is_zero() {
        let here = ferry_building();
        assert_eq!(geodesic_distance_km(here, here), 0.0);
    }

    #[test]
    fn distance_matches_known_city_pair() {
        // San Francisco to Los Angeles is roughly 559 km along the great circle.
        let sf = Coordinate::new(37.7749, -122.4194);
        let la = Coordinate::new(34.0522, -118.2437);

        let distance = geodesic_distance_km(sf, la);
        assert!((distance - 559.0).abs() < 2.0, "got {distance}");
        assert_eq!(distance, geodesic_distance_km(la, sf));
    }

    #[test]
    fn orders_by_distance_and_truncates() {
        let records = vec![
            Tagged("far", Coordinate::new(37.70, -122.40)),
            Tagged("near", Coordinate::new(37.7956, -122.3937)),
            Tagged("middle", Coordinate::new(37.78, -122.41)),
            Tagged("farthest", Coordinate::new(38.50, -121.50)),
        ];

        let closest = find_closest(ferry_building(), records, 3);
        let names: Vec<_> = closest.iter().map(|t| t.0).collect();

        assert_eq!(names, vec!["near", "middle", "far"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let spot = Coordinate::new(37.799260113502285, -122.39961794865545);
        let records = vec![
            Tagged("second-nearest", Coordinate::new(37.80, -122.41)),
            Tagged("first", spot),
            Tagged("second", spot),
            Tagged("third", spot),
        ];

        let closest = find_closest(spot, records, 3);
        let names: Vec<_> = closest.iter().map(|t| t.0).collect();

        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn k_larger_than_input_returns_everything_sorted() {
        let records = vec![
            Coordinate::new(10.0, 10.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 0.0),
        ];

        let closest = find_closest(Coordinate::new(0.0, 0.0), records, 10);

        assert_eq!(
            closest,
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let closest = find_closest::<Coordinate>(ferry_building(), Vec::new(), DEFAULT_CLOSEST);
        assert!(closest.is_empty());
    }
}
