use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::DeliveryBotError;

pub mod generative;
pub mod geocoding;
pub mod routing;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Display, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[display(fmt = "({:.4}, {:.4})", lat, lng)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = DeliveryBotError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.lat, raw.lng)
    }
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, DeliveryBotError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(DeliveryBotError::InvalidCoordinate { lat, lng });
        }
        Ok(Coordinates { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// GeoJSON order, as routing providers expect it.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Great-circle distance in kilometres on a spherical Earth.
pub fn haversine_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(-90.01, 0.0)]
    #[case(0.0, 180.5)]
    #[case(0.0, -181.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_out_of_range(#[case] lat: f64, #[case] lng: f64) {
        assert!(matches!(
            Coordinates::new(lat, lng),
            Err(DeliveryBotError::InvalidCoordinate { .. })
        ));
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(28.5355, 77.391)]
    fn accepts_bounds(#[case] lat: f64, #[case] lng: f64) {
        assert!(Coordinates::new(lat, lng).is_ok());
    }

    #[test]
    fn deserializing_validates() {
        let ok: Coordinates = serde_json::from_str(r#"{"lat": 28.4595, "lng": 77.0266}"#).unwrap();
        assert_eq!(ok, point(28.4595, 77.0266));
        assert!(serde_json::from_str::<Coordinates>(r#"{"lat": 91.0, "lng": 0.0}"#).is_err());
    }

    #[test]
    fn noida_to_gurgaon_is_about_37_km() {
        let noida = point(28.5355, 77.3910);
        let gurgaon = point(28.4595, 77.0266);
        let distance = haversine_km(&noida, &gurgaon);
        assert!((distance - 36.6).abs() < 1.0, "got {}", distance);
    }

    #[test]
    fn lng_lat_swaps_order() {
        assert_eq!(point(28.5, 77.2).lng_lat(), [77.2, 28.5]);
    }

    fn coordinates() -> impl Strategy<Value = Coordinates> {
        (-90.0..=90.0f64, -180.0..=180.0f64).prop_map(|(lat, lng)| point(lat, lng))
    }

    proptest! {
        #[test]
        fn haversine_is_symmetric(a in coordinates(), b in coordinates()) {
            let forward = haversine_km(&a, &b);
            let backward = haversine_km(&b, &a);
            prop_assert!((forward - backward).abs() < 1e-9);
        }

        #[test]
        fn haversine_to_self_is_zero(a in coordinates()) {
            prop_assert_eq!(haversine_km(&a, &a), 0.0);
        }

        #[test]
        fn haversine_is_bounded_by_half_circumference(a in coordinates(), b in coordinates()) {
            let distance = haversine_km(&a, &b);
            prop_assert!(distance >= 0.0);
            prop_assert!(distance <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
