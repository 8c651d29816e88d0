use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use crate::{
    services::{haversine_km, Coordinates},
    DeliveryBotError,
};

#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub u32);

/// A fixed-location fulfilment point deliveries originate from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub location: Coordinates,
}

pub fn default_facilities() -> Vec<Facility> {
    [
        (1, "Noida Warehouse", 28.5355, 77.3910),
        (2, "Gurgaon Warehouse", 28.4595, 77.0266),
    ]
    .into_iter()
    .filter_map(|(id, name, lat, lng)| {
        Some(Facility {
            id: FacilityId(id),
            name: name.to_string(),
            location: Coordinates::new(lat, lng).ok()?,
        })
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct FacilityRegistry {
    facilities: Vec<Facility>,
}

impl FacilityRegistry {
    pub fn new(facilities: Vec<Facility>) -> Self {
        FacilityRegistry { facilities }
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// The facility closest to `point` with its great-circle distance in km.
    /// Ties go to the facility listed first.
    pub fn nearest(&self, point: &Coordinates) -> Result<(&Facility, f64), DeliveryBotError> {
        let mut nearest: Option<(&Facility, f64)> = None;
        for facility in &self.facilities {
            let distance = haversine_km(&facility.location, point);
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((facility, distance)),
            }
        }
        nearest.ok_or(DeliveryBotError::NoFacilityAvailable)
    }
}
