use rust_decimal::Decimal;
use serde::Serialize;

use crate::DeliveryBotError;

/// Flat fee up to a free distance, then a per-km charge rounded up to whole
/// currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeePolicy {
    base_fee: Decimal,
    free_threshold_km: Decimal,
    per_km_rate: Decimal,
}

impl FeePolicy {
    pub fn new(
        base_fee: Decimal,
        free_threshold_km: Decimal,
        per_km_rate: Decimal,
    ) -> Result<Self, DeliveryBotError> {
        for (key, value) in [
            ("DELIVERY_BASE_FEE", base_fee),
            ("DELIVERY_FREE_KM", free_threshold_km),
            ("DELIVERY_PER_KM_RATE", per_km_rate),
        ] {
            if value < Decimal::ZERO {
                return Err(DeliveryBotError::InvalidConfig {
                    key,
                    reason: format!("{} is negative", value),
                });
            }
        }
        Ok(FeePolicy {
            base_fee,
            free_threshold_km,
            per_km_rate,
        })
    }

    pub fn base_fee(&self) -> Decimal {
        self.base_fee
    }

    pub fn free_threshold_km(&self) -> Decimal {
        self.free_threshold_km
    }

    pub fn per_km_rate(&self) -> Decimal {
        self.per_km_rate
    }

    /// `None` when the charge does not fit in a `Decimal`.
    pub fn fee(&self, distance_km: Decimal) -> Option<Decimal> {
        if distance_km <= self.free_threshold_km {
            return Some(self.base_fee);
        }
        let excess = distance_km.checked_sub(self.free_threshold_km)?;
        let charge = excess.checked_mul(self.per_km_rate)?.ceil();
        self.base_fee.checked_add(charge)
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy {
            base_fee: Decimal::new(30, 0),
            free_threshold_km: Decimal::new(5, 0),
            per_km_rate: Decimal::new(5, 0),
        }
    }
}
