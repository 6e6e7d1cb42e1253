//! Per-slot guest capacity.
//!
//! A slot is a `(date, time)` pair. Its occupancy is the sum of `guests`
//! over pending and confirmed reservations with exactly that date and time.
//! A party is admitted when occupancy plus the party fits within
//! `max_guests_per_slot`; the boundary is inclusive.

use serde::Serialize;
use tracing::warn;

use crate::models::{CapacitySettings, Reservation};
use crate::store::ReservationSource;
use crate::types::{CAPACITY_CHECK_FAILED, CAPACITY_DISABLED};

/// Reported as remaining capacity when the check is switched off.
pub const UNLIMITED_CAPACITY: u32 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityResult {
    pub available: bool,
    pub message: String,
    pub current_guests: u32,
    pub remaining_capacity: u32,
    pub requested_guests: u32,
}

impl CapacityResult {
    /// Soft-fail answer used when reservations could not be read.
    pub fn check_failed(requested_guests: u32) -> Self {
        Self {
            available: false,
            message: CAPACITY_CHECK_FAILED.to_owned(),
            current_guests: 0,
            remaining_capacity: 0,
            requested_guests,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub capacity_enabled: bool,
    #[serde(flatten)]
    pub result: CapacityResult,
}

pub fn occupancy(reservations: &[Reservation], date: &str, time: &str) -> u32 {
    reservations
        .iter()
        .filter(|reservation| reservation.is_in_slot(date, time))
        .filter(|reservation| reservation.status.occupies_slot())
        .fold(0u32, |total, reservation| total.saturating_add(reservation.guests))
}

pub fn evaluate(
    reservations: &[Reservation],
    max_guests_per_slot: u32,
    date: &str,
    time: &str,
    requested_guests: u32,
) -> CapacityResult {
    let current_guests = occupancy(reservations, date, time);
    let projected = current_guests.saturating_add(requested_guests);

    if projected <= max_guests_per_slot {
        let remaining_capacity = max_guests_per_slot - projected;
        CapacityResult {
            available: true,
            message: format!(
                "{requested_guests} kişilik rezervasyon için yer mevcut. Kalan kapasite: {remaining_capacity} kişi."
            ),
            current_guests,
            remaining_capacity,
            requested_guests,
        }
    } else {
        let remaining_capacity = max_guests_per_slot.saturating_sub(current_guests);
        CapacityResult {
            available: false,
            message: format!(
                "Üzgünüz, seçtiğiniz saat için yeterli yer yok. Bu saate en fazla {remaining_capacity} kişi daha kabul edebiliyoruz."
            ),
            current_guests,
            remaining_capacity,
            requested_guests,
        }
    }
}

/// Reads the slot from `source` and evaluates it. Never fails: a source
/// error turns into [`CapacityResult::check_failed`].
pub fn check_capacity<S>(
    source: &S,
    max_guests_per_slot: u32,
    date: &str,
    time: &str,
    requested_guests: u32,
) -> CapacityResult
where
    S: ReservationSource + ?Sized,
{
    match source.list_reservations(date, time) {
        Ok(reservations) => evaluate(&reservations, max_guests_per_slot, date, time, requested_guests),
        Err(err) => {
            warn!(%date, %time, error = %err, "capacity check could not read reservations");
            CapacityResult::check_failed(requested_guests)
        }
    }
}

/// Entry point for callers holding the admin settings. With the check
/// disabled the evaluator is not consulted at all and every party fits.
pub fn slot_availability<S>(
    settings: &CapacitySettings,
    source: &S,
    date: &str,
    time: &str,
    requested_guests: u32,
) -> SlotAvailability
where
    S: ReservationSource + ?Sized,
{
    if !settings.is_enabled {
        return SlotAvailability {
            capacity_enabled: false,
            result: CapacityResult {
                available: true,
                message: CAPACITY_DISABLED.to_owned(),
                current_guests: 0,
                remaining_capacity: UNLIMITED_CAPACITY,
                requested_guests,
            },
        };
    }

    SlotAvailability {
        capacity_enabled: true,
        result: check_capacity(source, settings.max_guests_per_slot, date, time, requested_guests),
    }
}
