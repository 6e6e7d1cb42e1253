use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    /// Pending and confirmed bookings hold seats; cancelled ones do not.
    pub fn occupies_slot(self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub date: String,
    pub time: String,
    pub guests: u32,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub consent: bool,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_in_slot(&self, date: &str, time: &str) -> bool {
        self.date == date && self.time == time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDay {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_guests_per_slot: Option<u32>,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Admin-editable capacity limits.
///
/// Only `is_enabled` and `max_guests_per_slot` drive admission. The table
/// figures, slot list and special days are kept for the admin panel; the slot
/// list is also used to reject bookings outside opening hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapacitySettings {
    pub is_enabled: bool,
    pub max_guests_per_slot: u32,
    pub max_tables_per_slot: u32,
    pub average_guests_per_table: u32,
    pub time_slots: Vec<String>,
    pub special_days: Vec<SpecialDay>,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            is_enabled: true,
            max_guests_per_slot: 50,
            max_tables_per_slot: 12,
            average_guests_per_table: 4,
            time_slots: default_time_slots(),
            special_days: Vec::new(),
        }
    }
}

impl CapacitySettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_guests_per_slot == 0 {
            return Err("maxGuestsPerSlot must be at least 1".into());
        }
        if self.average_guests_per_table == 0 {
            return Err("averageGuestsPerTable must be at least 1".into());
        }
        if let Some(slot) = self.time_slots.iter().find(|slot| !is_half_hour_slot(slot)) {
            return Err(format!("'{slot}' is not a half-hour time slot"));
        }
        if let Some(day) = self.special_days.iter().find(|day| parse_date(&day.date).is_none()) {
            return Err(format!("'{}' is not a valid special day date", day.date));
        }

        Ok(())
    }

    pub fn offers_slot(&self, time: &str) -> bool {
        self.time_slots.is_empty() || self.time_slots.iter().any(|slot| slot == time)
    }
}

/// Half-hour slots from opening (12:00) to the last seating (22:00).
pub fn default_time_slots() -> Vec<String> {
    (24..=44)
        .map(|half_hours: u32| format!("{:02}:{:02}", half_hours / 2, (half_hours % 2) * 30))
        .collect()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

fn is_half_hour_slot(value: &str) -> bool {
    parse_time(value).is_some_and(|time| time.minute() % 30 == 0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "available_by_default")]
    pub is_available: bool,
}

fn available_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of every collection, used for admin export and restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
    #[serde(default)]
    pub capacity: CapacitySettings,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub messages: Vec<ContactMessage>,
}
