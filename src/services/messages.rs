use actix::Message;

use crate::capacity::{CapacityResult, SlotAvailability};
use crate::models::{Backup, CapacitySettings, ContactMessage, MenuItem, Reservation, ReservationStatus};
use crate::types::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum SlotCheck {
    Checked(SlotAvailability),
    UnknownSlot,
}

#[derive(Message)]
#[rtype(result = "StoreResult<SlotCheck>")]
pub struct CheckSlot {
    pub date: String,
    pub time: String,
    pub guests: u32,
}

pub struct NewReservation {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub guests: u32,
    pub note: Option<String>,
    pub consent: bool,
}

#[derive(Debug)]
pub enum BookingOutcome {
    Booked(Reservation),
    Full(CapacityResult),
    UnknownSlot,
}

#[derive(Message)]
#[rtype(result = "StoreResult<BookingOutcome>")]
pub struct CreateReservation(pub NewReservation);

#[derive(Message)]
#[rtype(result = "StoreResult<Vec<Reservation>>")]
pub struct FetchReservations {
    pub date: Option<String>,
}

/// `Ok(None)` when no reservation has the given id.
#[derive(Message)]
#[rtype(result = "StoreResult<Option<BookingOutcome>>")]
pub struct UpdateReservationStatus {
    pub id: String,
    pub status: ReservationStatus,
}

#[derive(Message)]
#[rtype(result = "StoreResult<bool>")]
pub struct DeleteReservation(pub String);

#[derive(Message)]
#[rtype(result = "StoreResult<CapacitySettings>")]
pub struct FetchCapacitySettings;

#[derive(Message)]
#[rtype(result = "StoreResult<CapacitySettings>")]
pub struct SaveCapacitySettings(pub CapacitySettings);

#[derive(Message)]
#[rtype(result = "StoreResult<Vec<MenuItem>>")]
pub struct FetchMenu {
    pub only_available: bool,
}

pub struct MenuItemInput {
    pub id: Option<String>,
    pub category: String,
    pub name: String,
    pub description: String,
    pub price: u32,
    pub image_url: Option<String>,
    pub is_available: bool,
}

#[derive(Message)]
#[rtype(result = "StoreResult<MenuItem>")]
pub struct SaveMenuItem(pub MenuItemInput);

#[derive(Message)]
#[rtype(result = "StoreResult<bool>")]
pub struct DeleteMenuItem(pub String);

pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Message)]
#[rtype(result = "StoreResult<ContactMessage>")]
pub struct AddContactMessage(pub NewContactMessage);

#[derive(Message)]
#[rtype(result = "StoreResult<Vec<ContactMessage>>")]
pub struct FetchContactMessages;

#[derive(Message)]
#[rtype(result = "StoreResult<Option<ContactMessage>>")]
pub struct MarkMessageRead(pub String);

#[derive(Message)]
#[rtype(result = "StoreResult<bool>")]
pub struct DeleteContactMessage(pub String);

#[derive(Message)]
#[rtype(result = "StoreResult<Backup>")]
pub struct ExportBackup;

#[derive(Message)]
#[rtype(result = "StoreResult<()>")]
pub struct RestoreBackup(pub Backup);
