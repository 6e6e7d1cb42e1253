use actix::Handler;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::capacity::{evaluate, slot_availability, CapacityResult, SlotAvailability};
use crate::models::{Backup, CapacitySettings, ContactMessage, MenuItem, Reservation, ReservationStatus};
use crate::services::messages::{
    AddContactMessage, BookingOutcome, CheckSlot, CreateReservation, DeleteContactMessage,
    DeleteMenuItem, DeleteReservation, ExportBackup, FetchCapacitySettings, FetchContactMessages,
    FetchMenu, FetchReservations, MarkMessageRead, RestoreBackup, SaveCapacitySettings,
    SaveMenuItem, SlotCheck, StoreResult, UpdateReservationStatus,
};
use crate::services::store_utils::StoreActor;
use crate::store::{load, save, Collection, DocumentStore};
use crate::types::StoreError;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Stored settings, or freshly persisted defaults on first access.
fn capacity_settings(store: &dyn DocumentStore) -> StoreResult<CapacitySettings> {
    match store.get(Collection::CapacitySettings)? {
        Some(document) if !document.trim().is_empty() => {
            let settings: CapacitySettings = serde_json::from_str(&document)?;
            settings.validate().map_err(StoreError::InvalidDocument)?;
            Ok(settings)
        }
        _ => {
            let settings = CapacitySettings::default();
            save(store, Collection::CapacitySettings, &settings)?;
            info!("capacity settings initialised with defaults");
            Ok(settings)
        }
    }
}

impl Handler<CheckSlot> for StoreActor {
    type Result = StoreResult<SlotCheck>;

    fn handle(&mut self, msg: CheckSlot, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let settings = match capacity_settings(store) {
            Ok(settings) => settings,
            // A stored document that fails validation is a configuration fault.
            Err(err @ StoreError::InvalidDocument(_)) => return Err(err),
            Err(err) => {
                warn!(error = %err, "capacity settings unavailable, check could not be performed");
                return Ok(SlotCheck::Checked(SlotAvailability {
                    capacity_enabled: true,
                    result: CapacityResult::check_failed(msg.guests),
                }));
            }
        };

        if !settings.offers_slot(&msg.time) {
            return Ok(SlotCheck::UnknownSlot);
        }

        Ok(SlotCheck::Checked(slot_availability(&settings, store, &msg.date, &msg.time, msg.guests)))
    }
}

impl Handler<CreateReservation> for StoreActor {
    type Result = StoreResult<BookingOutcome>;

    fn handle(&mut self, msg: CreateReservation, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let new = msg.0;
        let settings = capacity_settings(store)?;

        if !settings.offers_slot(&new.time) {
            return Ok(BookingOutcome::UnknownSlot);
        }

        let mut reservations: Vec<Reservation> = load(store, Collection::Reservations)?;

        if self.atomic_capacity && settings.is_enabled {
            let result = evaluate(
                &reservations,
                settings.max_guests_per_slot,
                &new.date,
                &new.time,
                new.guests,
            );
            if !result.available {
                info!(date = %new.date, time = %new.time, guests = new.guests, "booking refused, slot is full");
                return Ok(BookingOutcome::Full(result));
            }
        }

        let reservation = Reservation {
            id: new_id(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            date: new.date,
            time: new.time,
            guests: new.guests,
            status: ReservationStatus::Pending,
            note: new.note,
            consent: new.consent,
            created_at: Utc::now(),
        };
        reservations.push(reservation.clone());
        save(store, Collection::Reservations, &reservations)?;

        info!(id = %reservation.id, date = %reservation.date, time = %reservation.time, guests = reservation.guests, "reservation created");
        Ok(BookingOutcome::Booked(reservation))
    }
}

impl Handler<FetchReservations> for StoreActor {
    type Result = StoreResult<Vec<Reservation>>;

    fn handle(&mut self, msg: FetchReservations, _ctx: &mut Self::Context) -> Self::Result {
        let mut reservations: Vec<Reservation> = load(self.store.as_ref(), Collection::Reservations)?;

        if let Some(date) = msg.date {
            reservations.retain(|reservation| reservation.date == date);
        }
        reservations.sort_by(|a, b| {
            (&a.date, &a.time, a.created_at).cmp(&(&b.date, &b.time, b.created_at))
        });

        Ok(reservations)
    }
}

impl Handler<UpdateReservationStatus> for StoreActor {
    type Result = StoreResult<Option<BookingOutcome>>;

    fn handle(&mut self, msg: UpdateReservationStatus, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let mut reservations: Vec<Reservation> = load(store, Collection::Reservations)?;

        let Some(index) = reservations.iter().position(|reservation| reservation.id == msg.id) else {
            return Ok(None);
        };

        let current = &reservations[index];
        let reinstating = !current.status.occupies_slot() && msg.status.occupies_slot();
        if reinstating && self.atomic_capacity {
            let settings = capacity_settings(store)?;
            if settings.is_enabled {
                let result = evaluate(
                    &reservations,
                    settings.max_guests_per_slot,
                    &current.date,
                    &current.time,
                    current.guests,
                );
                if !result.available {
                    return Ok(Some(BookingOutcome::Full(result)));
                }
            }
        }

        reservations[index].status = msg.status;
        let updated = reservations[index].clone();
        save(store, Collection::Reservations, &reservations)?;

        info!(id = %updated.id, status = ?updated.status, "reservation status updated");
        Ok(Some(BookingOutcome::Booked(updated)))
    }
}

impl Handler<DeleteReservation> for StoreActor {
    type Result = StoreResult<bool>;

    fn handle(&mut self, msg: DeleteReservation, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let mut reservations: Vec<Reservation> = load(store, Collection::Reservations)?;
        let before = reservations.len();

        reservations.retain(|reservation| reservation.id != msg.0);
        if reservations.len() == before {
            return Ok(false);
        }

        save(store, Collection::Reservations, &reservations)?;
        info!(id = %msg.0, "reservation deleted");
        Ok(true)
    }
}

impl Handler<FetchCapacitySettings> for StoreActor {
    type Result = StoreResult<CapacitySettings>;

    fn handle(&mut self, _msg: FetchCapacitySettings, _ctx: &mut Self::Context) -> Self::Result {
        capacity_settings(self.store.as_ref())
    }
}

impl Handler<SaveCapacitySettings> for StoreActor {
    type Result = StoreResult<CapacitySettings>;

    fn handle(&mut self, msg: SaveCapacitySettings, _ctx: &mut Self::Context) -> Self::Result {
        msg.0.validate().map_err(StoreError::InvalidDocument)?;
        save(self.store.as_ref(), Collection::CapacitySettings, &msg.0)?;

        info!(
            enabled = msg.0.is_enabled,
            max_guests_per_slot = msg.0.max_guests_per_slot,
            "capacity settings saved"
        );
        Ok(msg.0)
    }
}

impl Handler<FetchMenu> for StoreActor {
    type Result = StoreResult<Vec<MenuItem>>;

    fn handle(&mut self, msg: FetchMenu, _ctx: &mut Self::Context) -> Self::Result {
        let mut menu: Vec<MenuItem> = load(self.store.as_ref(), Collection::Menu)?;

        if msg.only_available {
            menu.retain(|item| item.is_available);
        }

        Ok(menu)
    }
}

impl Handler<SaveMenuItem> for StoreActor {
    type Result = StoreResult<MenuItem>;

    fn handle(&mut self, msg: SaveMenuItem, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let input = msg.0;
        let mut menu: Vec<MenuItem> = load(store, Collection::Menu)?;

        let item = MenuItem {
            id: input.id.unwrap_or_else(new_id),
            category: input.category,
            name: input.name,
            description: input.description,
            price: input.price,
            image_url: input.image_url,
            is_available: input.is_available,
        };

        match menu.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => menu.push(item.clone()),
        }
        save(store, Collection::Menu, &menu)?;

        info!(id = %item.id, name = %item.name, "menu item saved");
        Ok(item)
    }
}

impl Handler<DeleteMenuItem> for StoreActor {
    type Result = StoreResult<bool>;

    fn handle(&mut self, msg: DeleteMenuItem, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let mut menu: Vec<MenuItem> = load(store, Collection::Menu)?;
        let before = menu.len();

        menu.retain(|item| item.id != msg.0);
        if menu.len() == before {
            return Ok(false);
        }

        save(store, Collection::Menu, &menu)?;
        info!(id = %msg.0, "menu item deleted");
        Ok(true)
    }
}

impl Handler<AddContactMessage> for StoreActor {
    type Result = StoreResult<ContactMessage>;

    fn handle(&mut self, msg: AddContactMessage, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let new = msg.0;
        let mut messages: Vec<ContactMessage> = load(store, Collection::Messages)?;

        let message = ContactMessage {
            id: new_id(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            subject: new.subject,
            message: new.message,
            is_read: false,
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        save(store, Collection::Messages, &messages)?;

        Ok(message)
    }
}

impl Handler<FetchContactMessages> for StoreActor {
    type Result = StoreResult<Vec<ContactMessage>>;

    fn handle(&mut self, _msg: FetchContactMessages, _ctx: &mut Self::Context) -> Self::Result {
        let mut messages: Vec<ContactMessage> = load(self.store.as_ref(), Collection::Messages)?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(messages)
    }
}

impl Handler<MarkMessageRead> for StoreActor {
    type Result = StoreResult<Option<ContactMessage>>;

    fn handle(&mut self, msg: MarkMessageRead, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let mut messages: Vec<ContactMessage> = load(store, Collection::Messages)?;

        let Some(message) = messages.iter_mut().find(|message| message.id == msg.0) else {
            return Ok(None);
        };
        message.is_read = true;
        let updated = message.clone();

        save(store, Collection::Messages, &messages)?;
        Ok(Some(updated))
    }
}

impl Handler<DeleteContactMessage> for StoreActor {
    type Result = StoreResult<bool>;

    fn handle(&mut self, msg: DeleteContactMessage, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let mut messages: Vec<ContactMessage> = load(store, Collection::Messages)?;
        let before = messages.len();

        messages.retain(|message| message.id != msg.0);
        if messages.len() == before {
            return Ok(false);
        }

        save(store, Collection::Messages, &messages)?;
        info!(id = %msg.0, "contact message deleted");
        Ok(true)
    }
}

impl Handler<ExportBackup> for StoreActor {
    type Result = StoreResult<Backup>;

    fn handle(&mut self, _msg: ExportBackup, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();

        Ok(Backup {
            exported_at: Utc::now(),
            reservations: load(store, Collection::Reservations)?,
            capacity: capacity_settings(store)?,
            menu: load(store, Collection::Menu)?,
            messages: load(store, Collection::Messages)?,
        })
    }
}

impl Handler<RestoreBackup> for StoreActor {
    type Result = StoreResult<()>;

    fn handle(&mut self, msg: RestoreBackup, _ctx: &mut Self::Context) -> Self::Result {
        let store = self.store.as_ref();
        let backup = msg.0;
        backup.capacity.validate().map_err(StoreError::InvalidDocument)?;

        // Collections are overwritten one by one; a failure part-way leaves
        // the earlier ones restored.
        save(store, Collection::Reservations, &backup.reservations)?;
        save(store, Collection::CapacitySettings, &backup.capacity)?;
        save(store, Collection::Menu, &backup.menu)?;
        save(store, Collection::Messages, &backup.messages)?;

        info!(
            exported_at = %backup.exported_at,
            reservations = backup.reservations.len(),
            menu = backup.menu.len(),
            messages = backup.messages.len(),
            "backup restored"
        );
        Ok(())
    }
}
