//! Scheduling engine: booking, rescheduling, cancellation and lookups.
//!
//! Slots are a fixed 30 minutes over half-open `[start, end)` intervals, so
//! back-to-back bookings never collide. The overlap guard itself lives in
//! the repository as a conditional write; this service supplies the slot
//! arithmetic and the domain outcomes.

use crate::core::error::Error;
use crate::core::traits::{CancelOutcome, SchedulingService};
use crate::infrastructure::entities::{
    Admin, Appointment, AppointmentStatus, AppointmentWithParties, Client,
};
use crate::infrastructure::traits::{AppointmentRepository, NewAppointment};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use di::{Ref, injectable};
use log::info;
use uuid::Uuid;

pub const SLOT_MINUTES: i64 = 30;

pub fn slot_bounds(date: NaiveDate, time: NaiveTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(time);
    (start, start + Duration::minutes(SLOT_MINUTES))
}

#[injectable(SchedulingService)]
pub struct MySchedulingService {
    appointments: Ref<dyn AppointmentRepository>,
}

impl MySchedulingService {
    async fn populated(&self, id: Uuid) -> Result<AppointmentWithParties, Error> {
        self.appointments
            .fetch_with_parties(id)
            .await?
            .ok_or(Error::Store(sqlx::Error::RowNotFound))
    }
}

#[async_trait]
impl SchedulingService for MySchedulingService {
    async fn book(
        &self,
        client: &Client,
        admin: &Admin,
        date: NaiveDate,
        time: NaiveTime,
        purpose: &str,
        payment_id: Option<&str>,
    ) -> Result<AppointmentWithParties, Error> {
        let (start_time, end_time) = slot_bounds(date, time);

        let appointment = self
            .appointments
            .insert_if_slot_free(NewAppointment {
                client: client.id,
                admin: admin.id,
                start_time,
                end_time,
                purpose: purpose.to_owned(),
                payment_id: payment_id.unwrap_or_default().to_owned(),
            })
            .await?
            .ok_or_else(|| Error::conflict("Time slot already booked"))?;

        info!(
            "booked {} for {} with {}",
            appointment.appointment_id, client.client_id, admin.admin_id
        );

        self.populated(appointment.id).await
    }

    async fn reschedule(
        &self,
        appointment: &Appointment,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<AppointmentWithParties, Error> {
        let (start_time, end_time) = slot_bounds(date, time);

        let moved = self
            .appointments
            .reschedule_if_slot_free(appointment.id, start_time, end_time)
            .await?;

        if !moved {
            return Err(Error::conflict("Time slot already booked"));
        }

        info!("rescheduled {}", appointment.appointment_id);
        self.populated(appointment.id).await
    }

    async fn cancel(
        &self,
        appointment: &Appointment,
        reason: Option<&str>,
    ) -> Result<CancelOutcome, Error> {
        if appointment.status == AppointmentStatus::Cancelled {
            let unchanged = self.populated(appointment.id).await?;
            return Ok(CancelOutcome::AlreadyCancelled(unchanged));
        }

        self.appointments
            .set_cancelled(appointment.id, reason)
            .await?;

        info!("cancelled {}", appointment.appointment_id);
        self.populated(appointment.id)
            .await
            .map(CancelOutcome::Cancelled)
    }

    async fn appointments_for_client(
        &self,
        client: &Client,
    ) -> Result<Vec<AppointmentWithParties>, Error> {
        Ok(self.appointments.list_for_client(client.id).await?)
    }

    async fn appointments_for_admin(
        &self,
        admin: &Admin,
    ) -> Result<Vec<AppointmentWithParties>, Error> {
        Ok(self.appointments.list_for_admin(admin.id).await?)
    }

    async fn upcoming_for_admin(&self, admin: &Admin) -> Result<Vec<Appointment>, Error> {
        Ok(self.appointments.list_upcoming_for_admin(admin.id).await?)
    }
}
