//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Mints the public identifier and persists the record in one
    /// transaction; a counter failure leaves no partial row behind.
    async fn create(&self, new_client: entities::NewClient)
    -> Result<entities::Client, sqlx::Error>;

    async fn find_by_public_id(
        &self,
        client_id: &str,
    ) -> Result<Option<entities::Client>, sqlx::Error>;

    async fn find_by_email(&self, email: &str) -> Result<Option<entities::Client>, sqlx::Error>;

    async fn find_by_ref(&self, id: Uuid) -> Result<Option<entities::Client>, sqlx::Error>;

    async fn update_profile(
        &self,
        id: Uuid,
        update: entities::ClientUpdate,
    ) -> Result<Option<entities::Client>, sqlx::Error>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, new_admin: entities::NewAdmin) -> Result<entities::Admin, sqlx::Error>;

    async fn find_by_public_id(
        &self,
        admin_id: &str,
    ) -> Result<Option<entities::Admin>, sqlx::Error>;

    async fn find_by_email(&self, email: &str) -> Result<Option<entities::Admin>, sqlx::Error>;

    async fn find_by_ref(&self, id: Uuid) -> Result<Option<entities::Admin>, sqlx::Error>;

    async fn update_profile(
        &self,
        id: Uuid,
        update: entities::AdminUpdate,
    ) -> Result<Option<entities::Admin>, sqlx::Error>;

    async fn list_all(&self) -> Result<Vec<entities::Admin>, sqlx::Error>;
}

/// Input for a conditional appointment insert. The repository mints the
/// public identifier itself so the counter increment and the row share a
/// transaction.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub client: Uuid,
    pub admin: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub purpose: String,
    pub payment_id: String,
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Inserts the appointment unless an `Upcoming` row for the same admin
    /// overlaps `[start_time, end_time)`. The overlap test and the write are
    /// a single guarded statement, so concurrent bookings for one slot
    /// cannot both succeed. Returns `None` when the slot was taken.
    async fn insert_if_slot_free(
        &self,
        new: NewAppointment,
    ) -> Result<Option<entities::Appointment>, sqlx::Error>;

    /// Moves the appointment to a new window and marks it `Rescheduled`,
    /// unless another `Upcoming` row for the same admin overlaps. The row
    /// being moved never conflicts with itself. Returns `false` when the
    /// slot was taken.
    async fn reschedule_if_slot_free(
        &self,
        id: Uuid,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<bool, sqlx::Error>;

    async fn set_cancelled(&self, id: Uuid, reason: Option<&str>) -> Result<(), sqlx::Error>;

    async fn find_by_public_id(
        &self,
        appointment_id: &str,
    ) -> Result<Option<entities::Appointment>, sqlx::Error>;

    async fn find_by_ref(&self, id: Uuid) -> Result<Option<entities::Appointment>, sqlx::Error>;

    async fn fetch_with_parties(
        &self,
        id: Uuid,
    ) -> Result<Option<entities::AppointmentWithParties>, sqlx::Error>;

    async fn list_for_client(
        &self,
        client: Uuid,
    ) -> Result<Vec<entities::AppointmentWithParties>, sqlx::Error>;

    async fn list_for_admin(
        &self,
        admin: Uuid,
    ) -> Result<Vec<entities::AppointmentWithParties>, sqlx::Error>;

    async fn list_upcoming_for_admin(
        &self,
        admin: Uuid,
    ) -> Result<Vec<entities::Appointment>, sqlx::Error>;
}
