//! DI "Interfaces"

use crate::core::chat::FlowState;
use crate::core::error::Error;
use crate::infrastructure::entities::{
    Admin, AdminUpdate, Appointment, AppointmentWithParties, Client, ClientUpdate,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

/// Resolves human-readable identifiers to records. Absence is a value
/// (`None`), never a fault; `Err` means the backing store itself failed.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, Error>;

    async fn find_admin(&self, admin_id: &str) -> Result<Option<Admin>, Error>;

    /// Accepts either the human-readable identifier or a raw internal
    /// reference, as the direct REST endpoints do.
    async fn find_appointment(&self, reference: &str) -> Result<Option<Appointment>, Error>;

    /// Human-readable identifier only; used by the chat surfaces.
    async fn find_appointment_by_public_id(
        &self,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, Error>;
}

#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(AppointmentWithParties),
    /// The appointment was already cancelled; nothing was written.
    AlreadyCancelled(AppointmentWithParties),
}

#[async_trait]
pub trait SchedulingService: Send + Sync {
    /// Books a 30-minute slot for the given parties. Fails with
    /// `Error::Conflict` when an `Upcoming` appointment for the admin
    /// overlaps the requested window.
    async fn book(
        &self,
        client: &Client,
        admin: &Admin,
        date: NaiveDate,
        time: NaiveTime,
        purpose: &str,
        payment_id: Option<&str>,
    ) -> Result<AppointmentWithParties, Error>;

    /// Moves an appointment to a new window and marks it `Rescheduled`.
    /// The appointment's own current window never conflicts with itself.
    async fn reschedule(
        &self,
        appointment: &Appointment,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<AppointmentWithParties, Error>;

    /// Cancelling an already-cancelled appointment is a no-op warning,
    /// not an error.
    async fn cancel(
        &self,
        appointment: &Appointment,
        reason: Option<&str>,
    ) -> Result<CancelOutcome, Error>;

    async fn appointments_for_client(
        &self,
        client: &Client,
    ) -> Result<Vec<AppointmentWithParties>, Error>;

    async fn appointments_for_admin(
        &self,
        admin: &Admin,
    ) -> Result<Vec<AppointmentWithParties>, Error>;

    async fn upcoming_for_admin(&self, admin: &Admin) -> Result<Vec<Appointment>, Error>;
}

/// Raw signup input; hashing happens behind the identity service.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Signup, login and profile maintenance for both actor kinds.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn register_client(&self, registration: Registration)
    -> Result<(Client, String), Error>;

    async fn login_client(&self, email: &str, password: &str) -> Result<(Client, String), Error>;

    async fn register_admin(&self, registration: Registration) -> Result<(Admin, String), Error>;

    async fn login_admin(&self, email: &str, password: &str) -> Result<(Admin, String), Error>;

    async fn update_client_profile(
        &self,
        client: &Client,
        update: ClientUpdate,
    ) -> Result<Client, Error>;

    async fn update_admin_profile(
        &self,
        admin: &Admin,
        update: AdminUpdate,
    ) -> Result<Admin, Error>;

    async fn list_admins(&self) -> Result<Vec<Admin>, Error>;
}

/// Password hashing and token issuance live with an external credential
/// collaborator; this is the seam the app talks to it through.
pub trait CredentialService: Send + Sync {
    fn hash_password(&self, password: &str) -> String;

    fn verify_password(&self, password: &str, stored: &str) -> bool;

    fn issue_token(&self, subject: &str) -> String;
}

/// Client-facing conversational surface.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn respond(&self, client_id: &str, message: &str) -> Result<String, Error>;
}

/// Admin-facing conversational surface.
#[async_trait]
pub trait AdminChatService: Send + Sync {
    async fn respond(&self, admin_id: &str, message: &str) -> Result<String, Error>;
}

/// Keyed store for in-flight conversation state. Entries for different
/// actors never interact; expired entries behave as absent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<FlowState>;

    async fn set(&self, key: &str, state: FlowState);

    async fn delete(&self, key: &str);

    async fn sweep_expired(&self);
}
