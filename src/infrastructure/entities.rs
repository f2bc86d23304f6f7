//! Database entities

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub client_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Signup input; the public identifier is minted on first save.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub admin_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub specialty: String,
    pub description: String,
    pub fee: f64,
    pub experience: String,
    pub famous_for: String,
    pub working_days: String,
    pub working_hours: String,
    pub break_time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AdminUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
    pub fee: Option<f64>,
    pub experience: Option<String>,
    pub famous_for: Option<String>,
    pub working_days: Option<String>,
    pub working_hours: Option<String>,
    pub break_time: Option<String>,
}

/// Only `Upcoming` rows participate in overlap checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
    Rescheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub appointment_id: String,
    pub client: Uuid,
    pub admin: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub purpose: String,
    pub payment_id: String,
    pub payment_status: PaymentStatus,
    pub status: AppointmentStatus,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment joined with the party fields the API embeds in responses.
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentWithParties {
    #[sqlx(flatten)]
    pub appointment: Appointment,
    pub client_public_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub admin_public_id: String,
    pub admin_name: String,
    pub admin_specialty: String,
}
