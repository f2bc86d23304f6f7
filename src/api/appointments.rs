//! Appointment endpoints

use crate::api::ApiError;
use crate::api::appointments::schemas::{AppointmentEnvelope, AppointmentList};
use crate::core::error::Error;
use crate::core::traits::{CancelOutcome, DirectoryService, SchedulingService};
use crate::core::validate::{parse_date, parse_time};
use crate::infrastructure::entities::{Admin, Appointment, Client};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveTime};
use di::Ref;
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/book", post(book))
        .route("/byClient", get(by_client))
        .route("/byAdmin", get(by_admin))
        .route("/cancel", post(cancel))
        .route("/reschedule", post(reschedule))
}

fn require(field: Option<String>, message: &'static str) -> Result<String, Error> {
    field.ok_or_else(|| Error::validation(message))
}

fn parse_slot(date: &str, time: &str) -> Result<(NaiveDate, NaiveTime), Error> {
    let date = parse_date(date).ok_or_else(|| Error::validation("Invalid date format"))?;
    let time = parse_time(time).ok_or_else(|| Error::validation("Invalid time format"))?;
    Ok((date, time))
}

async fn resolve_client(
    directory: &Ref<dyn DirectoryService>,
    client_id: &str,
) -> Result<Client, Error> {
    directory
        .find_client(client_id)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))
}

async fn resolve_admin(
    directory: &Ref<dyn DirectoryService>,
    admin_id: &str,
) -> Result<Admin, Error> {
    directory
        .find_admin(admin_id)
        .await?
        .ok_or_else(|| Error::not_found("Admin not found"))
}

async fn resolve_appointment(
    directory: &Ref<dyn DirectoryService>,
    reference: &str,
) -> Result<Appointment, Error> {
    directory
        .find_appointment(reference)
        .await?
        .ok_or_else(|| Error::not_found("Appointment not found"))
}

async fn book(
    Inject(directory): Inject<dyn DirectoryService>,
    Inject(scheduling): Inject<dyn SchedulingService>,
    Json(body): Json<schemas::BookRequest>,
) -> Result<(StatusCode, Json<AppointmentEnvelope>), ApiError> {
    let missing = "Missing required fields";
    let client_id = require(body.client_id, missing)?;
    let admin_id = require(body.admin_id, missing)?;
    let date = require(body.date, missing)?;
    let time = require(body.time, missing)?;
    let purpose = require(body.purpose, missing)?;

    let (date, time) = parse_slot(&date, &time)?;
    let client = resolve_client(&directory, &client_id).await?;
    let admin = resolve_admin(&directory, &admin_id).await?;

    let appointment = scheduling
        .book(&client, &admin, date, time, &purpose, body.payment_id.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AppointmentEnvelope {
            message: "Appointment booked successfully".to_owned(),
            appointment: appointment.into(),
        }),
    ))
}

async fn by_client(
    Inject(directory): Inject<dyn DirectoryService>,
    Inject(scheduling): Inject<dyn SchedulingService>,
    Query(query): Query<schemas::ByClientQuery>,
) -> Result<Json<AppointmentList>, ApiError> {
    let client_id = require(query.client_id, "Client ID required")?;
    let client = resolve_client(&directory, &client_id).await?;

    let appointments = scheduling.appointments_for_client(&client).await?;

    Ok(Json(AppointmentList {
        appointments: appointments.into_iter().map(Into::into).collect(),
    }))
}

async fn by_admin(
    Inject(directory): Inject<dyn DirectoryService>,
    Inject(scheduling): Inject<dyn SchedulingService>,
    Query(query): Query<schemas::ByAdminQuery>,
) -> Result<Json<AppointmentList>, ApiError> {
    let admin_id = require(query.admin_id, "Admin ID required")?;
    let admin = resolve_admin(&directory, &admin_id).await?;

    let appointments = scheduling.appointments_for_admin(&admin).await?;

    Ok(Json(AppointmentList {
        appointments: appointments.into_iter().map(Into::into).collect(),
    }))
}

async fn cancel(
    Inject(directory): Inject<dyn DirectoryService>,
    Inject(scheduling): Inject<dyn SchedulingService>,
    Json(body): Json<schemas::CancelRequest>,
) -> Result<Json<AppointmentEnvelope>, ApiError> {
    let reference = require(body.appointment_id, "Appointment ID required")?;
    let appointment = resolve_appointment(&directory, &reference).await?;

    let reason = body.reason.as_deref().unwrap_or("Cancelled by admin");
    let outcome = scheduling.cancel(&appointment, Some(reason)).await?;

    let (message, appointment) = match outcome {
        CancelOutcome::Cancelled(cancelled) => ("Appointment cancelled successfully", cancelled),
        CancelOutcome::AlreadyCancelled(unchanged) => {
            ("Appointment already cancelled", unchanged)
        }
    };

    Ok(Json(AppointmentEnvelope {
        message: message.to_owned(),
        appointment: appointment.into(),
    }))
}

async fn reschedule(
    Inject(directory): Inject<dyn DirectoryService>,
    Inject(scheduling): Inject<dyn SchedulingService>,
    Json(body): Json<schemas::RescheduleRequest>,
) -> Result<Json<AppointmentEnvelope>, ApiError> {
    let missing = "Appointment ID, date, and time required";
    let reference = require(body.appointment_id, missing)?;
    let date = require(body.date, missing)?;
    let time = require(body.time, missing)?;

    let (date, time) = parse_slot(&date, &time)?;
    let appointment = resolve_appointment(&directory, &reference).await?;

    let updated = scheduling.reschedule(&appointment, date, time).await?;

    Ok(Json(AppointmentEnvelope {
        message: "Appointment rescheduled successfully".to_owned(),
        appointment: updated.into(),
    }))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct BookRequest {
        pub client_id: Option<String>,
        pub admin_id: Option<String>,
        pub date: Option<String>,
        pub time: Option<String>,
        pub purpose: Option<String>,
        pub payment_id: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ByClientQuery {
        pub client_id: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ByAdminQuery {
        pub admin_id: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CancelRequest {
        pub appointment_id: Option<String>,
        pub reason: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RescheduleRequest {
        pub appointment_id: Option<String>,
        pub date: Option<String>,
        pub time: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub enum AppointmentStatus {
        Upcoming,
        Completed,
        Cancelled,
        Rescheduled,
    }

    impl From<entities::AppointmentStatus> for AppointmentStatus {
        fn from(status: entities::AppointmentStatus) -> Self {
            match status {
                entities::AppointmentStatus::Upcoming => AppointmentStatus::Upcoming,
                entities::AppointmentStatus::Completed => AppointmentStatus::Completed,
                entities::AppointmentStatus::Cancelled => AppointmentStatus::Cancelled,
                entities::AppointmentStatus::Rescheduled => AppointmentStatus::Rescheduled,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub enum PaymentStatus {
        Pending,
        Paid,
        Failed,
    }

    impl From<entities::PaymentStatus> for PaymentStatus {
        fn from(status: entities::PaymentStatus) -> Self {
            match status {
                entities::PaymentStatus::Pending => PaymentStatus::Pending,
                entities::PaymentStatus::Paid => PaymentStatus::Paid,
                entities::PaymentStatus::Failed => PaymentStatus::Failed,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct UserSummary {
        pub client_id: String,
        pub name: String,
        pub email: String,
        pub phone: String,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct AdminSummary {
        pub admin_id: String,
        pub name: String,
        pub specialty: String,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Appointment {
        pub id: Uuid,
        pub appointment_id: String,
        pub user: UserSummary,
        pub admin: AdminSummary,
        pub start_time: NaiveDateTime,
        pub end_time: NaiveDateTime,
        pub purpose: String,
        pub payment_id: String,
        pub payment_status: PaymentStatus,
        pub status: AppointmentStatus,
        pub cancel_reason: Option<String>,
    }

    impl From<entities::AppointmentWithParties> for Appointment {
        fn from(record: entities::AppointmentWithParties) -> Self {
            let appointment = record.appointment;
            Appointment {
                id: appointment.id,
                appointment_id: appointment.appointment_id,
                user: UserSummary {
                    client_id: record.client_public_id,
                    name: record.client_name,
                    email: record.client_email,
                    phone: record.client_phone,
                },
                admin: AdminSummary {
                    admin_id: record.admin_public_id,
                    name: record.admin_name,
                    specialty: record.admin_specialty,
                },
                start_time: appointment.start_time,
                end_time: appointment.end_time,
                purpose: appointment.purpose,
                payment_id: appointment.payment_id,
                payment_status: appointment.payment_status.into(),
                status: appointment.status.into(),
                cancel_reason: appointment.cancel_reason,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct AppointmentEnvelope {
        pub message: String,
        pub appointment: Appointment,
    }

    #[derive(Serialize, Debug)]
    pub struct AppointmentList {
        pub appointments: Vec<Appointment>,
    }
}
