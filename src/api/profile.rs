//! Profile endpoints and the public admin directory

use crate::api::{ApiError, ExtractAdmin, ExtractClient};
use crate::core::error::Error;
use crate::core::traits::{DirectoryService, IdentityService};
use crate::infrastructure::entities::{Admin, AdminUpdate, Client, ClientUpdate};
use axum::routing::get;
use axum::{Json, Router};
use di::Ref;
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/", get(get_profile).put(update_profile))
}

pub fn admin_router() -> Router {
    Router::new().route("/", get(get_admin_profile).put(update_admin_profile))
}

pub fn public_router() -> Router {
    Router::new().route("/all", get(list_admins))
}

async fn caller_client(
    directory: &Ref<dyn DirectoryService>,
    client_id: &str,
) -> Result<Client, Error> {
    directory
        .find_client(client_id)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))
}

async fn caller_admin(
    directory: &Ref<dyn DirectoryService>,
    admin_id: &str,
) -> Result<Admin, Error> {
    directory
        .find_admin(admin_id)
        .await?
        .ok_or_else(|| Error::not_found("Admin not found"))
}

async fn get_profile(
    Inject(directory): Inject<dyn DirectoryService>,
    ExtractClient(client_id): ExtractClient,
) -> Result<Json<schemas::ClientEnvelope>, ApiError> {
    let client = caller_client(&directory, &client_id).await?;

    Ok(Json(schemas::ClientEnvelope {
        message: None,
        user: client.into(),
    }))
}

async fn update_profile(
    Inject(directory): Inject<dyn DirectoryService>,
    Inject(identity): Inject<dyn IdentityService>,
    ExtractClient(client_id): ExtractClient,
    Json(body): Json<schemas::ClientProfileUpdate>,
) -> Result<Json<schemas::ClientEnvelope>, ApiError> {
    let client = caller_client(&directory, &client_id).await?;

    let updated = identity
        .update_client_profile(
            &client,
            ClientUpdate {
                name: body.name,
                email: body.email,
                phone: body.phone,
            },
        )
        .await?;

    Ok(Json(schemas::ClientEnvelope {
        message: Some("Profile updated".to_owned()),
        user: updated.into(),
    }))
}

async fn get_admin_profile(
    Inject(directory): Inject<dyn DirectoryService>,
    ExtractAdmin(admin_id): ExtractAdmin,
) -> Result<Json<schemas::AdminEnvelope>, ApiError> {
    let admin = caller_admin(&directory, &admin_id).await?;

    Ok(Json(schemas::AdminEnvelope {
        message: None,
        admin: admin.into(),
    }))
}

async fn update_admin_profile(
    Inject(directory): Inject<dyn DirectoryService>,
    Inject(identity): Inject<dyn IdentityService>,
    ExtractAdmin(admin_id): ExtractAdmin,
    Json(body): Json<schemas::AdminProfileUpdate>,
) -> Result<Json<schemas::AdminEnvelope>, ApiError> {
    let admin = caller_admin(&directory, &admin_id).await?;

    let availability = body.availability.unwrap_or_default();
    let updated = identity
        .update_admin_profile(
            &admin,
            AdminUpdate {
                name: body.name,
                email: body.email,
                phone: body.phone,
                specialty: body.specialty,
                description: body.description,
                fee: body.fee,
                experience: body.experience,
                famous_for: body.famous_for,
                working_days: availability.working_days,
                working_hours: availability.working_hours,
                break_time: availability.break_time,
            },
        )
        .await?;

    Ok(Json(schemas::AdminEnvelope {
        message: Some("Profile updated successfully".to_owned()),
        admin: updated.into(),
    }))
}

async fn list_admins(
    Inject(identity): Inject<dyn IdentityService>,
) -> Result<Json<schemas::AdminList>, ApiError> {
    let admins = identity.list_admins().await?;

    Ok(Json(schemas::AdminList {
        admins: admins.into_iter().map(Into::into).collect(),
    }))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    pub struct ClientProfileUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct AvailabilityUpdate {
        pub working_days: Option<String>,
        pub working_hours: Option<String>,
        pub break_time: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct AdminProfileUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub specialty: Option<String>,
        pub description: Option<String>,
        pub fee: Option<f64>,
        pub experience: Option<String>,
        pub famous_for: Option<String>,
        pub availability: Option<AvailabilityUpdate>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ClientView {
        pub client_id: String,
        pub name: String,
        pub email: String,
        pub phone: String,
        pub role: String,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Client> for ClientView {
        fn from(client: entities::Client) -> Self {
            ClientView {
                client_id: client.client_id,
                name: client.name,
                email: client.email,
                phone: client.phone,
                role: client.role,
                created_at: client.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Availability {
        pub working_days: String,
        pub working_hours: String,
        pub break_time: String,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct AdminView {
        pub admin_id: String,
        pub name: String,
        pub email: String,
        pub phone: String,
        pub role: String,
        pub specialty: String,
        pub description: String,
        pub fee: f64,
        pub experience: String,
        pub famous_for: String,
        pub availability: Availability,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Admin> for AdminView {
        fn from(admin: entities::Admin) -> Self {
            AdminView {
                admin_id: admin.admin_id,
                name: admin.name,
                email: admin.email,
                phone: admin.phone,
                role: admin.role,
                specialty: admin.specialty,
                description: admin.description,
                fee: admin.fee,
                experience: admin.experience,
                famous_for: admin.famous_for,
                availability: Availability {
                    working_days: admin.working_days,
                    working_hours: admin.working_hours,
                    break_time: admin.break_time,
                },
                created_at: admin.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ClientEnvelope {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
        pub user: ClientView,
    }

    #[derive(Serialize, Debug)]
    pub struct AdminEnvelope {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
        pub admin: AdminView,
    }

    #[derive(Serialize, Debug)]
    pub struct AdminList {
        pub admins: Vec<AdminView>,
    }
}
