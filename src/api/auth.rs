//! Signup and login endpoints

use crate::api::ApiError;
use crate::core::error::Error;
use crate::core::traits::{IdentityService, Registration};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn admin_router() -> Router {
    Router::new()
        .route("/register", post(register_admin))
        .route("/login", post(admin_login))
}

fn registration(body: schemas::SignupRequest) -> Result<Registration, Error> {
    match (body.name, body.email, body.phone, body.password) {
        (Some(name), Some(email), Some(phone), Some(password)) => Ok(Registration {
            name,
            email,
            phone,
            password,
        }),
        _ => Err(Error::validation("All fields are required")),
    }
}

fn credentials(body: schemas::LoginRequest) -> Result<(String, String), Error> {
    match (body.email, body.password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(Error::validation("Email and password are required")),
    }
}

async fn signup(
    Inject(identity): Inject<dyn IdentityService>,
    Json(body): Json<schemas::SignupRequest>,
) -> Result<(StatusCode, Json<schemas::ClientAuthResponse>), ApiError> {
    let (client, token) = identity.register_client(registration(body)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(schemas::ClientAuthResponse {
            user: client.into(),
            token,
            message: "Signup successful".to_owned(),
        }),
    ))
}

async fn login(
    Inject(identity): Inject<dyn IdentityService>,
    Json(body): Json<schemas::LoginRequest>,
) -> Result<Json<schemas::ClientAuthResponse>, ApiError> {
    let (email, password) = credentials(body)?;
    let (client, token) = identity.login_client(&email, &password).await?;

    Ok(Json(schemas::ClientAuthResponse {
        user: client.into(),
        token,
        message: "Login successful".to_owned(),
    }))
}

async fn register_admin(
    Inject(identity): Inject<dyn IdentityService>,
    Json(body): Json<schemas::SignupRequest>,
) -> Result<(StatusCode, Json<schemas::AdminAuthResponse>), ApiError> {
    let (admin, token) = identity.register_admin(registration(body)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(schemas::AdminAuthResponse {
            admin: admin.into(),
            token,
            message: "Signup successful".to_owned(),
        }),
    ))
}

async fn admin_login(
    Inject(identity): Inject<dyn IdentityService>,
    Json(body): Json<schemas::LoginRequest>,
) -> Result<Json<schemas::AdminAuthResponse>, ApiError> {
    let (email, password) = credentials(body)?;
    let (admin, token) = identity.login_admin(&email, &password).await?;

    Ok(Json(schemas::AdminAuthResponse {
        admin: admin.into(),
        token,
        message: "Login successful".to_owned(),
    }))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    pub struct SignupRequest {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct LoginRequest {
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct UserSummary {
        pub client_id: String,
        pub name: String,
        pub email: String,
        pub phone: String,
    }

    impl From<entities::Client> for UserSummary {
        fn from(client: entities::Client) -> Self {
            UserSummary {
                client_id: client.client_id,
                name: client.name,
                email: client.email,
                phone: client.phone,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct AdminSummary {
        pub admin_id: String,
        pub name: String,
        pub email: String,
        pub phone: String,
    }

    impl From<entities::Admin> for AdminSummary {
        fn from(admin: entities::Admin) -> Self {
            AdminSummary {
                admin_id: admin.admin_id,
                name: admin.name,
                email: admin.email,
                phone: admin.phone,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ClientAuthResponse {
        pub user: UserSummary,
        pub token: String,
        pub message: String,
    }

    #[derive(Serialize, Debug)]
    pub struct AdminAuthResponse {
        pub admin: AdminSummary,
        pub token: String,
        pub message: String,
    }
}
