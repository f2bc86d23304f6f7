//! Appointment booking web service
//!
//! (c) Softlandia 2025

use appointment_api::api;
use appointment_api::core::chat::{MyAdminChatService, MyChatService};
use appointment_api::core::directory::MyDirectoryService;
use appointment_api::core::identity::MyIdentityService;
use appointment_api::core::scheduling::MySchedulingService;
use appointment_api::core::session::InMemorySessionStore;
use appointment_api::core::traits::SessionStore;
use appointment_api::infrastructure::credentials::LocalCredentialService;
use appointment_api::infrastructure::database::DatabaseConnection;
use appointment_api::infrastructure::repositories::{
    DbAdminRepository, DbAppointmentRepository, DbClientRepository,
};

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::info;
use std::env;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tower_http::cors::{Any, CorsLayer};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task());

    Ok(())
}

async fn web_server_task() {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(InMemorySessionStore::singleton())
        .add(LocalCredentialService::singleton())
        .add(DbClientRepository::scoped())
        .add(DbAdminRepository::scoped())
        .add(DbAppointmentRepository::scoped())
        .add(MyDirectoryService::scoped())
        .add(MySchedulingService::scoped())
        .add(MyIdentityService::scoped())
        .add(MyChatService::scoped())
        .add(MyAdminChatService::scoped())
        .build_provider()
        .unwrap();

    // background eviction of idle chat sessions
    let sessions = provider.get_required::<dyn SessionStore>();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.sweep_expired().await;
        }
    });

    let admin_routes = Router::new()
        .merge(api::auth::admin_router())
        .nest("/profile", api::profile::admin_router())
        .nest("/public", api::profile::public_router())
        .nest("/chat", api::chat::admin_router());

    // build our application with a route
    let app = Router::new()
        .route("/", get(index))
        .nest("/api/auth", api::auth::router())
        .nest("/api/profile", api::profile::router())
        .nest("/api/appointments", api::appointments::router())
        .nest("/api/chat", api::chat::router())
        .nest("/api/admin", admin_routes)
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_origin([
                    "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                    "http://localhost:5173".parse::<HeaderValue>().unwrap(),
                ]),
        )
        .with_provider(provider);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_owned());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
    info!("Shutting down...");
}

async fn index() -> &'static str {
    "API is running"
}
