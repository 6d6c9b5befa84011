//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Exeat
//! API: shared state, router assembly and the OpenAPI document.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::config::AppConfig;
use crate::handlers;
use crate::mail::{LogMailer, Mailer};
use crate::photos::{FsPhotoStore, PhotoStore};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub mailer: Arc<dyn Mailer>,
    pub photos: Arc<dyn PhotoStore>,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/api/v1/auth/login", post(handlers::identity::login))
        .route(
            "/api/v1/auth/password-reset/request",
            post(handlers::identity::password_reset_request),
        )
        .route(
            "/api/v1/auth/password-reset/confirm",
            post(handlers::identity::password_reset_confirm),
        );

    let protected = Router::new()
        .route(
            "/api/v1/schools",
            post(handlers::schools::create_school).get(handlers::schools::list_schools),
        )
        .route(
            "/api/v1/schools/{id}",
            get(handlers::schools::get_school).delete(handlers::schools::delete_school),
        )
        .route(
            "/api/v1/houses",
            post(handlers::houses::create_house).get(handlers::houses::list_houses),
        )
        .route(
            "/api/v1/students",
            post(handlers::students::create_student).get(handlers::students::list_students),
        )
        .route(
            "/api/v1/students/{id}",
            get(handlers::students::get_student),
        )
        .route(
            "/api/v1/students/{id}/photo",
            put(handlers::students::put_student_photo).get(handlers::students::get_student_photo),
        )
        .route(
            "/api/v1/staff/sub-admins",
            post(handlers::staff::create_sub_admin),
        )
        .route(
            "/api/v1/staff/house-supervisors",
            post(handlers::staff::create_house_supervisor),
        )
        .route(
            "/api/v1/staff/security",
            post(handlers::staff::create_security_person),
        )
        .route(
            "/api/v1/exeats",
            post(handlers::exeats::create_exeat).get(handlers::exeats::list_exeats),
        )
        .route("/api/v1/exeats/{id}", get(handlers::exeats::get_exeat))
        .route(
            "/api/v1/exeats/{id}/approve",
            post(handlers::exeats::approve_exeat),
        )
        .route(
            "/api/v1/exeats/{id}/reject",
            post(handlers::exeats::reject_exeat),
        )
        .route(
            "/api/v1/exeats/{id}/sign-out",
            post(handlers::exeats::sign_out_exeat),
        )
        .route(
            "/api/v1/exeats/{id}/sign-in",
            post(handlers::exeats::sign_in_exeat),
        )
        .route("/api/v1/dashboard", get(handlers::dashboard::get_dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(config);
    let state = AppState {
        config: Arc::clone(&config),
        db,
        mailer: Arc::new(LogMailer::new(config.mail_from.clone())),
        photos: Arc::new(FsPhotoStore::new(config.photo_dir.clone())),
    };
    let app = create_app(state);

    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %config.profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Operator token; pair with the X-Acting-User header".to_string(),
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::schools::create_school,
        crate::handlers::schools::list_schools,
        crate::handlers::schools::get_school,
        crate::handlers::schools::delete_school,
        crate::handlers::houses::create_house,
        crate::handlers::houses::list_houses,
        crate::handlers::students::create_student,
        crate::handlers::students::list_students,
        crate::handlers::students::get_student,
        crate::handlers::students::put_student_photo,
        crate::handlers::students::get_student_photo,
        crate::handlers::staff::create_sub_admin,
        crate::handlers::staff::create_house_supervisor,
        crate::handlers::staff::create_security_person,
        crate::handlers::exeats::create_exeat,
        crate::handlers::exeats::list_exeats,
        crate::handlers::exeats::get_exeat,
        crate::handlers::exeats::approve_exeat,
        crate::handlers::exeats::reject_exeat,
        crate::handlers::exeats::sign_out_exeat,
        crate::handlers::exeats::sign_in_exeat,
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::identity::login,
        crate::handlers::identity::password_reset_request,
        crate::handlers::identity::password_reset_confirm,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::exeat::ExeatStatus,
            crate::models::user::UserRole,
            crate::lifecycle::ExeatAction,
            crate::error::ApiError,
            crate::handlers::types::ResponseMeta,
            crate::handlers::schools::CreateSchoolRequestDto,
            crate::handlers::schools::SchoolInfo,
            crate::handlers::houses::CreateHouseRequestDto,
            crate::handlers::houses::HouseInfo,
            crate::handlers::students::CreateStudentRequestDto,
            crate::handlers::students::StudentInfo,
            crate::handlers::staff::CreateStaffRequestDto,
            crate::handlers::staff::StaffInfo,
            crate::handlers::exeats::CreateExeatRequestDto,
            crate::handlers::exeats::ExeatInfo,
            crate::handlers::dashboard::DashboardInfo,
            crate::handlers::identity::LoginRequestDto,
            crate::handlers::identity::IdentityInfo,
            crate::handlers::identity::PasswordResetRequestDto,
            crate::handlers::identity::PasswordResetConfirmDto,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Exeat API",
        description = "API for managing student leave passes",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
