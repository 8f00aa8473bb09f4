use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use platform_db::DbPool;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{
    config::AppConfig,
    dto::{EmployeeDto, FieldViolation, PageQuery, PageResponse},
    service::{EmployeeService, ServiceError},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub service: EmployeeService,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "employee service listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/employees",
            post(add_employee_handler).get(list_employees_handler),
        )
        .route("/api/employees/paged", get(list_employees_paged_handler))
        .route(
            "/api/employees/{id}",
            get(get_employee_handler)
                .put(update_employee_handler)
                .delete(delete_employee_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn add_employee_handler(
    State(state): State<AppState>,
    Json(dto): Json<EmployeeDto>,
) -> HttpResult<(StatusCode, Json<EmployeeDto>)> {
    info!(email = %dto.email, "received request to add a new employee");
    check_valid(&dto)?;
    if state.service.exists_by_email(&dto.email).await? {
        warn!(email = %dto.email, "email already exists");
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            &format!("Email already exists: {}", dto.email),
        ));
    }
    let saved = state.service.add_employee(dto).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn list_employees_handler(
    State(state): State<AppState>,
) -> HttpResult<Json<Vec<EmployeeDto>>> {
    let employees = state.service.get_all_employees().await?;
    info!(count = employees.len(), "fetched employees");
    Ok(Json(employees))
}

async fn list_employees_paged_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> HttpResult<Json<PageResponse<EmployeeDto>>> {
    let request = query.into_page_request().map_err(HttpError::validation)?;
    let page = state.service.get_employees_paged(request).await?;
    info!(
        page = page.page,
        count = page.content.len(),
        "fetched employee page"
    );
    Ok(Json(page))
}

async fn get_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HttpResult<Json<EmployeeDto>> {
    if !state.service.exists_by_id(id).await? {
        warn!(id, "employee not found");
        return Err(HttpError::not_found(id));
    }
    let employee = state.service.get_employee_by_id(id).await?;
    Ok(Json(employee))
}

async fn update_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<EmployeeDto>,
) -> HttpResult<Json<EmployeeDto>> {
    info!(id, "received request to update employee");
    check_valid(&dto)?;
    if !state.service.exists_by_id(id).await? {
        warn!(id, "employee not found");
        return Err(HttpError::not_found(id));
    }
    let updated = state.service.update_employee(id, dto).await?;
    Ok(Json(updated))
}

async fn delete_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HttpResult<String> {
    if !state.service.exists_by_id(id).await? {
        warn!(id, "employee not found");
        return Err(HttpError::not_found(id));
    }
    state.service.delete_employee(id).await?;
    Ok(format!("Employee deleted successfully with ID: {id}"))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = state.pool.ping().await.is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

fn check_valid(dto: &EmployeeDto) -> Result<(), HttpError> {
    dto.validate().map_err(HttpError::validation)
}

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
        }
    }

    fn not_found(id: i64) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            &format!("No employee found with ID: {id}"),
        )
    }

    fn validation(violations: Vec<FieldViolation>) -> Self {
        let message = violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => Self::not_found(id),
            ServiceError::DuplicateEmail(email) => Self::new(
                StatusCode::BAD_REQUEST,
                &format!("Email already exists: {email}"),
            ),
            ServiceError::Db(err) => {
                error!(error = %err, "database failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("An unexpected error occurred: {err}"),
                )
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
