use axum::{
    Json,
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as JsonResponse, Response},
    routing::get,
};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Application layer: services, DTOs, error type
use application::{ApplicationError, ErrorResponse, HealthService, StudentPayload, StudentService};
// Infrastructure layer implementation
use infrastructure::InMemoryStudentRepository;

/// Application state shared by all handlers. Holds the services plus nothing
/// else; the deployment stage lives inside HealthService, injected at startup.
#[derive(Clone)]
struct AppState {
    students: Arc<StudentService>,
    health: Arc<HealthService>,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STAGE: &str = "default";

// Application entry point
#[tokio::main]
async fn main() {
    // --- Logger Initialization ---
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
    info!("Logger initialized successfully.");

    // --- Configuration ---
    let port = match env::var("PORT") {
        Ok(port_str) => match u16::from_str(&port_str) {
            Ok(port_num) => {
                info!("Using port {} from environment variable PORT.", port_num);
                port_num
            }
            Err(_) => {
                warn!(
                    "Invalid PORT value '{}' in environment variable. Using default port {}.",
                    port_str, DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        },
        Err(_) => {
            info!(
                "PORT environment variable not set. Using default port {}.",
                DEFAULT_PORT
            );
            DEFAULT_PORT
        }
    };
    let stage = env::var("STAGE").unwrap_or_else(|_| {
        info!(
            "STAGE environment variable not set. Using default stage '{}'.",
            DEFAULT_STAGE
        );
        DEFAULT_STAGE.to_string()
    });

    // --- Dependency Injection ---
    // 1. Create infrastructure components
    let student_repository = Arc::new(InMemoryStudentRepository::new());
    info!("In-memory student repository initialized.");

    // 2. Create application services, injecting dependencies
    let student_service = Arc::new(StudentService::new(student_repository));
    let health_service = Arc::new(HealthService::new(stage));
    info!("Application services initialized.");

    // 3. Create the application state and router
    let app_state = AppState {
        students: student_service,
        health: health_service,
    };
    let app = app(app_state);
    info!("API routes configured.");

    // --- Server Startup ---
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server starting on {}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Builds the router. Kept separate from main so tests can drive it directly.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/students/health", get(health_handler))
        .route(
            "/students",
            axum::routing::post(create_student_handler).get(list_students_handler),
        )
        .route(
            "/students/:id",
            get(get_student_handler)
                .put(update_student_handler)
                .delete(delete_student_handler),
        )
        .with_state(state)
}

// --- API Handlers ---

/// Handler for the health endpoint (GET /students/health).
async fn health_handler(State(state): State<AppState>) -> Response {
    (StatusCode::OK, JsonResponse(state.health.health())).into_response()
}

/// Handler for creating a student (POST /students).
async fn create_student_handler(
    State(state): State<AppState>,
    Json(payload): Json<StudentPayload>,
) -> Response {
    info!("Received request to create student");
    match state.students.create(payload).await {
        Ok(student) => (StatusCode::CREATED, JsonResponse(student)).into_response(),
        Err(e) => {
            warn!("Failed to create student via handler: {}", e);
            map_application_error_to_response(e)
        }
    }
}

/// Handler for listing all students (GET /students).
async fn list_students_handler(State(state): State<AppState>) -> Response {
    info!("Received request to list students");
    match state.students.list().await {
        Ok(students) => (StatusCode::OK, JsonResponse(students)).into_response(),
        Err(e) => {
            error!("Failed to list students via handler: {}", e);
            map_application_error_to_response(e)
        }
    }
}

/// Handler for fetching a student by id (GET /students/:id).
async fn get_student_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!(student_id = %id, "Received request to get student");
    match state.students.get(&id).await {
        Ok(student) => (StatusCode::OK, JsonResponse(student)).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// Handler for updating a student (PUT /students/:id).
async fn update_student_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StudentPayload>,
) -> Response {
    info!(student_id = %id, "Received request to update student");
    match state.students.update(&id, payload).await {
        Ok(student) => (StatusCode::OK, JsonResponse(student)).into_response(),
        Err(e) => {
            warn!(student_id = %id, "Failed to update student via handler: {}", e);
            map_application_error_to_response(e)
        }
    }
}

/// Handler for deleting a student (DELETE /students/:id). Idempotent:
/// an absent id still yields 204.
async fn delete_student_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!(student_id = %id, "Received request to delete student");
    match state.students.delete(&id).await {
        Ok(()) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => {
            error!(student_id = %id, "Failed to delete student via handler: {}", e);
            map_application_error_to_response(e)
        }
    }
}

/// Helper function to map ApplicationError variants to HTTP status codes and
/// a JSON error body.
fn map_application_error_to_response(err: ApplicationError) -> Response {
    let (status, message) = match err {
        ApplicationError::Validation(domain_err) => {
            warn!("Validation failed: {}", domain_err);
            (StatusCode::BAD_REQUEST, domain_err.to_string())
        }
        ApplicationError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            format!("Student '{}' not found", id),
        ),
        ApplicationError::StoreUnavailable(msg) => {
            error!("Underlying store error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_string(),
            )
        }
    };
    (status, JsonResponse(ErrorResponse { error: message })).into_response()
}
