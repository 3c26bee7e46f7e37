use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use kedai_core::{NewRegistration, RegistrationError, RegistrationRow, RegistrationService};
use kedai_rules::description::StructuredDescription;
use kedai_rules::{
    format_whatsapp_display, is_pdf_reference, normalize_whatsapp, resolve_asset_url,
    resolve_certificate_url, split_structured_description, to_local_whatsapp, wa_link,
};

/// Application state shared across REST API handlers
///
/// Currently holds a RegistrationService instance for data operations.
#[derive(Clone)]
struct AppState {
    registration_service: RegistrationService,
}

/// Health check response
#[derive(serde::Serialize, utoipa::ToSchema)]
struct HealthRes {
    ok: bool,
    message: String,
}

/// Registration creation request, raw values exactly as submitted
#[derive(serde::Deserialize, utoipa::ToSchema)]
struct CreateRegistrationReq {
    participant_name: String,
    contact_whatsapp: String,
    class_name: String,
    #[serde(default)]
    description: String,
    payment_proof: Option<String>,
    certificate: Option<String>,
}

/// Raw phone number to normalise
#[derive(serde::Deserialize, utoipa::ToSchema)]
struct WhatsappReq {
    raw: String,
}

/// Every derived form of a phone number
#[derive(serde::Serialize, utoipa::ToSchema)]
struct WhatsappRes {
    canonical: String,
    display: String,
    local: String,
    wa_link: Option<String>,
}

/// Stored asset reference to resolve
#[derive(serde::Deserialize, utoipa::ToSchema)]
struct AssetReq {
    reference: String,
    /// Resolve into the certificates folder instead of payment proofs
    #[serde(default)]
    certificate: bool,
}

/// Resolved asset reference
#[derive(serde::Serialize, utoipa::ToSchema)]
struct AssetRes {
    url: String,
    is_pdf: bool,
}

/// Description text to parse
#[derive(serde::Deserialize, utoipa::ToSchema)]
struct DescriptionReq {
    text: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_registrations,
        get_registration,
        create_registration,
        normalize_whatsapp_tool,
        resolve_asset_tool,
        parse_description_tool
    ),
    components(schemas(
        HealthRes,
        CreateRegistrationReq,
        RegistrationRow,
        StructuredDescription,
        WhatsappReq,
        WhatsappRes,
        AssetReq,
        AssetRes,
        DescriptionReq
    ))
)]
struct ApiDoc;

/// Main entry point for the Kedai CMS REST server
///
/// # Environment Variables
/// - `KEDAI_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `KEDAI_DATA_DIR`: Directory for CMS data storage (default: "cms_data")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("kedai=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("KEDAI_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting Kedai REST on {}", rest_addr);

    let registration_service = RegistrationService::new();

    let app = Router::new()
        .route("/health", get(health))
        .route("/registrations", get(list_registrations))
        .route("/registrations", post(create_registration))
        .route("/registrations/:id", get(get_registration))
        .route("/tools/whatsapp", post(normalize_whatsapp_tool))
        .route("/tools/asset", post(resolve_asset_tool))
        .route("/tools/description", post(parse_description_tool))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            registration_service,
        });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Kedai CMS is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/registrations",
    responses(
        (status = 200, description = "Registration rows, newest first", body = [RegistrationRow])
    )
)]
/// List all registrations as admin-table rows
///
/// Every display form (formatted WhatsApp number, wa.me link, resolved
/// proof/certificate URLs, parsed materials list) is pre-computed server-side.
async fn list_registrations(State(state): State<AppState>) -> Json<Vec<RegistrationRow>> {
    Json(state.registration_service.list_rows())
}

#[utoipa::path(
    get,
    path = "/registrations/{id}",
    params(("id" = String, Path, description = "Canonical registration id")),
    responses(
        (status = 200, description = "Registration row", body = RegistrationRow),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not found")
    )
)]
/// Fetch a single registration as an admin-table row
async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RegistrationRow>, (StatusCode, &'static str)> {
    match state.registration_service.get(&id) {
        Ok(registration) => Ok(Json(RegistrationService::row(&registration))),
        Err(RegistrationError::Id(_)) => Err((StatusCode::BAD_REQUEST, "Malformed id")),
        Err(RegistrationError::NotFound(_)) => Err((StatusCode::NOT_FOUND, "Not found")),
        Err(e) => {
            tracing::error!("Get registration error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/registrations",
    request_body = CreateRegistrationReq,
    responses(
        (status = 201, description = "Registration created", body = RegistrationRow),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a new registration
///
/// The contact number is normalised to canonical `62…` form and any supplied
/// proof/certificate reference is classified once before the record is stored.
async fn create_registration(
    State(state): State<AppState>,
    Json(req): Json<CreateRegistrationReq>,
) -> Result<(StatusCode, Json<RegistrationRow>), (StatusCode, &'static str)> {
    match state.registration_service.create(NewRegistration {
        participant_name: req.participant_name,
        contact_whatsapp: req.contact_whatsapp,
        class_name: req.class_name,
        description: req.description,
        payment_proof: req.payment_proof,
        certificate: req.certificate,
    }) {
        Ok(registration) => Ok((
            StatusCode::CREATED,
            Json(RegistrationService::row(&registration)),
        )),
        Err(RegistrationError::InvalidInput(_)) => {
            Err((StatusCode::BAD_REQUEST, "Invalid registration input"))
        }
        Err(e) => {
            tracing::error!("Create registration error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/tools/whatsapp",
    request_body = WhatsappReq,
    responses(
        (status = 200, description = "Derived phone number forms", body = WhatsappRes)
    )
)]
/// Derive every form of a raw phone number
async fn normalize_whatsapp_tool(Json(req): Json<WhatsappReq>) -> Json<WhatsappRes> {
    Json(WhatsappRes {
        canonical: normalize_whatsapp(&req.raw),
        display: format_whatsapp_display(&req.raw),
        local: to_local_whatsapp(&req.raw),
        wa_link: wa_link(&req.raw),
    })
}

#[utoipa::path(
    post,
    path = "/tools/asset",
    request_body = AssetReq,
    responses(
        (status = 200, description = "Resolved asset reference", body = AssetRes)
    )
)]
/// Resolve a stored asset reference to a fetchable URL
async fn resolve_asset_tool(Json(req): Json<AssetReq>) -> Json<AssetRes> {
    let url = if req.certificate {
        resolve_certificate_url(&req.reference)
    } else {
        resolve_asset_url(&req.reference)
    };
    let is_pdf = is_pdf_reference(&req.reference, &url);
    Json(AssetRes { url, is_pdf })
}

#[utoipa::path(
    post,
    path = "/tools/description",
    request_body = DescriptionReq,
    responses(
        (status = 200, description = "Parsed description", body = StructuredDescription)
    )
)]
/// Parse a class description into intro, heading and materials
async fn parse_description_tool(Json(req): Json<DescriptionReq>) -> Json<StructuredDescription> {
    Json(split_structured_description(&req.text))
}
