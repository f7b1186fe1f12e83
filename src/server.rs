//! HTTP API over the locale pipeline and the location model.

use crate::config::Config;
use crate::db::{Database, LocaleEntry};
use crate::error::{LocaleError, ModelError};
use crate::i18n::{Application, CacheDirectory, Language, LocaleMetrics, LocaleResolver, LocaleType};
use crate::location::{Geocoder, LocationInput, LocationModel};
use crate::security::{verify_api_key, API_KEY_HEADER};
use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub resolver: LocaleResolver,
    pub locations: LocationModel,
    pub geocoder: Geocoder,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(config: &Config, db: Database, client: reqwest::Client) -> Self {
        Self {
            resolver: LocaleResolver::new(
                db.clone(),
                CacheDirectory::new(&config.cache_path),
                config.site_default_language,
                config.debug,
            ),
            locations: LocationModel::new(db.clone(), config.backend_url.clone()),
            geocoder: Geocoder::new(client, config.geocode_api_url.clone(), config.geocode_api_key.clone()),
            api_key: config.api_key.clone(),
            db,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::new(&config.database_path)?;
        Ok(Self::new(config, db, reqwest::Client::new()))
    }
}

// ==================== Errors ====================

#[derive(Debug)]
pub enum AppError {
    Locale(LocaleError),
    Model(ModelError),
    Internal(anyhow::Error),
    BadRequest(String),
    NotFound,
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Locale(LocaleError::InvalidLanguage(code)) => {
                (StatusCode::BAD_REQUEST, format!("Invalid language ({}).", code))
            }
            AppError::Locale(LocaleError::UnknownLanguage(code)) => {
                (StatusCode::NOT_FOUND, format!("Unknown language code: '{}'", code))
            }
            AppError::Locale(LocaleError::MissingTranslation(placeholder)) => {
                (StatusCode::NOT_FOUND, format!("Missing translation {}", placeholder))
            }
            AppError::Model(ModelError::LocationNotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("Location with id {} doesn't exist", id))
            }
            AppError::Locale(LocaleError::Storage(e))
            | AppError::Model(ModelError::Storage(e))
            | AppError::Internal(e) => {
                error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred".to_string())
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required".to_string()),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

/// An unknown language in a request body is a client error, not a missing
/// resource.
fn invalid_body_language(err: LocaleError) -> AppError {
    match err {
        LocaleError::UnknownLanguage(code) => {
            AppError::BadRequest(format!("Unknown language code: '{}'", code))
        }
        other => other.into(),
    }
}

impl From<LocaleError> for AppError {
    fn from(err: LocaleError) -> Self {
        AppError::Locale(err)
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::Model(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

// ==================== Router ====================

pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if !verify_api_key(state.api_key.as_deref(), presented) {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/language", get(browser_language))
        .route("/api/locale/:application/:language", get(locale_json))
        .route("/api/translations/:language/:type/:key", get(translation))
        .route("/api/locations", get(list_locations))
        .route("/api/locations/:id", get(get_location))
        .route("/api/locations/:id/settings", get(get_location_settings))
        .route("/api/metrics", get(metrics));

    let protected_routes = Router::new()
        .route("/api/locale", post(save_locale))
        .route("/api/locale/rebuild", post(rebuild_locale))
        .route("/api/locations", post(create_location))
        .route("/api/locations/:id", put(update_location).delete(delete_location))
        .route("/api/locations/:id/settings/:name", put(set_location_setting))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

// ==================== Locale handlers ====================

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct LanguageQuery {
    #[serde(default = "default_true")]
    redirect: bool,
}

fn default_true() -> bool {
    true
}

async fn browser_language(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());

    let language = state.resolver.browser_language(accept_language, query.redirect)?;
    Ok(Json(json!({ "language": language })))
}

fn parse_application(raw: &str) -> Result<Application, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

async fn locale_json(
    State(state): State<AppState>,
    Path((application, language)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let application = parse_application(&application)?;
    let language = language.trim_end_matches(".json");
    let json = state.resolver.json_artifact(language, application)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], json).into_response())
}

#[derive(Debug, Deserialize)]
struct TranslationQuery {
    application: Option<String>,
    module: Option<String>,
    #[serde(default = "default_true")]
    fallback: bool,
}

async fn translation(
    State(state): State<AppState>,
    Path((language, locale_type, key)): Path<(String, String, String)>,
    Query(query): Query<TranslationQuery>,
) -> Result<Json<Value>, AppError> {
    let locale_type: LocaleType = locale_type.parse().map_err(AppError::BadRequest)?;
    let application = match query.application.as_deref() {
        Some(raw) => parse_application(raw)?,
        None => Application::Frontend,
    };

    let ctx = match application {
        Application::Frontend => state.resolver.set_locale(Some(&language), false)?,
        Application::Backend => state.resolver.backend_context(&language)?,
    };

    let translation = match query.module.as_deref() {
        Some(module) => ctx.lookup_in_module(locale_type, module, &key, query.fallback),
        None => ctx.lookup(locale_type, &key, query.fallback),
    };

    Ok(Json(json!({
        "language": ctx.language().code(),
        "application": application,
        "type": locale_type,
        "translation": translation,
    })))
}

#[derive(Debug, Deserialize)]
struct SaveLocaleRequest {
    language: String,
    application: Application,
    #[serde(rename = "type")]
    locale_type: String,
    module: String,
    name: String,
    value: String,
}

async fn save_locale(
    State(state): State<AppState>,
    Json(request): Json<SaveLocaleRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let language = Language::from_code(&request.language).map_err(invalid_body_language)?;
    let locale_type: LocaleType = request.locale_type.parse().map_err(AppError::BadRequest)?;
    if request.module.trim().is_empty() || request.name.trim().is_empty() {
        return Err(AppError::BadRequest("module and name are required".to_string()));
    }

    let id = state.db.save_locale(&LocaleEntry {
        language: language.code().to_string(),
        application: request.application,
        locale_type,
        module: request.module,
        name: request.name,
        value: request.value,
    })?;

    state.resolver.builder().build(language, request.application)?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn rebuild_locale(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut languages = vec![Language::canonical()];
    for code in state.resolver.active_languages()? {
        let language = Language::from_code(&code)?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }

    let built = state.resolver.builder().build_all(&languages)?;
    info!("Rebuilt {} locale caches", built);

    Ok(Json(json!({ "built": built })))
}

async fn metrics() -> Json<Value> {
    Json(json!(LocaleMetrics::global().report()))
}

// ==================== Location handlers ====================

#[derive(Debug, Deserialize)]
struct LocationsQuery {
    locale: Option<String>,
}

async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<Value>, AppError> {
    let body = match query.locale {
        Some(locale) => json!(state.locations.browse(&locale)?),
        None => json!(state.locations.get_all()?),
    };
    Ok(Json(body))
}

async fn get_location(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>, AppError> {
    let location = state.locations.get(id)?.ok_or(AppError::NotFound)?;
    Ok(Json(json!(location)))
}

async fn geocode_missing(state: &AppState, input: &mut LocationInput) {
    if input.has_coordinates() {
        return;
    }
    let coordinates = state
        .geocoder
        .get_coordinates(&input.street, &input.number, &input.city, &input.zip, &input.country)
        .await;
    input.set_coordinates(coordinates);
}

fn validate_input(input: &LocationInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    Ok(())
}

async fn create_location(
    State(state): State<AppState>,
    Json(mut input): Json<LocationInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate_input(&input)?;
    let ctx = state
        .resolver
        .backend_context(&input.locale)
        .map_err(invalid_body_language)?;

    geocode_missing(&state, &mut input).await;
    let id = state.locations.insert(&input, &ctx)?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut input): Json<LocationInput>,
) -> Result<Json<Value>, AppError> {
    validate_input(&input)?;

    // Locations keep the locale they were created in
    let current = state
        .locations
        .get(id)?
        .ok_or(ModelError::LocationNotFound(id))?;
    let ctx = state.resolver.backend_context(&current.locale)?;

    geocode_missing(&state, &mut input).await;
    match state.locations.update(id, &input, &ctx)? {
        0 => Err(ModelError::LocationNotFound(id).into()),
        id => Ok(Json(json!({ "id": id }))),
    }
}

async fn delete_location(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    state.locations.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_location_settings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(state.locations.get_map_settings(id)?)))
}

async fn set_location_setting(
    State(state): State<AppState>,
    Path((id, name)): Path<(i64, String)>,
    Json(value): Json<Value>,
) -> Result<StatusCode, AppError> {
    state.locations.set_map_setting(id, &name, &value)?;
    Ok(StatusCode::NO_CONTENT)
}
