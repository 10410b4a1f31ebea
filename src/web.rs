use actix_files::Files;
use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::time::Duration;
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::backend::{Backend, HttpBackend};
use crate::config::Config;
use crate::desk::{new_desk_id, DeskRegistry, SESSION_TTL};
use crate::error::DeskError;
use crate::form::{AppointmentStore, AppointmentTable};
use crate::preview::{decode_image, PreviewOutcome, PreviewToken};
use crate::suggest::Gazetteer;

const DESK_KEY: &str = "desk_id";
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const MAX_FORM_BYTES: usize = 1024 * 1024;

pub struct AppState {
    pub desks: DeskRegistry,
    pub backend: Box<dyn Backend>,
    pub gazetteer: Gazetteer,
    pub store: AppointmentStore,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    is_conseq: bool,
}

#[derive(Deserialize)]
pub struct InputEdit {
    name: String,
    value: String,
}

#[derive(Deserialize)]
pub struct SuggestionRequest {
    location_name: Option<String>,
}

/// Desk id for this session, assigning a new one on first contact
fn desk_id(session: &Session) -> Result<String> {
    if let Some(id) = session.get::<String>(DESK_KEY)? {
        return Ok(id);
    }
    let id = new_desk_id();
    session.insert(DESK_KEY, &id)?;
    Ok(id)
}

// Image upload endpoint (drop, file picker and paste all end up here)
async fn upload_image(
    query: web::Query<UploadQuery>,
    body: web::Bytes,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = desk_id(&session)?;
    let append_mode = query.is_conseq;

    let token = state.desks.with_desk(&id, |desk| {
        desk.panels.begin_processing(&mut desk.spinners);
        desk.preview.begin()
    });

    if let Err(e) = process_upload(&state, &id, token, body, append_mode).await {
        warn!("upload for desk {} failed: {}", id, e);
        let reported = state
            .desks
            .with_desk(&id, |desk| desk.show_failure(token, append_mode, &e.to_string()));
        if !reported {
            debug!("desk {}: failure of superseded upload {:?} not shown", id, token);
        }
        return Err(e.into());
    }

    let view = state.desks.with_desk(&id, |desk| desk.view());
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "desk": view})))
}

async fn process_upload(
    state: &AppState,
    id: &str,
    token: PreviewToken,
    body: web::Bytes,
    append_mode: bool,
) -> Result<(), DeskError> {
    // Decoding is CPU bound, keep it off the worker
    let bytes = body.clone();
    let decoded = web::block(move || decode_image(&bytes)).await??;
    let mime = decoded.mime;
    debug!("desk {}: decoded {}x{} {}", id, decoded.width, decoded.height, mime);

    if state.desks.with_desk(id, |desk| desk.preview.complete(token, decoded)) == PreviewOutcome::Stale {
        debug!("desk {}: preview {:?} superseded by a newer upload", id, token);
    }

    let text = state.backend.ocr_and_latinize(body.to_vec(), mime).await?;

    let shown = state
        .desks
        .with_desk(id, |desk| desk.show_text(token, append_mode, &text.ocr, &text.latinized));
    if !shown {
        debug!("desk {}: dropping OCR result of superseded upload {:?}", id, token);
    }
    Ok(())
}

// Extract appointments from the latinized text and fill the table
async fn extract_data(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = desk_id(&session)?;
    let text = state.desks.with_desk(&id, |desk| desk.panels.latinized_text());
    if text.trim().is_empty() {
        return Err(DeskError::NothingToExtract.into());
    }

    let appointments = state.backend.extract_appointments(&text).await.map_err(|e| {
        warn!("extraction for desk {} failed: {}", id, e);
        DeskError::from(e)
    })?;

    let suggestion_sets: Vec<_> = appointments
        .iter()
        .map(|a| state.gazetteer.suggest_for(a))
        .collect();

    let (table_body, rendered) = state
        .desks
        .with_desk(&id, |desk| -> Result<_, DeskError> {
            desk.table.render(&appointments, &suggestion_sets)?;
            Ok((desk.table.to_html(), desk.table.collect()))
        })?;

    info!("desk {}: extracted {} appointments", id, rendered.len());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "appointments_table_body": table_body,
        "appointments": rendered,
        "suggestions": suggestion_sets,
    })))
}

// Reviewer edits, posted as the table's form fields
async fn update_table(
    form: web::Form<Vec<(String, String)>>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = desk_id(&session)?;
    let appointments = AppointmentTable::from_form(form.into_inner()).map_err(DeskError::from)?;

    let collected = state
        .desks
        .with_desk(&id, |desk| -> Result<_, DeskError> {
            desk.table.apply_collected(&appointments)?;
            Ok(desk.table.collect())
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "appointments": collected})))
}

// Single input change, addressed by its `{field}_{index}` name
async fn edit_input(
    edit: web::Json<InputEdit>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = desk_id(&session)?;
    let appointments = state
        .desks
        .with_desk(&id, |desk| -> Result<_, DeskError> {
            desk.table.set_input(&edit.name, &edit.value)?;
            Ok(desk.table.collect())
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "appointments": appointments})))
}

// Save the reviewed table
async fn save_to_db(
    form: web::Form<Vec<(String, String)>>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = desk_id(&session)?;
    let appointments = AppointmentTable::from_form(form.into_inner()).map_err(DeskError::from)?;

    let store_state = state.clone();
    let to_store = appointments.clone();
    let saved = web::block(move || store_state.store.save_batch(&to_store))
        .await
        .map_err(DeskError::from)?
        .map_err(|e| {
            warn!("desk {}: save failed: {}", id, e);
            DeskError::from(e)
        })?;

    state.desks.with_desk(&id, |desk| {
        if let Err(e) = desk.table.apply_collected(&appointments) {
            debug!("desk {}: saved rows not mirrored into table: {}", id, e);
        }
    });

    info!("desk {}: saved {} appointments to {}", id, saved, state.store.path().display());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Extracted data was saved into DB",
        "saved": saved,
    })))
}

// Location name suggestions for a single raw name
async fn find_location_suggestions(
    req: web::Json<SuggestionRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let raw = req.location_name.as_deref().unwrap_or("");
    let suggestions = state.gazetteer.suggest(raw);
    Ok(HttpResponse::Ok().json(serde_json::json!({"suggestions": suggestions})))
}

// Current desk, used by the page on load
async fn get_desk(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    let id = desk_id(&session)?;
    let view = state.desks.with_desk(&id, |desk| desk.view());
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "desk": view})))
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Routes without middleware or state, shared by the server and tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .app_data(web::FormConfig::default().limit(MAX_FORM_BYTES))
        .route("/", web::get().to(index))
        .route("/api/desk", web::get().to(get_desk))
        .route("/api/upload", web::post().to(upload_image))
        .route("/api/extract", web::post().to(extract_data))
        .route("/api/table", web::post().to(update_table))
        .route("/api/table/input", web::post().to(edit_input))
        .route("/api/save", web::post().to(save_to_db))
        .route("/api/find_location_suggestions", web::post().to(find_location_suggestions));
}

pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::seconds(SESSION_TTL.as_secs() as i64)),
        )
        .build()
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let gazetteer = match Gazetteer::from_csv(&config.gazetteer_path) {
        Ok(g) if g.is_empty() => {
            warn!("gazetteer {} has no locations", config.gazetteer_path.display());
            g
        }
        Ok(g) => {
            info!("loaded {} locations from {}", g.len(), config.gazetteer_path.display());
            g
        }
        Err(e) => {
            warn!(
                "no gazetteer at {} ({}), location suggestions will be empty",
                config.gazetteer_path.display(),
                e
            );
            Gazetteer::default()
        }
    };

    let backend = HttpBackend::new(&config.backend_url).map_err(std::io::Error::other)?;

    let app_state = web::Data::new(AppState {
        desks: DeskRegistry::default(),
        backend: Box::new(backend),
        gazetteer,
        store: AppointmentStore::new(&config.store_path),
    });

    // Sessions only need to survive this process
    let key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone()))
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(configure)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
