pub mod ai;
pub mod catalog;
pub mod db;
pub mod editor;
pub mod errors;
pub mod filter;
pub mod images;
pub mod models;
pub mod tags;
pub mod transfer;

use crate::catalog::CatalogCore;
use crate::models::{
    BooleanResponse, CardSize, EditorView, ExportResponse, FileRecord, ImportPreview, ListFilters,
    RecordForm,
};
use std::path::Path;
use std::sync::Arc;
use tauri::Manager;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

#[derive(Clone)]
struct AppState {
    core: Arc<CatalogCore>,
}

#[tauri::command]
fn list_records(state: tauri::State<'_, AppState>) -> Result<Vec<FileRecord>, String> {
    state.core.list_records().map_err(to_client_error)
}

#[tauri::command]
fn list_filtered(
    state: tauri::State<'_, AppState>,
    filters: ListFilters,
) -> Result<Vec<FileRecord>, String> {
    state.core.list_filtered(filters).map_err(to_client_error)
}

#[tauri::command]
fn all_tags(state: tauri::State<'_, AppState>) -> Result<Vec<String>, String> {
    state.core.all_tags().map_err(to_client_error)
}

#[tauri::command]
fn frequent_tags(state: tauri::State<'_, AppState>, limit: usize) -> Result<Vec<String>, String> {
    state.core.frequent_tags(limit).map_err(to_client_error)
}

#[tauri::command]
fn editor_open_create(state: tauri::State<'_, AppState>) -> Result<EditorView, String> {
    state.core.editor_open_create().map_err(to_client_error)
}

#[tauri::command]
fn editor_open_edit(
    state: tauri::State<'_, AppState>,
    record_id: String,
) -> Result<EditorView, String> {
    state
        .core
        .editor_open_edit(&record_id)
        .map_err(to_client_error)
}

#[tauri::command]
fn editor_update(
    state: tauri::State<'_, AppState>,
    form: RecordForm,
) -> Result<EditorView, String> {
    state.core.editor_update(form).map_err(to_client_error)
}

#[tauri::command]
fn editor_submit(state: tauri::State<'_, AppState>) -> Result<FileRecord, String> {
    state.core.editor_submit().map_err(to_client_error)
}

#[tauri::command]
fn editor_close(state: tauri::State<'_, AppState>) -> Result<EditorView, String> {
    state.core.editor_close().map_err(to_client_error)
}

#[tauri::command]
fn editor_state(state: tauri::State<'_, AppState>) -> Result<EditorView, String> {
    state.core.editor_state().map_err(to_client_error)
}

#[tauri::command]
async fn editor_suggest_tags(state: tauri::State<'_, AppState>) -> Result<EditorView, String> {
    state
        .core
        .editor_suggest_tags()
        .await
        .map_err(to_client_error)
}

#[tauri::command]
async fn editor_suggest_description(
    state: tauri::State<'_, AppState>,
) -> Result<EditorView, String> {
    state
        .core
        .editor_suggest_description()
        .await
        .map_err(to_client_error)
}

#[tauri::command]
fn delete_record(
    state: tauri::State<'_, AppState>,
    record_id: String,
    confirmed: bool,
) -> Result<BooleanResponse, String> {
    state
        .core
        .delete_record(&record_id, confirmed)
        .map_err(to_client_error)
}

#[tauri::command]
fn export_records(
    state: tauri::State<'_, AppState>,
    dest_dir: String,
) -> Result<ExportResponse, String> {
    state.core.export_records(&dest_dir).map_err(to_client_error)
}

#[tauri::command]
fn read_import(state: tauri::State<'_, AppState>, path: String) -> Result<ImportPreview, String> {
    state.core.read_import(&path).map_err(to_client_error)
}

#[tauri::command]
fn apply_import(
    state: tauri::State<'_, AppState>,
    records: Vec<FileRecord>,
    confirmed: bool,
) -> Result<BooleanResponse, String> {
    state
        .core
        .apply_import(records, confirmed)
        .map_err(to_client_error)
}

#[tauri::command]
fn attach_image(state: tauri::State<'_, AppState>, data: String) -> Result<String, String> {
    state.core.attach_image(&data).map_err(to_client_error)
}

#[tauri::command]
fn get_card_size(state: tauri::State<'_, AppState>) -> Result<CardSize, String> {
    state.core.card_size().map_err(to_client_error)
}

#[tauri::command]
fn set_card_size(state: tauri::State<'_, AppState>, size: CardSize) -> Result<CardSize, String> {
    state.core.set_card_size(size).map_err(to_client_error)
}

#[tauri::command]
async fn save_ai_token(
    state: tauri::State<'_, AppState>,
    token: String,
) -> Result<BooleanResponse, String> {
    state.core.save_ai_token(token).await.map_err(to_client_error)
}

#[tauri::command]
async fn clear_ai_token(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
    state.core.clear_ai_token().await.map_err(to_client_error)
}

#[tauri::command]
async fn has_ai_token(state: tauri::State<'_, AppState>) -> Result<BooleanResponse, String> {
    state.core.has_ai_token().await.map_err(to_client_error)
}

pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir().map_err(|error| error.to_string())?;
            std::fs::create_dir_all(&app_data_dir).map_err(|error| error.to_string())?;
            init_tracing(&app_data_dir).map_err(|error| error.to_string())?;

            let core = CatalogCore::new(app_data_dir).map_err(|error| error.to_string())?;
            app.manage(AppState { core });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            list_records,
            list_filtered,
            all_tags,
            frequent_tags,
            editor_open_create,
            editor_open_edit,
            editor_update,
            editor_submit,
            editor_close,
            editor_state,
            editor_suggest_tags,
            editor_suggest_description,
            delete_record,
            export_records,
            read_import,
            apply_import,
            attach_image,
            get_card_size,
            set_card_size,
            save_ai_token,
            clear_ai_token,
            has_ai_token
        ])
        .run(tauri::generate_context!())
        .expect("failed to run tauri app");
}

fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "catalog.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
