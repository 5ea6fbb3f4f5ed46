use crate::ai::{GeminiClient, KEYRING_SERVICE, KEYRING_USER};
use crate::db::Store;
use crate::editor::{Commit, Editor};
use crate::errors::{AppError, AppResult};
use crate::filter::filter_records;
use crate::images;
use crate::models::{
    BooleanResponse, CardSize, EditorView, ExportResponse, FileRecord, ImportPreview, ListFilters,
    RecordForm,
};
use crate::tags;
use crate::transfer;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct FilterCache {
    version: u64,
    selected_tag: Option<String>,
    search_term: String,
    result: Vec<FileRecord>,
}

/// Owns the record store, the editor state machine, and the suggestion
/// client. All state transitions run inside one command handler at a time;
/// the mutexes only guard against the Tauri runtime dispatching handlers on
/// different threads.
pub struct CatalogCore {
    db: Arc<Store>,
    editor: Mutex<Editor>,
    filter_cache: Mutex<Option<FilterCache>>,
    ai: GeminiClient,
    keyring_lock: tokio::sync::Mutex<()>,
}

impl CatalogCore {
    pub fn new(app_data_dir: PathBuf) -> AppResult<Arc<Self>> {
        let db = Arc::new(Store::open(&app_data_dir.join("catalog.db"))?);
        let records = db.load_records()?;
        tracing::info!(count = records.len(), "catalog store loaded");

        Ok(Arc::new(Self {
            db,
            editor: Mutex::new(Editor::default()),
            filter_cache: Mutex::new(None),
            ai: GeminiClient::default(),
            keyring_lock: tokio::sync::Mutex::new(()),
        }))
    }

    pub fn list_records(&self) -> AppResult<Vec<FileRecord>> {
        self.db.load_records()
    }

    /// Filtered view of the collection. The last derivation is cached against
    /// the store version so repeated renders with unchanged inputs do not
    /// recompute.
    pub fn list_filtered(&self, filters: ListFilters) -> AppResult<Vec<FileRecord>> {
        let version = self.db.version();
        let mut cache = self.lock_filter_cache()?;
        if let Some(cached) = cache.as_ref() {
            if cached.version == version
                && cached.selected_tag == filters.selected_tag
                && cached.search_term == filters.search_term
            {
                return Ok(cached.result.clone());
            }
        }

        let records = self.db.load_records()?;
        let result = filter_records(&records, filters.selected_tag.as_deref(), &filters.search_term);
        *cache = Some(FilterCache {
            version,
            selected_tag: filters.selected_tag,
            search_term: filters.search_term,
            result: result.clone(),
        });
        Ok(result)
    }

    pub fn all_tags(&self) -> AppResult<Vec<String>> {
        Ok(tags::all_tags(&self.db.load_records()?))
    }

    pub fn frequent_tags(&self, limit: usize) -> AppResult<Vec<String>> {
        Ok(tags::frequent_tags(&self.db.load_records()?, limit))
    }

    pub fn editor_open_create(&self) -> AppResult<EditorView> {
        let mut editor = self.lock_editor()?;
        editor.open_create();
        Ok(editor.view())
    }

    pub fn editor_open_edit(&self, record_id: &str) -> AppResult<EditorView> {
        let records = self.db.load_records()?;
        let record = records
            .iter()
            .find(|record| record.id == record_id)
            .ok_or_else(|| AppError::NotFound(format!("record {record_id}")))?;
        let mut editor = self.lock_editor()?;
        editor.open_edit(record);
        Ok(editor.view())
    }

    pub fn editor_update(&self, form: RecordForm) -> AppResult<EditorView> {
        let mut editor = self.lock_editor()?;
        editor.update(form)?;
        Ok(editor.view())
    }

    /// Commits the open form into the store: create appends, edit replaces
    /// the matching record in place.
    pub fn editor_submit(&self) -> AppResult<FileRecord> {
        let commit = self.lock_editor()?.submit()?;
        let mut records = self.db.load_records()?;
        let committed = match commit {
            Commit::Created(record) => {
                records.push(record.clone());
                record
            }
            Commit::Updated(record) => {
                let slot = records
                    .iter_mut()
                    .find(|existing| existing.id == record.id)
                    .ok_or_else(|| AppError::NotFound(format!("record {}", record.id)))?;
                *slot = record.clone();
                record
            }
        };
        self.db.replace_records(&records)?;
        tracing::debug!(record_id = %committed.id, "record committed");
        Ok(committed)
    }

    pub fn editor_close(&self) -> AppResult<EditorView> {
        let mut editor = self.lock_editor()?;
        editor.close();
        Ok(editor.view())
    }

    pub fn editor_state(&self) -> AppResult<EditorView> {
        Ok(self.lock_editor()?.view())
    }

    /// Requests tag suggestions for the open form and unions them into the
    /// current tag set. A declined or failed request leaves the form as-is.
    pub async fn editor_suggest_tags(&self) -> AppResult<EditorView> {
        let text = self.lock_editor()?.begin_tag_request()?;
        let outcome = self.ai.suggest_tags(&text).await;
        let mut editor = self.lock_editor()?;
        match outcome {
            Ok(suggestions) => {
                editor.finish_tag_request(Some(suggestions));
                Ok(editor.view())
            }
            Err(error) => {
                editor.finish_tag_request(None);
                tracing::warn!(error = %error, "tag suggestion failed");
                Err(error)
            }
        }
    }

    /// Requests a description suggestion for the open form; success
    /// overwrites the description field.
    pub async fn editor_suggest_description(&self) -> AppResult<EditorView> {
        let name = self.lock_editor()?.begin_description_request()?;
        let outcome = self.ai.suggest_description(&name).await;
        let mut editor = self.lock_editor()?;
        match outcome {
            Ok(description) => {
                editor.finish_description_request(Some(description));
                Ok(editor.view())
            }
            Err(error) => {
                editor.finish_description_request(None);
                tracing::warn!(error = %error, "description suggestion failed");
                Err(error)
            }
        }
    }

    /// Deletes one record. The destructive step only runs once the user has
    /// confirmed; a declined confirmation is a no-op.
    pub fn delete_record(&self, record_id: &str, confirmed: bool) -> AppResult<BooleanResponse> {
        if !confirmed {
            return Ok(BooleanResponse { success: false });
        }
        let mut records = self.db.load_records()?;
        let before = records.len();
        records.retain(|record| record.id != record_id);
        if records.len() == before {
            return Err(AppError::NotFound(format!("record {record_id}")));
        }
        self.db.replace_records(&records)?;
        tracing::debug!(record_id = %record_id, "record deleted");
        Ok(BooleanResponse { success: true })
    }

    /// Exports the full collection into `database.xlsx` under the given
    /// directory. An empty collection is refused rather than producing an
    /// empty file.
    pub fn export_records(&self, dest_dir: &str) -> AppResult<ExportResponse> {
        let records = self.db.load_records()?;
        if records.is_empty() {
            return Err(AppError::EmptyExport("no records to export".to_string()));
        }
        let path = PathBuf::from(dest_dir).join(transfer::EXPORT_FILE_NAME);
        transfer::write_workbook(&records, &path)?;
        tracing::info!(count = records.len(), path = %path.display(), "catalog exported");
        Ok(ExportResponse {
            path: path.display().to_string(),
        })
    }

    /// Parses a workbook into a preview. The store is untouched until the
    /// user confirms the overwrite via `apply_import`.
    pub fn read_import(&self, path: &str) -> AppResult<ImportPreview> {
        let records = transfer::read_workbook(std::path::Path::new(path))?;
        let count = records.len();
        Ok(ImportPreview { records, count })
    }

    /// Wholesale-replaces the collection with previously parsed records.
    /// Declining the confirmation leaves the existing store untouched.
    pub fn apply_import(
        &self,
        records: Vec<FileRecord>,
        confirmed: bool,
    ) -> AppResult<BooleanResponse> {
        if !confirmed {
            return Ok(BooleanResponse { success: false });
        }
        self.db.replace_records(&records)?;
        tracing::info!(count = records.len(), "catalog replaced by import");
        Ok(BooleanResponse { success: true })
    }

    /// Shrinks an uploaded image (base64-encoded raw bytes) into an embedded
    /// JPEG data URL for the `imageUrl` field.
    pub fn attach_image(&self, data: &str) -> AppResult<String> {
        let bytes = BASE64
            .decode(data)
            .map_err(|error| AppError::Io(error.to_string()))?;
        images::shrink_to_data_url(&bytes, images::MAX_DIMENSION)
    }

    pub fn card_size(&self) -> AppResult<CardSize> {
        self.db.card_size()
    }

    pub fn set_card_size(&self, size: CardSize) -> AppResult<CardSize> {
        self.db.set_card_size(size)?;
        Ok(size)
    }

    pub async fn save_ai_token(&self, token: String) -> AppResult<BooleanResponse> {
        let _guard = self.keyring_lock.lock().await;
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|error| AppError::Io(error.to_string()))?;
        entry
            .set_password(&token)
            .map_err(|error| AppError::Io(error.to_string()))?;
        Ok(BooleanResponse { success: true })
    }

    pub async fn clear_ai_token(&self) -> AppResult<BooleanResponse> {
        let _guard = self.keyring_lock.lock().await;
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|error| AppError::Io(error.to_string()))?;
        match entry.delete_credential() {
            Ok(_) => Ok(BooleanResponse { success: true }),
            Err(keyring::Error::NoEntry) => Ok(BooleanResponse { success: true }),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    pub async fn has_ai_token(&self) -> AppResult<BooleanResponse> {
        let _guard = self.keyring_lock.lock().await;
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|error| AppError::Io(error.to_string()))?;
        match entry.get_password() {
            Ok(value) => Ok(BooleanResponse {
                success: !value.is_empty(),
            }),
            Err(keyring::Error::NoEntry) => Ok(BooleanResponse { success: false }),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    fn lock_editor(&self) -> AppResult<std::sync::MutexGuard<'_, Editor>> {
        self.editor
            .lock()
            .map_err(|_| AppError::Internal("editor mutex poisoned".to_string()))
    }

    fn lock_filter_cache(&self) -> AppResult<std::sync::MutexGuard<'_, Option<FilterCache>>> {
        self.filter_cache
            .lock()
            .map_err(|_| AppError::Internal("filter cache mutex poisoned".to_string()))
    }
}
