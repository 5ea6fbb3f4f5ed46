use serde::{Deserialize, Serialize};

/// One cataloged file's metadata. The `path` is never checked against a real
/// filesystem: this is a metadata catalog, not a file manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub path: String,
    pub description: String,
    pub installation_notes: String,
    pub image_url: String,
    pub password: String,
    pub tags: Vec<String>,
}

/// In-progress editor form state: a `FileRecord` without an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordForm {
    pub name: String,
    pub path: String,
    pub description: String,
    pub installation_notes: String,
    pub image_url: String,
    pub password: String,
    pub tags: Vec<String>,
}

impl RecordForm {
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            name: record.name.clone(),
            path: record.path.clone(),
            description: record.description.clone(),
            installation_notes: record.installation_notes.clone(),
            image_url: record.image_url.clone(),
            password: record.password.clone(),
            tags: record.tags.clone(),
        }
    }

    pub fn into_record(self, id: String) -> FileRecord {
        FileRecord {
            id,
            name: self.name,
            path: self.path,
            description: self.description,
            installation_notes: self.installation_notes,
            image_url: self.image_url,
            password: self.password,
            tags: self.tags,
        }
    }
}

/// Trims each tag, drops empties, and removes duplicates while preserving the
/// first occurrence's position.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !normalized.iter().any(|existing| existing == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardSize {
    Xxsmall,
    Xsmall,
    Small,
    Medium,
    Large,
}

impl Default for CardSize {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListFilters {
    pub selected_tag: Option<String>,
    pub search_term: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorMode {
    Create,
    Edit { id: String },
}

/// Snapshot of the editor handed to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub open: bool,
    pub mode: Option<EditorMode>,
    pub form: Option<RecordForm>,
    pub tags_pending: bool,
    pub description_pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub records: Vec<FileRecord>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}
