use crate::errors::{AppError, AppResult};
use crate::models::{normalize_tags, EditorMode, EditorView, FileRecord, RecordForm};
use uuid::Uuid;

/// What a successful submit produced. `Created` records are appended to the
/// collection; `Updated` records replace the record with the same id in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    Created(FileRecord),
    Updated(FileRecord),
}

impl Commit {
    pub fn record(&self) -> &FileRecord {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }
}

/// Modal editor for exactly one record. Two states: closed, or open in
/// create/edit mode with in-progress form state. The form is always a copy;
/// nothing touches the stored collection until a submit passes validation.
#[derive(Debug, Default)]
pub enum Editor {
    #[default]
    Closed,
    Open {
        mode: EditorMode,
        form: RecordForm,
        tags_pending: bool,
        description_pending: bool,
    },
}

impl Editor {
    pub fn open_create(&mut self) {
        *self = Self::Open {
            mode: EditorMode::Create,
            form: RecordForm::default(),
            tags_pending: false,
            description_pending: false,
        };
    }

    pub fn open_edit(&mut self, record: &FileRecord) {
        *self = Self::Open {
            mode: EditorMode::Edit {
                id: record.id.clone(),
            },
            form: RecordForm::from_record(record),
            tags_pending: false,
            description_pending: false,
        };
    }

    /// Replaces the in-progress form state wholesale, the way the modal's
    /// change handlers do. Tags are deduplicated at this boundary.
    pub fn update(&mut self, mut next: RecordForm) -> AppResult<()> {
        match self {
            Self::Open { form, .. } => {
                next.tags = normalize_tags(next.tags);
                *form = next;
                Ok(())
            }
            Self::Closed => Err(AppError::Validation("editor is not open".to_string())),
        }
    }

    /// Validates and commits the form. Validation failure leaves the editor
    /// open with its state intact; success transitions to closed.
    pub fn submit(&mut self) -> AppResult<Commit> {
        let Self::Open { mode, form, .. } = self else {
            return Err(AppError::Validation("editor is not open".to_string()));
        };
        if form.name.trim().is_empty() || form.path.trim().is_empty() {
            return Err(AppError::Validation(
                "name and path are required".to_string(),
            ));
        }

        let commit = match mode {
            EditorMode::Create => {
                Commit::Created(form.clone().into_record(Uuid::new_v4().to_string()))
            }
            EditorMode::Edit { id } => Commit::Updated(form.clone().into_record(id.clone())),
        };
        *self = Self::Closed;
        Ok(commit)
    }

    /// Discards all in-progress edits.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn view(&self) -> EditorView {
        match self {
            Self::Open {
                mode,
                form,
                tags_pending,
                description_pending,
            } => EditorView {
                open: true,
                mode: Some(mode.clone()),
                form: Some(form.clone()),
                tags_pending: *tags_pending,
                description_pending: *description_pending,
            },
            Self::Closed => EditorView {
                open: false,
                mode: None,
                form: None,
                tags_pending: false,
                description_pending: false,
            },
        }
    }

    /// Marks the tag-suggestion request as in flight and returns the free
    /// text it should be based on. Re-entry while a request is pending is
    /// rejected, mirroring the disabled trigger control.
    pub fn begin_tag_request(&mut self) -> AppResult<String> {
        match self {
            Self::Open {
                form, tags_pending, ..
            } => {
                if *tags_pending {
                    return Err(AppError::Validation(
                        "a tag suggestion is already pending".to_string(),
                    ));
                }
                *tags_pending = true;
                Ok(format!(
                    "{} {} {}",
                    form.name, form.description, form.installation_notes
                )
                .trim()
                .to_string())
            }
            Self::Closed => Err(AppError::Validation("editor is not open".to_string())),
        }
    }

    /// Completes a tag-suggestion request. On success the suggestions are
    /// unioned into the current tags; on failure (`None`) the form is left
    /// unchanged. A no-op when the editor was closed mid-flight.
    pub fn finish_tag_request(&mut self, suggestions: Option<Vec<String>>) {
        if let Self::Open {
            form, tags_pending, ..
        } = self
        {
            *tags_pending = false;
            if let Some(suggestions) = suggestions {
                let mut merged = form.tags.clone();
                merged.extend(suggestions);
                form.tags = normalize_tags(merged);
            }
        }
    }

    pub fn begin_description_request(&mut self) -> AppResult<String> {
        match self {
            Self::Open {
                form,
                description_pending,
                ..
            } => {
                if *description_pending {
                    return Err(AppError::Validation(
                        "a description suggestion is already pending".to_string(),
                    ));
                }
                *description_pending = true;
                Ok(form.name.clone())
            }
            Self::Closed => Err(AppError::Validation("editor is not open".to_string())),
        }
    }

    /// Completes a description-suggestion request; a successful suggestion
    /// overwrites the description field.
    pub fn finish_description_request(&mut self, suggestion: Option<String>) {
        if let Self::Open {
            form,
            description_pending,
            ..
        } = self
        {
            *description_pending = false;
            if let Some(suggestion) = suggestion {
                form.description = suggestion;
            }
        }
    }
}
