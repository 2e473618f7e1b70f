use crate::client::{CatalogClient, ClientError};
use crate::events::ListInvalidator;
use crate::models::{Category, Component, NewComponent, DEFAULT_AUTHOR};
use crate::validation::FieldError;
use anyhow::{Context, Result};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Source files the upload form will read. Anything else is skipped.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".kt", ".java"];

/// Category used when the form leaves it blank.
pub const DEFAULT_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub size: u64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please fill in all required fields and upload at least one file")]
pub struct PreconditionError {
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("There was an error uploading your component. Please try again.")]
    Failed(#[source] ClientError),
}

pub fn is_accepted_file(name: &str) -> bool {
    ACCEPTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Splits a comma-separated tag field, trimming and dropping empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Draft of a component upload. Field values and read files survive a failed
/// submission so the user can retry.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: String,
    files: Vec<LocalFile>,
    submitted: bool,
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[LocalFile] {
        &self.files
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Adds an already-read file. Returns false when its extension is not
    /// accepted.
    pub fn add_file(&mut self, file: LocalFile) -> bool {
        if !is_accepted_file(&file.name) {
            debug!(file = %file.name, "ignoring file with unsupported extension");
            return false;
        }
        debug!(file = %file.name, size = file.size, "file added");
        self.files.push(file);
        true
    }

    /// Reads one file from disk. Files with other extensions are skipped
    /// without touching the filesystem.
    pub async fn read_file(&mut self, path: &Path) -> Result<bool> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if !is_accepted_file(&name) {
            debug!(file = %path.display(), "ignoring file with unsupported extension");
            return Ok(false);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let size = content.len() as u64;

        Ok(self.add_file(LocalFile {
            name,
            size,
            content,
        }))
    }

    /// Reads every path, skipping unreadable ones. Returns how many were added.
    pub async fn read_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> usize {
        let mut added = 0;
        for path in paths {
            match self.read_file(path.as_ref()).await {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(err) => warn!(error = %format!("{:#}", err), "skipping unreadable file"),
            }
        }
        added
    }

    pub fn remove_file(&mut self, index: usize) -> Option<LocalFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn check_preconditions(&self) -> Result<(), PreconditionError> {
        let mut fields = Vec::new();

        if self.name.trim().is_empty() {
            fields.push(FieldError::new("name", "Component name is required"));
        }
        if self.description.trim().is_empty() {
            fields.push(FieldError::new("description", "Description is required"));
        }
        if self.files.is_empty() {
            fields.push(FieldError::new("files", "Upload at least one source file"));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(PreconditionError { fields })
        }
    }

    /// The record that would be posted for the current draft.
    pub fn to_new_component(&self) -> Result<NewComponent, PreconditionError> {
        self.check_preconditions()?;

        let category = Category::new(self.category.as_str())
            .unwrap_or_else(|_| Category::known(DEFAULT_CATEGORY));
        let code = self
            .files
            .iter()
            .map(|f| f.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(NewComponent {
            name: self.name.clone(),
            description: self.description.clone(),
            category,
            code,
            tags: parse_tags(&self.tags),
            author_name: Some(DEFAULT_AUTHOR.to_string()),
            preview_image: None,
        })
    }

    /// Posts the draft. A failed precondition never reaches the network; a
    /// success marks the form submitted and invalidates cached gallery lists.
    pub async fn submit(
        &mut self,
        client: &CatalogClient,
        invalidator: &ListInvalidator,
    ) -> Result<Component, SubmitError> {
        let data = self.to_new_component()?;

        match client.create_component(&data).await {
            Ok(component) => {
                info!(id = %component.id, name = %component.name, "component submitted");
                self.submitted = true;
                invalidator.invalidate();
                Ok(component)
            }
            Err(err) => {
                warn!(error = %err, "component submission failed");
                Err(SubmitError::Failed(err))
            }
        }
    }

    /// Clears the form for another upload.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kotlin(name: &str, content: &str) -> LocalFile {
        LocalFile {
            name: name.to_string(),
            size: content.len() as u64,
            content: content.to_string(),
        }
    }

    fn filled_form() -> SubmissionForm {
        let mut form = SubmissionForm::new();
        form.name = "Loading Button".to_string();
        form.description = "Shows a spinner".to_string();
        form.add_file(kotlin("LoadingButton.kt", "fun A() {}"));
        form
    }

    #[test]
    fn parses_comma_separated_tags() {
        assert_eq!(
            parse_tags(" material, , button ,ripple,"),
            vec!["material", "button", "ripple"]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn only_kotlin_and_java_files_are_accepted() {
        let mut form = SubmissionForm::new();
        assert!(form.add_file(kotlin("Card.kt", "x")));
        assert!(form.add_file(kotlin("Legacy.java", "y")));
        assert!(!form.add_file(kotlin("notes.txt", "z")));
        assert!(!form.add_file(kotlin("Card.kts", "z")));
        assert_eq!(form.files().len(), 2);
    }

    #[test]
    fn empty_form_reports_every_missing_field() {
        let err = SubmissionForm::new().check_preconditions().unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "description", "files"]);
    }

    #[test]
    fn builds_component_from_draft() {
        let mut form = filled_form();
        form.add_file(kotlin("Extra.kt", "fun B() {}"));
        form.tags = "button, loading".to_string();

        let data = form.to_new_component().unwrap();
        assert_eq!(data.code, "fun A() {}\n\nfun B() {}");
        assert_eq!(data.category.as_str(), DEFAULT_CATEGORY);
        assert_eq!(data.tags, vec!["button", "loading"]);
        assert_eq!(data.author_name.as_deref(), Some(DEFAULT_AUTHOR));
        assert!(data.preview_image.is_none());
    }

    #[test]
    fn keeps_chosen_category() {
        let mut form = filled_form();
        form.category = "Buttons".to_string();
        assert_eq!(form.to_new_component().unwrap().category.as_str(), "Buttons");
    }

    #[test]
    fn removing_files_can_break_preconditions() {
        let mut form = filled_form();
        assert!(form.remove_file(3).is_none());
        assert_eq!(
            form.remove_file(0).map(|f| f.name),
            Some("LoadingButton.kt".to_string())
        );
        assert!(form.check_preconditions().is_err());
    }

    #[tokio::test]
    async fn reads_matching_files_and_skips_others() {
        let dir = tempfile::tempdir().unwrap();
        let kt = dir.path().join("Fab.kt");
        let txt = dir.path().join("README.txt");
        let missing = dir.path().join("Gone.java");
        std::fs::write(&kt, "@Composable fun Fab() {}").unwrap();
        std::fs::write(&txt, "not code").unwrap();

        let mut form = SubmissionForm::new();
        let added = form.read_files(&[&kt, &txt, &missing]).await;

        assert_eq!(added, 1);
        assert_eq!(form.files()[0].name, "Fab.kt");
        assert_eq!(form.files()[0].size, 24);
        assert!(form.read_file(&missing).await.is_err());
    }

    #[tokio::test]
    async fn precondition_failure_never_hits_the_network() {
        // Nothing listens on this port; a request would surface as Failed.
        let client = CatalogClient::new("http://127.0.0.1:9");
        let (invalidator, mut updates) = crate::events::list_version_channel();

        let mut form = SubmissionForm::new();
        form.name = "Only a name".to_string();
        let err = form.submit(&client, &invalidator).await.unwrap_err();

        assert!(matches!(err, SubmitError::Precondition(_)));
        assert!(!form.is_submitted());
        assert!(!updates.take_change());
    }

    #[test]
    fn reset_clears_everything() {
        let mut form = filled_form();
        form.reset();
        assert!(form.name.is_empty());
        assert!(form.files().is_empty());
        assert!(!form.is_submitted());
    }
}
