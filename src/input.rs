// src/input.rs
//! Input Collector - owns the selected résumé and the criteria text, and
//! turns them into a write-once `SubmissionRequest` on submit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ScanError;

const PDF_SUFFIX: &str = ".pdf";
const INVALID_FILE: &str = "missing or invalid file";

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A résumé picked by the user. Immutable once created; cloning shares the
/// underlying buffer or path.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    name: String,
    source: FileSource,
}

impl ResumeFile {
    /// File chosen through a picker. Contents are not read until submission.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    /// File dropped onto the target, already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            name: name.into(),
            source: FileSource::Memory(Arc::from(bytes)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Memory(_) => None,
        }
    }

    /// Case-sensitive suffix check on the displayed name.
    pub fn has_pdf_name(&self) -> bool {
        self.name.ends_with(PDF_SUFFIX)
    }

    /// Checks that a picked file still exists and can be opened. In-memory
    /// files always pass.
    pub async fn ensure_readable(&self) -> Result<(), ScanError> {
        let path = match &self.source {
            FileSource::Memory(_) => return Ok(()),
            FileSource::Path(path) => path,
        };

        let unreadable = |e: std::io::Error| {
            ScanError::Validation(format!("cannot read {}: {}", path.display(), e))
        };
        let file = tokio::fs::File::open(path).await.map_err(unreadable)?;
        let metadata = file.metadata().await.map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(ScanError::Validation(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        Ok(())
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>, ScanError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
            FileSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                ScanError::Validation(format!("failed to read {}: {}", path.display(), e))
            }),
        }
    }
}

/// Which criteria layout the deployment expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaShape {
    JobDescription,
    Keywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaField {
    JobDescription,
    TechKeywords,
    SoftKeywords,
}

/// Unstructured matching criteria, passed to the backend verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    JobDescription(String),
    Keywords { technical: String, soft: String },
}

impl Criteria {
    pub fn empty(shape: CriteriaShape) -> Self {
        match shape {
            CriteriaShape::JobDescription => Criteria::JobDescription(String::new()),
            CriteriaShape::Keywords => Criteria::Keywords {
                technical: String::new(),
                soft: String::new(),
            },
        }
    }

    pub fn shape(&self) -> CriteriaShape {
        match self {
            Criteria::JobDescription(_) => CriteriaShape::JobDescription,
            Criteria::Keywords { .. } => CriteriaShape::Keywords,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Criteria::JobDescription(text) => text.trim().is_empty(),
            Criteria::Keywords { technical, soft } => {
                technical.trim().is_empty() && soft.trim().is_empty()
            }
        }
    }

    fn field_mut(&mut self, field: CriteriaField) -> Option<&mut String> {
        match (self, field) {
            (Criteria::JobDescription(text), CriteriaField::JobDescription) => Some(text),
            (Criteria::Keywords { technical, .. }, CriteriaField::TechKeywords) => Some(technical),
            (Criteria::Keywords { soft, .. }, CriteriaField::SoftKeywords) => Some(soft),
            _ => None,
        }
    }
}

/// Payload for exactly one submit action. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    id: Uuid,
    file: ResumeFile,
    criteria: Criteria,
}

impl SubmissionRequest {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file(&self) -> &ResumeFile {
        &self.file
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }
}

#[derive(Debug, Clone)]
pub struct InputCollector {
    file: Option<ResumeFile>,
    criteria: Criteria,
}

impl InputCollector {
    pub fn new(shape: CriteriaShape) -> Self {
        Self {
            file: None,
            criteria: Criteria::empty(shape),
        }
    }

    /// Picker and drop target both land here. `None` is ignored. The stored
    /// file is both what gets displayed and what gets uploaded.
    pub fn select_file(&mut self, file: Option<ResumeFile>) {
        if let Some(file) = file {
            debug!("Selected resume file: {}", file.name());
            self.file = Some(file);
        }
    }

    pub fn file(&self) -> Option<&ResumeFile> {
        self.file.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(ResumeFile::name)
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Stores `text` verbatim. Fails only when the field is not part of the
    /// active criteria shape.
    pub fn update_criteria(
        &mut self,
        field: CriteriaField,
        text: impl Into<String>,
    ) -> Result<(), ScanError> {
        let shape = self.criteria.shape();
        let slot = self.criteria.field_mut(field).ok_or_else(|| {
            ScanError::Validation(format!(
                "criteria field {:?} is not used with {:?} criteria",
                field, shape
            ))
        })?;
        *slot = text.into();
        Ok(())
    }

    pub fn build_request(&self) -> Result<SubmissionRequest, ScanError> {
        let file = match &self.file {
            Some(file) if file.has_pdf_name() => file.clone(),
            _ => return Err(ScanError::Validation(INVALID_FILE.to_string())),
        };

        if self.criteria.is_blank() {
            warn!("Submitting {} with empty criteria", file.name());
        }

        Ok(SubmissionRequest {
            id: Uuid::new_v4(),
            file,
            criteria: self.criteria.clone(),
        })
    }
}
