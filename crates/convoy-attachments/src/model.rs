//! Attachment model

use bytes::Bytes;
use chrono::{DateTime, Utc};
use convoy_core::{AttachmentId, LocalRef};
use serde::{Deserialize, Serialize};

/// Kinds of file an attachment can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Document,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Document => "document",
        }
    }

    /// Derive the kind from a MIME content type. Anything that is not an
    /// image or a video is treated as a document.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else if content_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Document
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a single attachment.
///
/// A single tagged variant rather than independent flags, so an entry can
/// never be entering and leaving at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentState {
    /// Entry created, remote upload not yet settled
    Uploading,
    /// Upload settled, no outstanding errors
    Healthy,
    /// Settled with error messages, shown until explicitly removed
    Errored(Vec<String>),
    /// Remote delete in progress; the entry is removed once it completes
    Deleting,
}

impl AttachmentState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading)
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self, Self::Deleting)
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored(_))
    }

    /// Settled means the upload finished, successfully or not
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Healthy | Self::Errored(_))
    }

    /// Error messages carried by this state, empty unless errored
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Errored(messages) => messages,
            _ => &[],
        }
    }
}

/// A file candidate presented for admission
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Original file name
    pub name: String,
    /// Declared MIME type, if the picker supplied one
    pub content_type: Option<String>,
    /// File content
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Resolve the effective MIME type: the declared one wins, otherwise
    /// guess from the file name.
    pub fn resolved_content_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

/// A single attachment tracked by the store
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Store-internal handle, assigned at admission
    pub local_ref: LocalRef,
    /// Remote identifier, assigned once the upload succeeds
    pub id: Option<AttachmentId>,
    /// Original file name
    pub name: String,
    /// Kind derived from MIME at admission time
    pub kind: FileKind,
    /// File size in bytes
    pub size: u64,
    /// MIME content type
    pub content_type: String,
    /// Base64 content for inline preview; empty until the file was read
    pub encoded_content: String,
    /// Lifecycle state
    pub state: AttachmentState,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// Create an entry for an admitted file, upload still in flight
    pub fn pending(local_ref: LocalRef, file: &CandidateFile) -> Self {
        let content_type = file.resolved_content_type();
        Self {
            local_ref,
            id: None,
            name: file.name.clone(),
            kind: FileKind::from_content_type(&content_type),
            size: file.data.len() as u64,
            content_type,
            encoded_content: String::new(),
            state: AttachmentState::Uploading,
            created_at: Utc::now(),
        }
    }

    /// Create an entry for a file that failed admission. It never reaches
    /// the blob store but stays visible until the user removes it.
    pub fn rejected(local_ref: LocalRef, file: &CandidateFile, message: String) -> Self {
        let content_type = file.resolved_content_type();
        Self {
            local_ref,
            id: None,
            name: file.name.clone(),
            kind: FileKind::from_content_type(&content_type),
            size: file.data.len() as u64,
            content_type,
            encoded_content: String::new(),
            state: AttachmentState::Errored(vec![message]),
            created_at: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.state, AttachmentState::Healthy)
    }

    /// Whether this entry passed admission: it either has a remote object
    /// or an upload/delete is still in flight for it.
    pub fn was_admitted(&self) -> bool {
        self.id.is_some() || self.state.is_uploading() || self.state.is_deleting()
    }

    pub fn error_messages(&self) -> &[String] {
        self.state.errors()
    }
}
