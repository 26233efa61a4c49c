//! Admission policy
//!
//! Pure validation of candidate files against a limit specification.
//! Admission never touches the store; it only decides.

use convoy_core::UploadConfig;

use crate::model::{Attachment, CandidateFile};

/// Limits applied to the attachments of one context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitSpec {
    /// Maximum number of attachments
    pub max_file_count: usize,
    /// Maximum size of a single attachment in bytes
    pub max_file_size_bytes: u64,
    /// Accepted kind patterns: exact MIME (`image/png`), wildcard subtype
    /// (`image/*`), or file extension (`.pdf`)
    pub accepted_kinds: Vec<String>,
}

impl LimitSpec {
    pub fn new<I, S>(max_file_count: usize, max_file_size_bytes: u64, accepted_kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_file_count,
            max_file_size_bytes,
            accepted_kinds: accepted_kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a file with this name and MIME type is an accepted kind
    pub fn accepts(&self, name: &str, content_type: &str) -> bool {
        self.accepted_kinds
            .iter()
            .any(|pattern| matches_pattern(pattern, name, content_type))
    }
}

impl From<&UploadConfig> for LimitSpec {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_file_count: config.max_file_count,
            max_file_size_bytes: config.max_file_size_bytes,
            accepted_kinds: config.accepted_kinds.clone(),
        }
    }
}

fn matches_pattern(pattern: &str, name: &str, content_type: &str) -> bool {
    if let Some(ext) = pattern.strip_prefix('.') {
        let suffix = format!(".{}", ext.to_ascii_lowercase());
        return name.to_ascii_lowercase().ends_with(&suffix);
    }
    if let Some(main_type) = pattern.strip_suffix("/*") {
        return content_type.split('/').next() == Some(main_type);
    }
    content_type.eq_ignore_ascii_case(pattern)
}

/// Why a candidate was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType,
    TooLarge,
    TooManyFiles,
}

impl RejectReason {
    /// Human-readable message naming the file
    pub fn message(&self, file_name: &str, limit: &LimitSpec) -> String {
        match self {
            Self::UnsupportedType => format!("{} is not an accepted file type", file_name),
            Self::TooLarge => format!(
                "{} exceeds the maximum file size of {} bytes",
                file_name, limit.max_file_size_bytes
            ),
            Self::TooManyFiles => format!(
                "{} exceeds the maximum of {} attached files",
                file_name, limit.max_file_count
            ),
        }
    }
}

/// Outcome of admitting a batch of candidates
#[derive(Debug)]
pub struct Admission {
    /// Admitted, in presentation order
    pub accepted: Vec<CandidateFile>,
    /// Rejected, each with the first reason that applied
    pub rejected: Vec<(CandidateFile, RejectReason)>,
}

/// Decide which candidates are admissible given the limit and the number
/// of slots already taken. First-come admitted; overflow rejected.
pub fn admit(
    candidates: Vec<CandidateFile>,
    limit: &LimitSpec,
    current_count: usize,
) -> Admission {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    let mut remaining = limit.max_file_count.saturating_sub(current_count);

    for file in candidates {
        let content_type = file.resolved_content_type();
        if !limit.accepts(&file.name, &content_type) {
            rejected.push((file, RejectReason::UnsupportedType));
        } else if file.data.len() as u64 > limit.max_file_size_bytes {
            rejected.push((file, RejectReason::TooLarge));
        } else if remaining == 0 {
            rejected.push((file, RejectReason::TooManyFiles));
        } else {
            remaining -= 1;
            accepted.push(file);
        }
    }

    Admission { accepted, rejected }
}

/// Re-apply the admission predicate to an already-stored entry occupying
/// the given slot. Used to recompute error text when the limit changes;
/// never mutates anything.
pub fn check_entry(attachment: &Attachment, limit: &LimitSpec, slot: usize) -> Vec<String> {
    let mut messages = Vec::new();
    if !limit.accepts(&attachment.name, &attachment.content_type) {
        messages.push(RejectReason::UnsupportedType.message(&attachment.name, limit));
    }
    if attachment.size > limit.max_file_size_bytes {
        messages.push(RejectReason::TooLarge.message(&attachment.name, limit));
    }
    if slot >= limit.max_file_count {
        messages.push(RejectReason::TooManyFiles.message(&attachment.name, limit));
    }
    messages
}
