//! # convoy-attachments
//!
//! Attachment lifecycle tracking for Convoy.
//!
//! ## Features
//!
//! - Admission of candidate files against a limit specification
//! - Per-attachment state machine (uploading, healthy, errored, deleting)
//! - Per-conversation store with concurrent uploads and queued deletes
//! - Blob store abstraction (S3-like remote, in-memory for tests)
//!
//! ## Example
//!
//! ```rust,ignore
//! use convoy_attachments::{AttachmentStore, CandidateFile, LimitSpec, MemoryBlobStore};
//! use std::sync::Arc;
//!
//! let store = AttachmentStore::new(Arc::new(MemoryBlobStore::new()));
//! let limit = LimitSpec::new(5, 10 * 1024 * 1024, ["image/*"]);
//!
//! store.upload(vec![CandidateFile::new("photo.png", bytes)], &limit).await;
//! store.wait_idle().await;
//! assert!(store.error_messages().await.is_empty());
//! ```

pub mod blob;
pub mod model;
pub mod policy;
pub mod store;

pub use blob::{BlobError, BlobResult, BlobStore, MemoryBlobStore, StoredObject};
pub use model::{Attachment, AttachmentState, CandidateFile, FileKind};
pub use policy::{admit, check_entry, Admission, LimitSpec, RejectReason};
pub use store::AttachmentStore;
