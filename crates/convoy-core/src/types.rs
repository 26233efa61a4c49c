//! Common identifier types used throughout Convoy

/// Identifier of a remotely stored attachment, assigned by the blob store
/// once an upload succeeds. Opaque to everything but the blob store.
pub type AttachmentId = String;

/// Store-internal handle for an attachment entry. Unique for the lifetime
/// of one store. Entries whose upload never succeeded have no
/// [`AttachmentId`] but still need to be addressable for local removal.
pub type LocalRef = u64;
