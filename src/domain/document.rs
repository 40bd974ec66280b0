use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::file_type::SupportedFileType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw document bytes plus the metadata a caller knows about them.
///
/// `size_bytes` is the size the caller declared, which is what validation
/// checks; it is not recomputed from `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentBuffer {
    pub id: DocumentId,
    pub data: Bytes,
    pub filename: String,
    pub size_bytes: u64,
    pub file_type: SupportedFileType,
    pub last_modified: Option<DateTime<Utc>>,
}

impl DocumentBuffer {
    pub fn new(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        let data = data.into();
        let size_bytes = data.len() as u64;
        Self::with_declared_size(data, filename, size_bytes)
    }

    pub fn with_declared_size(
        data: impl Into<Bytes>,
        filename: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        let data = data.into();
        let file_type = SupportedFileType::detect(&data);
        Self {
            id: DocumentId::new(),
            data,
            filename: filename.into(),
            size_bytes,
            file_type,
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Builds a sub-document (a chunk) that keeps this document's identity.
    pub fn derive(&self, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            id: self.id,
            size_bytes: data.len() as u64,
            file_type: SupportedFileType::detect(&data),
            data,
            filename: self.filename.clone(),
            last_modified: self.last_modified,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
