use std::collections::BTreeMap;

use bytes::Bytes;

/// A downloaded attachment: its filename and raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentBlob {
    /// Filename the blob is stored under inside the archive.
    pub filename: String,
    /// Raw file content.
    pub data: Bytes,
}

impl AttachmentBlob {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// The set of attachments collected for one archive, keyed by filename.
///
/// Filenames are not disambiguated: inserting a blob whose filename is
/// already present replaces the earlier content. Iteration is in filename
/// order so that packaging is independent of download order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentSet {
    blobs: BTreeMap<String, Bytes>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a blob, returning the content it replaced (if any).
    pub fn insert(&mut self, blob: AttachmentBlob) -> Option<Bytes> {
        self.blobs.insert(blob.filename, blob.data)
    }

    pub fn get(&self, filename: &str) -> Option<&Bytes> {
        self.blobs.get(filename)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Total number of payload bytes held.
    pub fn total_bytes(&self) -> usize {
        self.blobs.values().map(Bytes::len).sum()
    }

    /// Iterate `(filename, data)` pairs in filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bytes)> {
        self.blobs.iter().map(|(name, data)| (name.as_str(), data))
    }
}

impl FromIterator<AttachmentBlob> for AttachmentSet {
    fn from_iter<I: IntoIterator<Item = AttachmentBlob>>(iter: I) -> Self {
        let mut set = Self::new();
        for blob in iter {
            set.insert(blob);
        }
        set
    }
}
