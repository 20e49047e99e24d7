//! Deterministic zip packaging of a transcript and its attachments.

use std::io::{Cursor, Write};

use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::attachment::AttachmentSet;
use crate::error::PackageError;
use crate::transcript::TranscriptDocument;

/// Entry name of the transcript inside every archive.
pub const TRANSCRIPT_ENTRY: &str = "transcript.md";

/// Directory prefix for attachment entries.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// A packaged archive, held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveArtifact {
    bytes: Bytes,
}

impl ArchiveArtifact {
    /// MIME type of the container.
    pub const CONTENT_TYPE: &'static str = "application/zip";

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Every entry gets the same fixed metadata so identical inputs give
// byte-identical output.
fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Package `transcript` and `attachments` into a single zip container.
///
/// The transcript is always the first entry, at [`TRANSCRIPT_ENTRY`];
/// attachments follow in filename order under [`ATTACHMENTS_DIR`].
pub fn package(
    transcript: &TranscriptDocument,
    attachments: &AttachmentSet,
) -> Result<ArchiveArtifact, PackageError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    writer.start_file(TRANSCRIPT_ENTRY, entry_options())?;
    writer.write_all(transcript.as_str().as_bytes())?;

    for (filename, data) in attachments.iter() {
        writer.start_file(format!("{ATTACHMENTS_DIR}/{filename}"), entry_options())?;
        writer.write_all(data)?;
    }

    let cursor = writer.finish()?;
    Ok(ArchiveArtifact {
        bytes: Bytes::from(cursor.into_inner()),
    })
}
