pub mod attachment;
pub mod error;
pub mod job;
pub mod message;
pub mod package;
pub mod transcript;

pub use attachment::{AttachmentBlob, AttachmentSet};
pub use error::PackageError;
pub use job::ArchiveJob;
pub use message::{AttachmentRef, Author, Message};
pub use package::{ATTACHMENTS_DIR, ArchiveArtifact, TRANSCRIPT_ENTRY, package};
pub use transcript::{
    DEFAULT_TIMESTAMP_FORMAT, TranscriptBuilder, TranscriptDocument, build_transcript,
    escape_markup,
};
