mod file_outbox;

pub use file_outbox::{FileSubmissionOutbox, SubmissionEnvelope, DEFAULT_OUTBOX_DIR};
