//! Inbound multipart parsing.
//!
//! Text fields are buffered in memory. File parts are streamed chunk by chunk
//! into temporary files so the per-file ceiling is enforced before the whole
//! attachment is held anywhere. Each temporary file is removed when its
//! [`Attachment`] is dropped, whichever way the request ends.

use std::path::Path;

use axum::extract::multipart::{Field, Multipart, MultipartError};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::config::LimitsConfig;
use crate::relay::error::RelayError;

/// A file part received from the client, spooled to disk.
#[derive(Debug)]
pub struct Attachment {
    /// Filename as declared by the client.
    pub file_name: String,
    /// Content type as declared by the client.
    pub content_type: Option<String>,
    /// Number of bytes spooled.
    pub size: u64,
    spool: NamedTempFile,
}

impl Attachment {
    /// Location of the spooled content.
    pub fn path(&self) -> &Path {
        self.spool.path()
    }

    /// Open the spooled content for reading.
    pub async fn open(&self) -> std::io::Result<tokio::fs::File> {
        tokio::fs::File::open(self.spool.path()).await
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> Self {
        use std::io::Write;

        let mut spool = NamedTempFile::new().unwrap();
        spool.write_all(bytes).unwrap();
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_owned),
            size: bytes.len() as u64,
            spool,
        }
    }
}

/// Text fields and attachments of one client submission, in arrival order.
#[derive(Debug, Default)]
pub struct IncomingSubmission {
    fields: Vec<(String, String)>,
    attachments: Vec<Attachment>,
}

impl IncomingSubmission {
    /// Drain `multipart` into a submission, enforcing `limits`.
    pub async fn parse(multipart: &mut Multipart, limits: &LimitsConfig) -> Result<Self, RelayError> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_owned);
                    let (spool, size) = spool_field(field, &file_name, limits).await?;

                    // An empty file input still submits a nameless, empty part.
                    if file_name.is_empty() && size == 0 {
                        tracing::debug!(field = %name, "Skipping empty file part");
                        continue;
                    }

                    if submission.attachments.len() >= limits.max_files {
                        return Err(RelayError::BadRequest(format!(
                            "Too many attachments (maximum {}).",
                            limits.max_files
                        )));
                    }

                    submission.attachments.push(Attachment {
                        file_name,
                        content_type,
                        size,
                        spool,
                    });
                }
                None => {
                    let value = field.text().await.map_err(malformed)?;
                    submission.insert_field(name, value);
                }
            }
        }

        Ok(submission)
    }

    /// Record a text field. The first value for a repeated name wins.
    pub fn insert_field(&mut self, name: String, value: String) {
        if self.field(&name).is_none() {
            self.fields.push((name, value));
        }
    }

    /// Look up a text field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    #[cfg(test)]
    pub(crate) fn push_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<Attachment>) {
        (self.fields, self.attachments)
    }
}

/// Stream one file part into a fresh temporary file.
async fn spool_field(
    mut field: Field<'_>,
    file_name: &str,
    limits: &LimitsConfig,
) -> Result<(NamedTempFile, u64), RelayError> {
    let spool = match &limits.spool_dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(RelayError::Parse)?;

    let handle = spool.as_file().try_clone().map_err(RelayError::Parse)?;
    let mut file = tokio::fs::File::from_std(handle);
    let mut size: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        size += chunk.len() as u64;
        if size > limits.max_file_bytes {
            return Err(RelayError::BadRequest(format!(
                "Attachment '{}' exceeds the {} byte limit.",
                file_name, limits.max_file_bytes
            )));
        }
        file.write_all(&chunk).await.map_err(RelayError::Parse)?;
    }
    file.flush().await.map_err(RelayError::Parse)?;

    Ok((spool, size))
}

fn malformed(err: MultipartError) -> RelayError {
    RelayError::BadRequest(format!("Failed to parse form data: {}", err.body_text()))
}
