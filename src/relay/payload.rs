//! Outbound payload construction.
//!
//! The webhook expects the structured message in a single text field and the
//! attachments as `file0`, `file1`, … in client order.

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;

use crate::config::schema::RelayRulesConfig;
use crate::relay::error::RelayError;
use crate::relay::submission::{Attachment, IncomingSubmission};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One renamed file part.
#[derive(Debug)]
pub struct OutboundFile {
    /// Part name on the wire (`file{index}`).
    pub part_name: String,
    pub file_name: String,
    pub content_type: String,
    attachment: Attachment,
}

/// The multipart body sent to the webhook.
#[derive(Debug)]
pub struct OutboundPayload {
    pub message_field: String,
    pub message: String,
    pub extra_fields: Vec<(String, String)>,
    pub files: Vec<OutboundFile>,
}

impl OutboundPayload {
    /// Build the payload, taking ownership of the spooled attachments.
    ///
    /// Fails with `BadRequest` when the message field is missing, or is not
    /// JSON while `require_json_message` is set.
    pub fn from_submission(
        submission: IncomingSubmission,
        rules: &RelayRulesConfig,
    ) -> Result<Self, RelayError> {
        let (fields, attachments) = submission.into_parts();

        let mut message = None;
        let mut extra_fields = Vec::new();
        for (name, value) in fields {
            if name == rules.message_field {
                message = Some(value);
            } else if rules.forward_extra_fields {
                extra_fields.push((name, value));
            }
        }

        let message = message.ok_or_else(|| {
            RelayError::BadRequest(format!("Missing required field '{}'.", rules.message_field))
        })?;

        if rules.require_json_message {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(&message) {
                return Err(RelayError::BadRequest(format!(
                    "Field '{}' is not valid JSON: {}",
                    rules.message_field, e
                )));
            }
        }

        let files = attachments
            .into_iter()
            .enumerate()
            .map(|(index, attachment)| OutboundFile {
                part_name: format!("file{}", index),
                file_name: if attachment.file_name.is_empty() {
                    format!("uploaded_file_{}", index)
                } else {
                    attachment.file_name.clone()
                },
                content_type: attachment
                    .content_type
                    .clone()
                    .filter(|ct| !ct.is_empty())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
                attachment,
            })
            .collect();

        Ok(Self {
            message_field: rules.message_field.clone(),
            message,
            extra_fields,
            files,
        })
    }

    /// Part names in wire order.
    pub fn part_names(&self) -> Vec<&str> {
        std::iter::once(self.message_field.as_str())
            .chain(self.extra_fields.iter().map(|(name, _)| name.as_str()))
            .chain(self.files.iter().map(|f| f.part_name.as_str()))
            .collect()
    }

    /// Encode as a multipart form. File parts stream from the spool files,
    /// which must stay on disk until the form has been sent; they are
    /// removed when the payload is dropped.
    pub async fn to_form(&self) -> Result<Form, RelayError> {
        let mut form = Form::new().text(self.message_field.clone(), self.message.clone());

        for (name, value) in &self.extra_fields {
            form = form.text(name.clone(), value.clone());
        }

        for file in &self.files {
            let part = match file.stream_part().await?.mime_str(&file.content_type) {
                Ok(part) => part,
                Err(_) => {
                    tracing::debug!(
                        file_name = %file.file_name,
                        content_type = %file.content_type,
                        "Unparseable content type, sending as {}",
                        DEFAULT_CONTENT_TYPE
                    );
                    file.stream_part()
                        .await?
                        .mime_str(DEFAULT_CONTENT_TYPE)
                        .map_err(RelayError::Network)?
                }
            };
            form = form.part(file.part_name.clone(), part);
        }

        Ok(form)
    }
}

impl OutboundFile {
    /// A part that streams the spooled content instead of buffering it.
    async fn stream_part(&self) -> Result<Part, RelayError> {
        let spool = self.attachment.open().await.map_err(RelayError::Parse)?;
        let body = Body::wrap_stream(ReaderStream::new(spool));
        Ok(Part::stream_with_length(body, self.attachment.size).file_name(self.file_name.clone()))
    }
}
