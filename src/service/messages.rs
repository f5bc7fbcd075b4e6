//! Contact messages
//!
//! Visitors submit messages publicly; the admin lists them, tracks their
//! status and deletes them.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Database, EntityId, Message, MessageStatus};
use crate::error::AppError;
use crate::metrics::{MESSAGES_RECEIVED_TOTAL, record_content_write};

/// A visitor submission before validation
#[derive(Debug, Default, Clone)]
pub struct NewMessage {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewMessage {
    /// Check required fields and the email shape
    ///
    /// # Errors
    /// `InvalidInput` if a field is missing or empty, or the email lacks
    /// `@` or `.`
    pub fn validate(self) -> Result<ValidMessage, AppError> {
        fn required(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        let (Some(name), Some(email), Some(message)) = (
            required(self.name),
            required(self.email),
            required(self.message),
        ) else {
            return Err(AppError::InvalidInput(
                "name, email and message are required".to_string(),
            ));
        };

        if !email.contains('@') || !email.contains('.') {
            return Err(AppError::InvalidInput("Invalid email address".to_string()));
        }

        Ok(ValidMessage {
            name,
            email,
            message,
        })
    }
}

pub struct MessageService {
    db: Arc<Database>,
}

impl MessageService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a validated submission with status `unread`
    pub async fn submit(&self, input: ValidMessage) -> Result<String, AppError> {
        let message = Message {
            id: EntityId::new().0,
            name: input.name,
            email: input.email,
            message: input.message,
            status: MessageStatus::Unread.as_str().to_string(),
            created_at: Utc::now(),
        };

        self.db.insert_message(&message).await?;
        record_content_write("messages", "create");
        tracing::info!(id = %message.id, "Contact message received");
        Ok(message.id)
    }

    pub async fn list(&self) -> Result<Vec<Message>, AppError> {
        self.db.list_messages().await
    }

    /// Set a message's status
    ///
    /// # Errors
    /// `InvalidInput` for an unknown status, `NotFound` for an unknown id
    pub async fn set_status(&self, id: &str, status: Option<&str>) -> Result<(), AppError> {
        let status = status.and_then(MessageStatus::parse).ok_or_else(|| {
            AppError::InvalidInput("status must be one of unread, read, replied".to_string())
        })?;

        if !self.db.update_message_status(id, status).await? {
            return Err(AppError::NotFound("Message"));
        }
        record_content_write("messages", "update");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.db.delete_message(id).await?;
        record_content_write("messages", "delete");
        Ok(())
    }
}

/// Count a submission attempt by outcome
pub fn record_submission(outcome: &str) {
    MESSAGES_RECEIVED_TOTAL.with_label_values(&[outcome]).inc();
}
