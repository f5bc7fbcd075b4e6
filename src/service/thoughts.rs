//! Thoughts service
//!
//! Blog-style posts: summary, long-form detail, images and a view counter.

use std::sync::Arc;

use chrono::Utc;

use super::images;
use crate::data::{Database, EntityId, SortedCollection, Thought};
use crate::error::AppError;
use crate::metrics::record_content_write;
use crate::storage::{Upload, UploadRelay};

/// Fields accepted on create and update; `None` means "not supplied"
#[derive(Debug, Default)]
pub struct ThoughtInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_detail: Option<String>,
    pub sort_order: Option<i64>,
    pub images_paths: Option<String>,
    pub image: Option<Upload>,
    pub images: Vec<Upload>,
}

pub struct ThoughtService {
    db: Arc<Database>,
    relay: UploadRelay,
}

impl ThoughtService {
    pub fn new(db: Arc<Database>, relay: UploadRelay) -> Self {
        Self { db, relay }
    }

    pub async fn list(&self) -> Result<Vec<Thought>, AppError> {
        self.db.list_thoughts().await
    }

    pub async fn get(&self, id: &str) -> Result<Thought, AppError> {
        self.db
            .get_thought(id)
            .await?
            .ok_or(AppError::NotFound("Thought"))
    }

    /// Fetch a thought for a reader, counting the view
    pub async fn view(&self, id: &str) -> Result<Thought, AppError> {
        if !self.db.increment_thought_views(id).await? {
            return Err(AppError::NotFound("Thought"));
        }
        self.get(id).await
    }

    /// Create a thought; every field is optional
    pub async fn create(&self, input: ThoughtInput) -> Result<String, AppError> {
        let image = self.relay.store_optional("image", input.image).await;
        let images = images::reconcile(
            &self.relay,
            "images",
            &[],
            input.images_paths.as_deref(),
            input.images,
            None,
        )
        .await;

        let now = Utc::now();
        let thought = Thought {
            id: EntityId::new().0,
            title: input.title.unwrap_or_default(),
            content: input.content.unwrap_or_default(),
            content_detail: input.content_detail.unwrap_or_default(),
            image,
            images,
            views: 0,
            sort_order: input.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        self.db.insert_thought(&thought).await?;
        record_content_write("thoughts", "create");
        tracing::info!(id = %thought.id, title = %thought.title, "Thought created");
        Ok(thought.id)
    }

    pub async fn update(&self, id: &str, input: ThoughtInput) -> Result<Thought, AppError> {
        let mut thought = self.get(id).await?;

        if let Some(title) = input.title {
            thought.title = title;
        }
        if let Some(content) = input.content {
            thought.content = content;
        }
        if let Some(content_detail) = input.content_detail {
            thought.content_detail = content_detail;
        }
        if let Some(sort_order) = input.sort_order {
            thought.sort_order = sort_order;
        }

        if let Some(image) = self.relay.store_optional("image", input.image).await {
            thought.image = Some(image);
        }
        thought.images = images::reconcile(
            &self.relay,
            "images",
            &thought.images,
            input.images_paths.as_deref(),
            input.images,
            None,
        )
        .await;
        thought.updated_at = Utc::now();

        if !self.db.update_thought(&thought).await? {
            return Err(AppError::NotFound("Thought"));
        }
        record_content_write("thoughts", "update");
        Ok(thought)
    }

    /// Delete a thought. Stored files are left in place.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.db.delete_thought(id).await?;
        record_content_write("thoughts", "delete");
        Ok(())
    }

    pub async fn reorder(&self, items: &serde_json::Value) -> Result<usize, AppError> {
        super::reorder::apply_sort_order(&self.db, SortedCollection::Thoughts, items).await
    }
}
