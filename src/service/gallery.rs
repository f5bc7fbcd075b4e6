//! Gallery service

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Database, EntityId, GalleryItem};
use crate::error::AppError;
use crate::metrics::record_content_write;
use crate::storage::{Upload, UploadRelay};

#[derive(Debug, Default)]
pub struct GalleryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<Upload>,
}

pub struct GalleryService {
    db: Arc<Database>,
    relay: UploadRelay,
}

impl GalleryService {
    pub fn new(db: Arc<Database>, relay: UploadRelay) -> Self {
        Self { db, relay }
    }

    pub async fn list(&self) -> Result<Vec<GalleryItem>, AppError> {
        self.db.list_gallery().await
    }

    pub async fn create(&self, input: GalleryInput) -> Result<String, AppError> {
        let image = self.relay.store_optional("image", input.image).await;
        let now = Utc::now();
        let item = GalleryItem {
            id: EntityId::new().0,
            name: input.name.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            image,
            created_at: now,
            updated_at: now,
        };

        self.db.insert_gallery_item(&item).await?;
        record_content_write("gallery", "create");
        Ok(item.id)
    }

    /// Update a gallery item
    ///
    /// An empty name keeps the stored one; an empty description clears it.
    pub async fn update(&self, id: &str, input: GalleryInput) -> Result<GalleryItem, AppError> {
        let mut item = self
            .db
            .get_gallery_item(id)
            .await?
            .ok_or(AppError::NotFound("Gallery item"))?;

        if let Some(name) = input.name.filter(|name| !name.is_empty()) {
            item.name = name;
        }
        if let Some(description) = input.description {
            item.description = description;
        }
        if let Some(image) = self.relay.store_optional("image", input.image).await {
            item.image = Some(image);
        }
        item.updated_at = Utc::now();

        if !self.db.update_gallery_item(&item).await? {
            return Err(AppError::NotFound("Gallery item"));
        }
        record_content_write("gallery", "update");
        Ok(item)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.db.delete_gallery_item(id).await?;
        record_content_write("gallery", "delete");
        Ok(())
    }
}
