//! External links shown in the site footer

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Database, EntityId, Link};
use crate::error::AppError;
use crate::metrics::record_content_write;

#[derive(Debug, Default, Clone)]
pub struct LinkInput {
    pub name: Option<String>,
    pub url: Option<String>,
}

pub struct LinkService {
    db: Arc<Database>,
}

impl LinkService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Link>, AppError> {
        self.db.list_links().await
    }

    pub async fn create(&self, input: LinkInput) -> Result<String, AppError> {
        let now = Utc::now();
        let link = Link {
            id: EntityId::new().0,
            name: input.name.unwrap_or_default(),
            url: input.url.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.db.insert_link(&link).await?;
        record_content_write("links", "create");
        Ok(link.id)
    }

    /// Update the supplied fields of a link
    pub async fn update(&self, id: &str, input: LinkInput) -> Result<Link, AppError> {
        let mut link = self
            .db
            .get_link(id)
            .await?
            .ok_or(AppError::NotFound("Link"))?;

        if let Some(name) = input.name {
            link.name = name;
        }
        if let Some(url) = input.url {
            link.url = url;
        }
        link.updated_at = Utc::now();

        if !self.db.update_link(&link).await? {
            return Err(AppError::NotFound("Link"));
        }
        record_content_write("links", "update");
        Ok(link)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.db.delete_link(id).await?;
        record_content_write("links", "delete");
        Ok(())
    }
}
