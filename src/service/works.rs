//! Works service
//!
//! Portfolio works with a cover image and an ordered detail gallery.

use std::sync::Arc;

use chrono::Utc;

use super::images;
use crate::data::{Database, EntityId, SortedCollection, Work};
use crate::error::AppError;
use crate::metrics::record_content_write;
use crate::storage::{Upload, UploadRelay};

/// Category value that means "no filter"
pub const ALL_CATEGORIES: &str = "All";

/// Fields accepted on create and update
///
/// `None` means "not supplied". On update, unsupplied fields keep their
/// stored value.
#[derive(Debug, Default)]
pub struct WorkInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sort_order: Option<i64>,
    /// JSON-encoded list of detail images to keep
    pub images_paths: Option<String>,
    pub image: Option<Upload>,
    pub images: Vec<Upload>,
}

fn required_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Work name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Works service
pub struct WorkService {
    db: Arc<Database>,
    relay: UploadRelay,
}

impl WorkService {
    pub fn new(db: Arc<Database>, relay: UploadRelay) -> Self {
        Self { db, relay }
    }

    /// List works, optionally restricted to one category
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Work>, AppError> {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);
        self.db.list_works(category).await
    }

    pub async fn get(&self, id: &str) -> Result<Work, AppError> {
        self.db.get_work(id).await?.ok_or(AppError::NotFound("Work"))
    }

    /// Create a work
    ///
    /// # Returns
    /// The new work's id
    ///
    /// # Errors
    /// `InvalidInput` when the name is missing or blank
    pub async fn create(&self, input: WorkInput) -> Result<String, AppError> {
        let name = required_name(input.name.as_deref().unwrap_or_default())?;

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
        let work = Work {
            id: EntityId::new().0,
            name,
            description: input.description.unwrap_or_default(),
            image,
            images,
            category: input.category.unwrap_or_default(),
            sort_order: input.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        self.db.insert_work(&work).await?;
        record_content_write("works", "create");
        tracing::info!(id = %work.id, name = %work.name, "Work created");
        Ok(work.id)
    }

    /// Update a work, keeping every field that was not supplied
    pub async fn update(&self, id: &str, input: WorkInput) -> Result<Work, AppError> {
        let mut work = self.get(id).await?;

        if let Some(name) = input.name.as_deref() {
            work.name = required_name(name)?;
        }
        if let Some(description) = input.description {
            work.description = description;
        }
        if let Some(category) = input.category {
            work.category = category;
        }
        if let Some(sort_order) = input.sort_order {
            work.sort_order = sort_order;
        }

        if let Some(image) = self.relay.store_optional("image", input.image).await {
            work.image = Some(image);
        }
        work.images = images::reconcile(
            &self.relay,
            "images",
            &work.images,
            input.images_paths.as_deref(),
            input.images,
            None,
        )
        .await;
        work.updated_at = Utc::now();

        if !self.db.update_work(&work).await? {
            return Err(AppError::NotFound("Work"));
        }
        record_content_write("works", "update");
        Ok(work)
    }

    /// Delete a work. Stored files are left in place.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.db.delete_work(id).await?;
        record_content_write("works", "delete");
        Ok(())
    }

    pub async fn reorder(&self, items: &serde_json::Value) -> Result<usize, AppError> {
        super::reorder::apply_sort_order(&self.db, SortedCollection::Works, items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockMediaStore;
    use tempfile::TempDir;

    async fn setup(store: MockMediaStore) -> (WorkService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        let relay = UploadRelay::new(Arc::new(store));
        (WorkService::new(Arc::new(db), relay), temp_dir)
    }

    fn echo_store() -> MockMediaStore {
        let mut store = MockMediaStore::new();
        store.expect_backend().return_const("mock");
        store
            .expect_store()
            .returning(|_, name, _| Ok(format!("/uploads/{name}")));
        store
    }

    fn jpeg(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8],
        }
    }

    #[tokio::test]
    async fn create_then_get_applies_defaults() {
        let (service, _temp_dir) = setup(echo_store()).await;

        let id = service
            .create(WorkInput {
                name: Some("  Harbor  ".to_string()),
                image: Some(jpeg("cover.jpg")),
                images: vec![jpeg("a.jpg"), jpeg("b.jpg")],
                ..Default::default()
            })
            .await
            .unwrap();

        let work = service.get(&id).await.unwrap();
        assert_eq!(work.name, "Harbor");
        assert_eq!(work.description, "");
        assert_eq!(work.category, "");
        assert_eq!(work.sort_order, 0);
        assert_eq!(work.image.as_deref(), Some("/uploads/cover.jpg"));
        assert_eq!(work.images, vec!["/uploads/a.jpg", "/uploads/b.jpg"]);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let mut store = MockMediaStore::new();
        store.expect_store().never();
        let (service, _temp_dir) = setup(store).await;

        for name in [None, Some("   ".to_string())] {
            let result = service
                .create(WorkInput {
                    name,
                    ..Default::default()
                })
                .await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn update_keeps_unsupplied_fields_and_reconciles_images() {
        let (service, _temp_dir) = setup(echo_store()).await;
        let id = service
            .create(WorkInput {
                name: Some("Harbor".to_string()),
                description: Some("Fog".to_string()),
                category: Some("Photo".to_string()),
                sort_order: Some(3),
                image: Some(jpeg("cover.jpg")),
                images: vec![jpeg("a.jpg"), jpeg("b.jpg")],
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &id,
                WorkInput {
                    images_paths: Some(r#"["/uploads/b.jpg"]"#.to_string()),
                    images: vec![jpeg("c.jpg")],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Harbor");
        assert_eq!(updated.description, "Fog");
        assert_eq!(updated.category, "Photo");
        assert_eq!(updated.sort_order, 3);
        assert_eq!(updated.image.as_deref(), Some("/uploads/cover.jpg"));
        assert_eq!(updated.images, vec!["/uploads/b.jpg", "/uploads/c.jpg"]);

        let blank = service
            .update(
                &id,
                WorkInput {
                    name: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(blank, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn failed_cover_upload_keeps_previous_cover() {
        let mut store = MockMediaStore::new();
        store.expect_backend().return_const("mock");
        store.expect_store().returning(|_, name, _| {
            if name == "new-cover.jpg" {
                Err(AppError::UploadFailed("backend down".to_string()))
            } else {
                Ok(format!("/uploads/{name}"))
            }
        });
        let (service, _temp_dir) = setup(store).await;

        let id = service
            .create(WorkInput {
                name: Some("Harbor".to_string()),
                image: Some(jpeg("cover.jpg")),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &id,
                WorkInput {
                    image: Some(jpeg("new-cover.jpg")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.image.as_deref(), Some("/uploads/cover.jpg"));
    }

    #[tokio::test]
    async fn update_missing_work_is_not_found() {
        let (service, _temp_dir) = setup(echo_store()).await;
        let result = service.update("missing", WorkInput::default()).await;
        assert!(matches!(result, Err(AppError::NotFound("Work"))));
    }

    #[tokio::test]
    async fn list_treats_all_as_no_filter() {
        let (service, _temp_dir) = setup(echo_store()).await;
        for (name, category) in [("a", "Photo"), ("b", "Design")] {
            service
                .create(WorkInput {
                    name: Some(name.to_string()),
                    category: Some(category.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        assert_eq!(service.list(None).await.unwrap().len(), 2);
        assert_eq!(service.list(Some("All")).await.unwrap().len(), 2);
        assert_eq!(service.list(Some("")).await.unwrap().len(), 2);
        let design = service.list(Some("Design")).await.unwrap();
        assert_eq!(design.len(), 1);
        assert_eq!(design[0].name, "b");
    }

    #[tokio::test]
    async fn delete_never_touches_media_store() {
        let mut store = MockMediaStore::new();
        store.expect_backend().return_const("mock");
        store
            .expect_store()
            .times(1)
            .returning(|_, name, _| Ok(format!("/uploads/{name}")));
        let (service, _temp_dir) = setup(store).await;

        let id = service
            .create(WorkInput {
                name: Some("Harbor".to_string()),
                image: Some(jpeg("cover.jpg")),
                ..Default::default()
            })
            .await
            .unwrap();

        service.delete(&id).await.unwrap();
        service.delete(&id).await.unwrap();
        assert!(matches!(
            service.get(&id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reorder_updates_valid_items_and_skips_the_rest() {
        let (service, _temp_dir) = setup(echo_store()).await;
        let first = service
            .create(WorkInput {
                name: Some("first".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = service
            .create(WorkInput {
                name: Some("second".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let items = serde_json::json!([
            {"id": first, "sort_order": 2},
            {"id": "does-not-exist", "sort_order": 0},
            {"id": second},
            {"sort_order": 9},
            {"id": second, "sort_order": 1},
        ]);
        assert_eq!(service.reorder(&items).await.unwrap(), 2);

        let names: Vec<String> = service
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);

        let not_array = service.reorder(&serde_json::json!({"id": first})).await;
        assert!(matches!(not_array, Err(AppError::InvalidInput(_))));
    }
}
