//! Profile service
//!
//! The site has a single profile row holding hero text, contact details,
//! QR codes and up to five "about" images.

use std::sync::Arc;

use chrono::Utc;

use super::images;
use crate::data::{Database, Profile};
use crate::error::AppError;
use crate::metrics::record_content_write;
use crate::storage::{Upload, UploadRelay};

/// Maximum number of about-section images
pub const MAX_ABOUT_IMAGES: usize = 5;

/// Profile edit; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub main_title: Option<String>,
    pub sub_title: Option<String>,
    pub hero_description: Option<String>,
    pub about_description: Option<String>,
    pub skills: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub about_images_paths: Option<String>,
    pub avatar: Option<Upload>,
    pub wechat_qr: Option<Upload>,
    pub qq_qr: Option<Upload>,
    pub about_images: Vec<Upload>,
}

/// Outcome of a profile save
#[derive(Debug)]
pub struct SavedProfile {
    pub profile: Profile,
    /// `true` when no profile existed before
    pub created: bool,
}

pub struct ProfileService {
    db: Arc<Database>,
    relay: UploadRelay,
}

impl ProfileService {
    pub fn new(db: Arc<Database>, relay: UploadRelay) -> Self {
        Self { db, relay }
    }

    pub async fn get(&self) -> Result<Option<Profile>, AppError> {
        self.db.get_profile().await
    }

    /// Create or update the profile
    pub async fn save(&self, input: ProfileInput) -> Result<SavedProfile, AppError> {
        let now = Utc::now();
        let existing = self.db.get_profile().await?;
        let created = existing.is_none();
        let mut profile = existing.unwrap_or_else(|| Profile::blank(now));

        let text_fields = [
            (&mut profile.name, input.name),
            (&mut profile.main_title, input.main_title),
            (&mut profile.sub_title, input.sub_title),
            (&mut profile.hero_description, input.hero_description),
            (&mut profile.about_description, input.about_description),
            (&mut profile.skills, input.skills),
            (&mut profile.email, input.email),
            (&mut profile.address, input.address),
        ];
        for (slot, value) in text_fields {
            if value.is_some() {
                *slot = value;
            }
        }

        let image_slots = [
            ("avatar", &mut profile.avatar, input.avatar),
            ("wechat_qr", &mut profile.wechat_qr, input.wechat_qr),
            ("qq_qr", &mut profile.qq_qr, input.qq_qr),
        ];
        for (name, slot, upload) in image_slots {
            if let Some(reference) = self.relay.store_optional(name, upload).await {
                *slot = Some(reference);
            }
        }

        profile.about_images = images::reconcile(
            &self.relay,
            "about_images",
            &profile.about_images,
            input.about_images_paths.as_deref(),
            input.about_images,
            Some(MAX_ABOUT_IMAGES),
        )
        .await;
        profile.updated_at = now;

        self.db.upsert_profile(&profile).await?;
        record_content_write("profile", if created { "create" } else { "update" });
        tracing::info!(id = %profile.id, created, "Profile saved");

        Ok(SavedProfile { profile, created })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::storage::MockMediaStore;
    use tempfile::TempDir;

    async fn setup(store: MockMediaStore) -> (ProfileService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        let relay = UploadRelay::new(Arc::new(store));
        (ProfileService::new(Arc::new(db), relay), temp_dir)
    }

    fn counting_store(calls: Arc<AtomicUsize>) -> MockMediaStore {
        let mut store = MockMediaStore::new();
        store.expect_backend().return_const("mock");
        store.expect_store().returning(move |_, name, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("/uploads/{name}"))
        });
        store
    }

    fn webp(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: "image/webp".to_string(),
            data: vec![1],
        }
    }

    #[tokio::test]
    async fn first_save_creates_then_updates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (service, _temp_dir) = setup(counting_store(calls)).await;
        assert!(service.get().await.unwrap().is_none());

        let first = service
            .save(ProfileInput {
                name: Some("Ada".to_string()),
                avatar: Some(webp("face.webp")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(first.created);

        let second = service
            .save(ProfileInput {
                email: Some("ada@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.profile.id, first.profile.id);
        assert_eq!(second.profile.name.as_deref(), Some("Ada"));
        assert_eq!(second.profile.avatar.as_deref(), Some("/uploads/face.webp"));
        assert_eq!(second.profile.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn about_images_are_capped_at_five_retained_first() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (service, _temp_dir) = setup(counting_store(calls.clone())).await;

        let first = service
            .save(ProfileInput {
                about_images: vec![
                    webp("r1.webp"),
                    webp("r2.webp"),
                    webp("r3.webp"),
                    webp("r4.webp"),
                ],
                ..Default::default()
            })
            .await
            .unwrap();
        let retained = first.profile.about_images.clone();
        assert_eq!(retained.len(), 4);

        let saved = service
            .save(ProfileInput {
                about_images_paths: Some(serde_json::to_string(&retained).unwrap()),
                about_images: vec![webp("n1.webp"), webp("n2.webp"), webp("n3.webp")],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            saved.profile.about_images,
            vec![
                "/uploads/r1.webp",
                "/uploads/r2.webp",
                "/uploads/r3.webp",
                "/uploads/r4.webp",
                "/uploads/n1.webp"
            ]
        );
        // Uploads that could not fit were never stored
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        let stored = service.get().await.unwrap().unwrap();
        assert_eq!(stored.about_images.len(), MAX_ABOUT_IMAGES);
    }

    #[tokio::test]
    async fn foreign_about_image_references_are_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (service, _temp_dir) = setup(counting_store(calls.clone())).await;

        let saved = service
            .save(ProfileInput {
                about_images_paths: Some(r#"["https://evil.example/x.png"]"#.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(saved.profile.about_images.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_qr_upload_keeps_previous_reference() {
        let mut store = MockMediaStore::new();
        store.expect_backend().return_const("mock");
        store.expect_store().returning(|_, name, _| {
            if name == "broken.png" {
                Err(AppError::UploadFailed("timeout".to_string()))
            } else {
                Ok(format!("/uploads/{name}"))
            }
        });
        let (service, _temp_dir) = setup(store).await;

        service
            .save(ProfileInput {
                wechat_qr: Some(webp("wechat.webp")),
                ..Default::default()
            })
            .await
            .unwrap();

        let saved = service
            .save(ProfileInput {
                wechat_qr: Some(Upload {
                    file_name: "broken.png".to_string(),
                    content_type: "image/png".to_string(),
                    data: vec![1],
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.profile.wechat_qr.as_deref(), Some("/uploads/wechat.webp"));
    }
}
