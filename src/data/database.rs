//! SQLite database operations
//!
//! All database access goes through this module.
//! Ordered image lists live in the `images` child table and are
//! loaded alongside their owning rows.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqlitePool, Transaction};

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

/// Replace the ordered image list of one owner inside a transaction.
async fn replace_images(
    tx: &mut Transaction<'_, Sqlite>,
    collection: ImageCollection,
    owner_id: &str,
    references: &[String],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM images WHERE collection = ? AND owner_id = ?")
        .bind(collection.as_str())
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;

    for (position, reference) in references.iter().enumerate() {
        sqlx::query(
            "INSERT INTO images (collection, owner_id, position, reference) VALUES (?, ?, ?, ?)",
        )
        .bind(collection.as_str())
        .bind(owner_id)
        .bind(position as i64)
        .bind(reference)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn delete_images(
    tx: &mut Transaction<'_, Sqlite>,
    collection: ImageCollection,
    owner_id: &str,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM images WHERE collection = ? AND owner_id = ?")
        .bind(collection.as_str())
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
            }
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Ordered image references for one owner
    pub async fn get_images(
        &self,
        collection: ImageCollection,
        owner_id: &str,
    ) -> Result<Vec<String>, AppError> {
        let references = sqlx::query_scalar::<_, String>(
            "SELECT reference FROM images WHERE collection = ? AND owner_id = ? ORDER BY position ASC",
        )
        .bind(collection.as_str())
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(references)
    }

    /// Ordered image references for every owner in a collection
    async fn get_image_map(
        &self,
        collection: ImageCollection,
    ) -> Result<HashMap<String, Vec<String>>, AppError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT owner_id, reference FROM images WHERE collection = ? ORDER BY owner_id, position ASC",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (owner_id, reference) in rows {
            map.entry(owner_id).or_default().push(reference);
        }
        Ok(map)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Insert a user only when the table is empty.
    ///
    /// # Returns
    /// `true` if inserted, `false` if an account already existed.
    pub async fn insert_user_if_none(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            SELECT ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM users)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Get the most recently created profile row
    pub async fn get_profile(&self) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profile ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut profile) = profile else {
            return Ok(None);
        };
        profile.about_images = self
            .get_images(ImageCollection::ProfileAbout, &profile.id)
            .await?;
        Ok(Some(profile))
    }

    /// Insert or update the profile row and its about-images
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO profile (
                id, avatar, name, main_title, sub_title, hero_description,
                about_description, skills, wechat_qr, qq_qr, email, address,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                avatar = excluded.avatar,
                name = excluded.name,
                main_title = excluded.main_title,
                sub_title = excluded.sub_title,
                hero_description = excluded.hero_description,
                about_description = excluded.about_description,
                skills = excluded.skills,
                wechat_qr = excluded.wechat_qr,
                qq_qr = excluded.qq_qr,
                email = excluded.email,
                address = excluded.address,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.avatar)
        .bind(&profile.name)
        .bind(&profile.main_title)
        .bind(&profile.sub_title)
        .bind(&profile.hero_description)
        .bind(&profile.about_description)
        .bind(&profile.skills)
        .bind(&profile.wechat_qr)
        .bind(&profile.qq_qr)
        .bind(&profile.email)
        .bind(&profile.address)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        replace_images(
            &mut tx,
            ImageCollection::ProfileAbout,
            &profile.id,
            &profile.about_images,
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Works
    // =========================================================================

    /// List works by sort order, newest first within equal sort order
    ///
    /// # Arguments
    /// * `category` - Exact category to match, or `None` for all works
    pub async fn list_works(&self, category: Option<&str>) -> Result<Vec<Work>, AppError> {
        let mut works = match category {
            Some(category) => {
                sqlx::query_as::<_, Work>(
                    r#"
                    SELECT * FROM works
                    WHERE category = ?
                    ORDER BY sort_order ASC, created_at DESC, id DESC
                    "#,
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Work>(
                    "SELECT * FROM works ORDER BY sort_order ASC, created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut images = self.get_image_map(ImageCollection::Work).await?;
        for work in &mut works {
            work.images = images.remove(&work.id).unwrap_or_default();
        }
        Ok(works)
    }

    /// Get work by ID
    pub async fn get_work(&self, id: &str) -> Result<Option<Work>, AppError> {
        let work = sqlx::query_as::<_, Work>("SELECT * FROM works WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut work) = work else {
            return Ok(None);
        };
        work.images = self.get_images(ImageCollection::Work, &work.id).await?;
        Ok(Some(work))
    }

    /// Insert a new work and its detail images
    pub async fn insert_work(&self, work: &Work) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO works (
                id, name, description, image, category, sort_order, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&work.id)
        .bind(&work.name)
        .bind(&work.description)
        .bind(&work.image)
        .bind(&work.category)
        .bind(work.sort_order)
        .bind(work.created_at)
        .bind(work.updated_at)
        .execute(&mut *tx)
        .await?;

        replace_images(&mut tx, ImageCollection::Work, &work.id, &work.images).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Overwrite a work row and its detail images
    ///
    /// # Returns
    /// `true` if updated, `false` if the work no longer exists.
    pub async fn update_work(&self, work: &Work) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE works
            SET name = ?, description = ?, image = ?, category = ?, sort_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&work.name)
        .bind(&work.description)
        .bind(&work.image)
        .bind(&work.category)
        .bind(work.sort_order)
        .bind(work.updated_at)
        .bind(&work.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        replace_images(&mut tx, ImageCollection::Work, &work.id, &work.images).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a work row and its image list (uploaded files are untouched)
    pub async fn delete_work(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM works WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        delete_images(&mut tx, ImageCollection::Work, id).await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Thoughts
    // =========================================================================

    pub async fn list_thoughts(&self) -> Result<Vec<Thought>, AppError> {
        let mut thoughts = sqlx::query_as::<_, Thought>(
            "SELECT * FROM thoughts ORDER BY sort_order ASC, created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut images = self.get_image_map(ImageCollection::Thought).await?;
        for thought in &mut thoughts {
            thought.images = images.remove(&thought.id).unwrap_or_default();
        }
        Ok(thoughts)
    }

    pub async fn get_thought(&self, id: &str) -> Result<Option<Thought>, AppError> {
        let thought = sqlx::query_as::<_, Thought>("SELECT * FROM thoughts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut thought) = thought else {
            return Ok(None);
        };
        thought.images = self
            .get_images(ImageCollection::Thought, &thought.id)
            .await?;
        Ok(Some(thought))
    }

    pub async fn insert_thought(&self, thought: &Thought) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO thoughts (
                id, title, content, content_detail, image, views, sort_order,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&thought.id)
        .bind(&thought.title)
        .bind(&thought.content)
        .bind(&thought.content_detail)
        .bind(&thought.image)
        .bind(thought.views)
        .bind(thought.sort_order)
        .bind(thought.created_at)
        .bind(thought.updated_at)
        .execute(&mut *tx)
        .await?;

        replace_images(
            &mut tx,
            ImageCollection::Thought,
            &thought.id,
            &thought.images,
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Overwrite a thought row and its detail images
    ///
    /// The view counter is left alone so concurrent reads are not lost.
    pub async fn update_thought(&self, thought: &Thought) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE thoughts
            SET title = ?, content = ?, content_detail = ?, image = ?, sort_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&thought.title)
        .bind(&thought.content)
        .bind(&thought.content_detail)
        .bind(&thought.image)
        .bind(thought.sort_order)
        .bind(thought.updated_at)
        .bind(&thought.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        replace_images(
            &mut tx,
            ImageCollection::Thought,
            &thought.id,
            &thought.images,
        )
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Bump the view counter
    ///
    /// # Returns
    /// `true` if the thought exists.
    pub async fn increment_thought_views(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE thoughts SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_thought(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM thoughts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        delete_images(&mut tx, ImageCollection::Thought, id).await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Sort order
    // =========================================================================

    /// Set `sort_order` on a single row
    ///
    /// # Returns
    /// `true` if a row was updated, `false` for an unknown id.
    pub async fn set_sort_order(
        &self,
        collection: SortedCollection,
        id: &str,
        sort_order: i64,
    ) -> Result<bool, AppError> {
        // Table names come from a closed enum, never from input.
        let query = format!(
            "UPDATE {} SET sort_order = ?, updated_at = ? WHERE id = ?",
            collection.table()
        );

        let result = sqlx::query(&query)
            .bind(sort_order)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Gallery
    // =========================================================================

    pub async fn list_gallery(&self) -> Result<Vec<GalleryItem>, AppError> {
        let items = sqlx::query_as::<_, GalleryItem>(
            "SELECT * FROM gallery ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn get_gallery_item(&self, id: &str) -> Result<Option<GalleryItem>, AppError> {
        let item = sqlx::query_as::<_, GalleryItem>("SELECT * FROM gallery WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn insert_gallery_item(&self, item: &GalleryItem) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO gallery (id, name, description, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.image)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_gallery_item(&self, item: &GalleryItem) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE gallery
            SET name = ?, description = ?, image = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.image)
        .bind(item.updated_at)
        .bind(&item.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_gallery_item(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM gallery WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    pub async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn get_message(&self, id: &str) -> Result<Option<Message>, AppError> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    pub async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, name, email, message, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(&message.status)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update message status
    ///
    /// # Returns
    /// `true` if updated, `false` if no matching message exists.
    pub async fn update_message_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE messages SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_message(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Links
    // =========================================================================

    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        let links =
            sqlx::query_as::<_, Link>("SELECT * FROM links ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(links)
    }

    pub async fn get_link(&self, id: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>("SELECT * FROM links WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(link)
    }

    pub async fn insert_link(&self, link: &Link) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO links (id, name, url, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&link.id)
        .bind(&link.name)
        .bind(&link.url)
        .bind(link.created_at)
        .bind(link.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_link(&self, link: &Link) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET name = ?, url = ?, updated_at = ? WHERE id = ?")
            .bind(&link.name)
            .bind(&link.url)
            .bind(link.updated_at)
            .bind(&link.id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_link(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM links WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Test helpers
    // =========================================================================

    /// Overwrite `created_at` so ordering tests do not depend on the clock.
    #[doc(hidden)]
    pub async fn set_created_at_for_test(
        &self,
        table: SortedCollection,
        id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let query = format!("UPDATE {} SET created_at = ? WHERE id = ?", table.table());
        sqlx::query(&query)
            .bind(created_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
