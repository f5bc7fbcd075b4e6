//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Image lists
// =============================================================================

/// Owner kind for rows in the ordered `images` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCollection {
    ProfileAbout,
    Work,
    Thought,
}

impl ImageCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileAbout => "profile_about",
            Self::Work => "works",
            Self::Thought => "thoughts",
        }
    }
}

/// Collections that carry an operator-controlled `sort_order`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortedCollection {
    Works,
    Thoughts,
}

impl SortedCollection {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Works => "works",
            Self::Thoughts => "thoughts",
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// Admin account used for login
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    /// bcrypt hash
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Profile
// =============================================================================

/// Site owner profile (single row)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub avatar: Option<String>,
    pub name: Option<String>,
    pub main_title: Option<String>,
    pub sub_title: Option<String>,
    pub hero_description: Option<String>,
    pub about_description: Option<String>,
    pub skills: Option<String>,
    /// At most five entries, in display order
    #[sqlx(skip)]
    pub about_images: Vec<String>,
    pub wechat_qr: Option<String>,
    pub qq_qr: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Empty profile that has not been stored yet
    pub fn blank(now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new().0,
            avatar: None,
            name: None,
            main_title: None,
            sub_title: None,
            hero_description: None,
            about_description: None,
            skills: None,
            about_images: Vec::new(),
            wechat_qr: None,
            qq_qr: None,
            email: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Works
// =============================================================================

/// Portfolio work
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Work {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Cover image reference
    pub image: Option<String>,
    /// Detail image references, in display order
    #[sqlx(skip)]
    pub images: Vec<String>,
    pub category: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Thoughts
// =============================================================================

/// Blog-style post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thought {
    pub id: String,
    pub title: String,
    /// Summary shown in listings
    pub content: String,
    pub content_detail: String,
    pub image: Option<String>,
    #[sqlx(skip)]
    pub images: Vec<String>,
    pub views: i64,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Gallery
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GalleryItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Messages
// =============================================================================

/// Contact form submission
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    /// Values: unread, read, replied
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Processing state of a contact message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Unread,
    Read,
    Replied,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Replied => "replied",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unread" => Some(Self::Unread),
            "read" => Some(Self::Read),
            "replied" => Some(Self::Replied),
            _ => None,
        }
    }
}

// =============================================================================
// Links
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Link {
    pub id: String,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
