use std::ops::{Bound, RangeBounds};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::Patch;
use super::validate::{max_len, not_blank};
use crate::error::DomainError;

/// Author used when a post is created without one.
pub const DEFAULT_AUTHOR: &str = "UBND Phường Móng Cái 1";

/// Post entity - a news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub thumbnail_url: Option<String>,
    pub author: String,
    pub is_featured: bool,
    pub is_urgent: bool,
    pub view_count: i32,
    pub published_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub const MAX_TITLE_LEN: usize = 300;
    pub const MAX_THUMBNAIL_URL_LEN: usize = 500;
    pub const MAX_AUTHOR_LEN: usize = 100;

    pub fn new(input: NewPost) -> Self {
        let now = Utc::now();
        let author = input
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            content: input.content,
            summary: input.summary,
            thumbnail_url: input.thumbnail_url,
            author,
            is_featured: input.is_featured.unwrap_or(false),
            is_urgent: input.is_urgent.unwrap_or(false),
            view_count: 0,
            published_at: input.published_at.unwrap_or(now),
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        not_blank("title", &self.title)?;
        not_blank("content", &self.content)?;
        max_len("title", Some(&self.title), Self::MAX_TITLE_LEN)?;
        max_len("thumbnailUrl", self.thumbnail_url.as_deref(), Self::MAX_THUMBNAIL_URL_LEN)?;
        max_len("author", Some(&self.author), Self::MAX_AUTHOR_LEN)?;
        Ok(())
    }
}

/// Create payload for a post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_urgent: Option<bool>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Partial update for a post. The view counter is not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostPatch {
    pub title: Patch<String>,
    pub content: Patch<String>,
    pub category_id: Patch<Uuid>,
    pub summary: Patch<String>,
    pub thumbnail_url: Patch<String>,
    pub author: Patch<String>,
    pub is_featured: Patch<bool>,
    pub is_urgent: Patch<bool>,
    pub published_at: Patch<DateTime<Utc>>,
}

impl PostPatch {
    /// Apply every field except `category_id`, which the service resolves.
    pub fn apply_to(self, post: &mut Post) -> Result<(), DomainError> {
        self.title.apply_required(&mut post.title, "title")?;
        self.content.apply_required(&mut post.content, "content")?;
        self.is_featured.apply_required(&mut post.is_featured, "isFeatured")?;
        self.is_urgent.apply_required(&mut post.is_urgent, "isUrgent")?;
        self.published_at.apply_required(&mut post.published_at, "publishedAt")?;
        match self.author {
            Patch::Absent => {}
            Patch::Null => post.author = DEFAULT_AUTHOR.to_string(),
            Patch::Value(author) if author.trim().is_empty() => {
                post.author = DEFAULT_AUTHOR.to_string()
            }
            Patch::Value(author) => post.author = author.trim().to_string(),
        }
        self.summary.apply(&mut post.summary);
        self.thumbnail_url.apply(&mut post.thumbnail_url);
        post.updated_at = Utc::now();
        Ok(())
    }
}

/// Sortable post columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    PublishedAt,
    CreatedAt,
    ViewCount,
    Title,
}

impl std::str::FromStr for PostSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publishedAt" => Ok(PostSort::PublishedAt),
            "createdAt" => Ok(PostSort::CreatedAt),
            "viewCount" => Ok(PostSort::ViewCount),
            "title" => Ok(PostSort::Title),
            other => Err(DomainError::validation(format!(
                "Cannot sort posts by '{other}'"
            ))),
        }
    }
}

/// Filter applied by post queries. All set criteria must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFilter {
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of title, content or summary.
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub urgent: Option<bool>,
    pub author: Option<String>,
    pub published: (Bound<DateTime<Utc>>, Bound<DateTime<Utc>>),
    /// Strictly greater-than view threshold.
    pub min_views_exclusive: Option<i32>,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            search: None,
            featured: None,
            urgent: None,
            author: None,
            published: (Bound::Unbounded, Bound::Unbounded),
            min_views_exclusive: None,
        }
    }
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_category(category_id: Uuid) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn featured() -> Self {
        Self {
            featured: Some(true),
            ..Self::default()
        }
    }

    pub fn urgent() -> Self {
        Self {
            urgent: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if self.category_id.is_some_and(|id| id != post.category_id) {
            return false;
        }
        if self.featured.is_some_and(|f| f != post.is_featured) {
            return false;
        }
        if self.urgent.is_some_and(|u| u != post.is_urgent) {
            return false;
        }
        if self.author.as_deref().is_some_and(|a| a != post.author) {
            return false;
        }
        if !self.published.contains(&post.published_at) {
            return false;
        }
        if self.min_views_exclusive.is_some_and(|min| post.view_count <= min) {
            return false;
        }
        if let Some(query) = &self.search {
            let query = query.to_lowercase();
            let hit = post.title.to_lowercase().contains(&query)
                || post.content.to_lowercase().contains(&query)
                || post
                    .summary
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Aggregate post counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub total_posts: u64,
    pub featured_posts: u64,
    pub urgent_posts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Post {
        Post::new(NewPost {
            title: "Thông báo lịch tiếp dân".to_string(),
            content: "Nội dung".to_string(),
            category_id: Uuid::new_v4(),
            summary: Some("Tóm tắt lịch".to_string()),
            thumbnail_url: None,
            author: Some("   ".to_string()),
            is_featured: None,
            is_urgent: Some(true),
            published_at: None,
        })
    }

    #[test]
    fn test_new_post_applies_defaults() {
        let post = sample();
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert!(!post.is_featured);
        assert!(post.is_urgent);
        assert_eq!(post.view_count, 0);
    }

    #[test]
    fn test_filter_published_bounds() {
        let post = sample();
        let mut filter = PostFilter::all();
        filter.published = (Bound::Excluded(post.published_at), Bound::Unbounded);
        assert!(!filter.matches(&post));

        filter.published = (
            Bound::Included(post.published_at - Duration::days(1)),
            Bound::Included(post.published_at),
        );
        assert!(filter.matches(&post));
    }

    #[test]
    fn test_filter_search_covers_summary() {
        let post = sample();
        let filter = PostFilter {
            search: Some("TÓM TẮT".to_string()),
            ..PostFilter::default()
        };
        assert!(filter.matches(&post));
    }

    #[test]
    fn test_patch_null_author_restores_default() {
        let mut post = sample();
        post.author = "Phòng Văn hóa".to_string();
        let patch = PostPatch {
            author: Patch::Null,
            ..PostPatch::default()
        };
        patch.apply_to(&mut post).unwrap();
        assert_eq!(post.author, DEFAULT_AUTHOR);
    }
}
