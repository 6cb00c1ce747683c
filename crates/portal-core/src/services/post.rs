use std::ops::Bound;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::require_category;
use crate::domain::{
    CategoryType, NewPost, Page, PageRequest, Patch, Post, PostFilter, PostPatch, PostSort,
    PostStats, Sort,
};
use crate::error::{DomainError, DomainResult};
use crate::ports::{CategoryRepository, PostRepository};

/// News articles.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    pub const DEFAULT_FEATURED_LIMIT: u64 = 3;
    pub const DEFAULT_CATEGORY_LATEST_LIMIT: u64 = 5;
    pub const DEFAULT_POPULAR_MIN_VIEWS: i32 = 10;
    pub const RECENT_WINDOW_DAYS: i64 = 30;

    pub fn new(posts: Arc<dyn PostRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { posts, categories }
    }

    pub async fn list(&self, request: PageRequest<PostSort>) -> DomainResult<Page<Post>> {
        self.page(PostFilter::all(), request).await
    }

    /// Fetch a post for public display and count the view.
    pub async fn view(&self, id: Uuid) -> DomainResult<Post> {
        if !self.posts.increment_view_count(id).await? {
            return Err(DomainError::not_found("Post", id));
        }
        debug!(post_id = %id, "View counted");
        self.preview(id).await
    }

    /// Fetch a post without touching the view counter.
    pub async fn preview(&self, id: Uuid) -> DomainResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn featured(&self, request: PageRequest<PostSort>) -> DomainResult<Page<Post>> {
        self.page(PostFilter::featured(), request).await
    }

    /// The `limit` most recently published featured posts.
    pub async fn latest_featured(&self, limit: u64) -> DomainResult<Vec<Post>> {
        self.newest(PostFilter::featured(), Some(limit)).await
    }

    pub async fn urgent(&self, request: PageRequest<PostSort>) -> DomainResult<Page<Post>> {
        self.page(PostFilter::urgent(), request).await
    }

    pub async fn urgent_all(&self) -> DomainResult<Vec<Post>> {
        self.newest(PostFilter::urgent(), None).await
    }

    pub async fn by_author(
        &self,
        author: &str,
        request: PageRequest<PostSort>,
    ) -> DomainResult<Page<Post>> {
        let filter = PostFilter {
            author: Some(author.trim().to_string()),
            ..PostFilter::default()
        };
        self.page(filter, request).await
    }

    pub async fn by_category(
        &self,
        category_id: Uuid,
        request: PageRequest<PostSort>,
    ) -> DomainResult<Page<Post>> {
        self.page(PostFilter::in_category(category_id), request)
            .await
    }

    /// Search title, content and summary. A blank query lists everything.
    pub async fn search(
        &self,
        query: &str,
        request: PageRequest<PostSort>,
    ) -> DomainResult<Page<Post>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(request).await;
        }
        let filter = PostFilter {
            search: Some(query.to_string()),
            ..PostFilter::default()
        };
        self.page(filter, request).await
    }

    /// Posts published strictly after `start`.
    pub async fn published_after(
        &self,
        start: DateTime<Utc>,
        request: PageRequest<PostSort>,
    ) -> DomainResult<Page<Post>> {
        let filter = PostFilter {
            published: (Bound::Excluded(start), Bound::Unbounded),
            ..PostFilter::default()
        };
        self.page(filter, request).await
    }

    /// Posts published within `[start, end]`.
    pub async fn published_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        request: PageRequest<PostSort>,
    ) -> DomainResult<Page<Post>> {
        if start > end {
            return Err(DomainError::validation("startDate must not be after endDate"));
        }
        let filter = PostFilter {
            published: (Bound::Included(start), Bound::Included(end)),
            ..PostFilter::default()
        };
        self.page(filter, request).await
    }

    /// Posts published within the last thirty days, newest first.
    pub async fn recent(&self) -> DomainResult<Vec<Post>> {
        let since = Utc::now() - Duration::days(Self::RECENT_WINDOW_DAYS);
        let filter = PostFilter {
            published: (Bound::Excluded(since), Bound::Unbounded),
            ..PostFilter::default()
        };
        self.newest(filter, None).await
    }

    /// Posts with more than `min_views` views, most viewed first.
    pub async fn popular(&self, min_views: i32) -> DomainResult<Vec<Post>> {
        let filter = PostFilter {
            min_views_exclusive: Some(min_views),
            ..PostFilter::default()
        };
        Ok(self
            .posts
            .list(&filter, Sort::desc(PostSort::ViewCount), None)
            .await?)
    }

    /// All posts ordered by views, ignoring the requested sort.
    pub async fn top_viewed(&self, page: u64, size: u64) -> DomainResult<Page<Post>> {
        let request = PageRequest::new(page, size, Sort::desc(PostSort::ViewCount))?;
        self.page(PostFilter::all(), request).await
    }

    pub async fn latest_in_category(
        &self,
        category_id: Uuid,
        limit: u64,
    ) -> DomainResult<Vec<Post>> {
        self.newest(PostFilter::in_category(category_id), Some(limit))
            .await
    }

    pub async fn stats(&self) -> DomainResult<PostStats> {
        Ok(PostStats {
            total_posts: self.posts.count(&PostFilter::all()).await?,
            featured_posts: self.posts.count(&PostFilter::featured()).await?,
            urgent_posts: self.posts.count(&PostFilter::urgent()).await?,
        })
    }

    pub async fn count_by_category(&self, category_id: Uuid) -> DomainResult<u64> {
        Ok(self
            .posts
            .count(&PostFilter::in_category(category_id))
            .await?)
    }

    pub async fn create(&self, input: NewPost) -> DomainResult<Post> {
        require_category(self.categories.as_ref(), input.category_id, CategoryType::Post).await?;

        let post = Post::new(input);
        post.validate()?;
        let post = self.posts.insert(post).await?;
        info!(post_id = %post.id, title = %post.title, "Post created");
        Ok(post)
    }

    pub async fn update(&self, id: Uuid, mut patch: PostPatch) -> DomainResult<Post> {
        let mut post = self.preview(id).await?;

        match std::mem::take(&mut patch.category_id) {
            Patch::Absent => {}
            Patch::Null => return Err(DomainError::validation("categoryId cannot be null")),
            Patch::Value(category_id) => {
                require_category(self.categories.as_ref(), category_id, CategoryType::Post)
                    .await?;
                post.category_id = category_id;
            }
        }

        patch.apply_to(&mut post)?;
        post.validate()?;
        let post = self.posts.update(post).await?;
        info!(post_id = %id, "Post updated");
        Ok(post)
    }

    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.posts.delete(id).await? {
            return Err(DomainError::not_found("Post", id));
        }
        info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.posts.exists(id).await?)
    }

    async fn page(
        &self,
        filter: PostFilter,
        request: PageRequest<PostSort>,
    ) -> DomainResult<Page<Post>> {
        Ok(self.posts.page(&filter, request).await?)
    }

    async fn newest(&self, filter: PostFilter, limit: Option<u64>) -> DomainResult<Vec<Post>> {
        Ok(self
            .posts
            .list(&filter, Sort::desc(PostSort::PublishedAt), limit)
            .await?)
    }
}
