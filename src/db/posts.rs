//! Post storage for blog entries.

use sqlx::sqlite::SqlitePool;

use super::tags::Tag;

#[derive(Clone)]
pub struct PostStore {
    pool: SqlitePool,
}

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "published" => PostStatus::Published,
            _ => PostStatus::Draft,
        }
    }
}

/// A full post with all content, joined with author and category.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub uuid: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author_id: i64,
    pub author_uuid: String,
    pub author_name: String,
    pub category_slug: Option<String>,
    pub featured: bool,
    pub status: PostStatus,
    pub reading_time: Option<i64>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A summary of a post for listing (without full content).
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub uuid: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author_name: String,
    pub category_slug: Option<String>,
    pub featured: bool,
    pub status: PostStatus,
    pub reading_time: Option<i64>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    uuid: String,
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    author_id: i64,
    author_uuid: String,
    author_name: String,
    category_slug: Option<String>,
    featured: bool,
    status: String,
    reading_time: Option<i64>,
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            author_id: row.author_id,
            author_uuid: row.author_uuid,
            author_name: row.author_name,
            category_slug: row.category_slug,
            featured: row.featured,
            status: PostStatus::from_str(&row.status),
            reading_time: row.reading_time,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    uuid: String,
    title: String,
    slug: String,
    excerpt: String,
    author_name: String,
    category_slug: Option<String>,
    featured: bool,
    status: String,
    reading_time: Option<i64>,
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<PostSummaryRow> for PostSummary {
    fn from(row: PostSummaryRow) -> Self {
        Self {
            uuid: row.uuid,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            author_name: row.author_name,
            category_slug: row.category_slug,
            featured: row.featured,
            status: PostStatus::from_str(&row.status),
            reading_time: row.reading_time,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new post. Returns the post ID.
    /// Published posts get `published_at` stamped at insert time.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        uuid: &str,
        title: &str,
        slug: &str,
        excerpt: &str,
        content: &str,
        author_id: i64,
        category_id: Option<i64>,
        featured: bool,
        status: PostStatus,
        reading_time: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO posts (uuid, title, slug, excerpt, content, author_id, category_id, featured, status, reading_time, published_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CASE WHEN ? = 'published' THEN datetime('now') ELSE NULL END)",
        )
        .bind(uuid)
        .bind(title)
        .bind(slug)
        .bind(excerpt)
        .bind(content)
        .bind(author_id)
        .bind(category_id)
        .bind(featured)
        .bind(status.as_str())
        .bind(reading_time)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a post by slug with author and category joined.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, sqlx::Error> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT p.id, p.uuid, p.title, p.slug, p.excerpt, p.content, p.author_id,
                    u.uuid AS author_uuid, u.name AS author_name, c.slug AS category_slug,
                    p.featured, p.status, p.reading_time, p.published_at, p.created_at, p.updated_at
             FROM posts p
             JOIN users u ON u.id = p.author_id
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Post::from))
    }

    /// List posts, newest first. With `include_drafts` false only published
    /// posts are returned.
    pub async fn list(&self, include_drafts: bool) -> Result<Vec<PostSummary>, sqlx::Error> {
        let filter = if include_drafts {
            ""
        } else {
            "WHERE p.status = 'published'"
        };
        let sql = format!(
            "SELECT p.uuid, p.title, p.slug, p.excerpt,
                    u.name AS author_name, c.slug AS category_slug,
                    p.featured, p.status, p.reading_time, p.published_at, p.created_at, p.updated_at
             FROM posts p
             JOIN users u ON u.id = p.author_id
             LEFT JOIN categories c ON c.id = p.category_id
             {}
             ORDER BY COALESCE(p.published_at, p.created_at) DESC",
            filter
        );
        let rows: Vec<PostSummaryRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(PostSummary::from).collect())
    }

    /// Update a post's content fields. First publication stamps `published_at`.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        excerpt: &str,
        content: &str,
        category_id: Option<i64>,
        featured: bool,
        status: PostStatus,
        reading_time: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE posts SET title = ?, excerpt = ?, content = ?, category_id = ?, featured = ?,
                    status = ?, reading_time = ?,
                    published_at = CASE WHEN ? = 'published' AND published_at IS NULL
                                        THEN datetime('now') ELSE published_at END,
                    updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(title)
        .bind(excerpt)
        .bind(content)
        .bind(category_id)
        .bind(featured)
        .bind(status.as_str())
        .bind(reading_time)
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post by ID.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the tag set attached to a post.
    pub async fn set_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Tags attached to a post, alphabetical.
    pub async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>, sqlx::Error> {
        super::tags::tags_for_post(&self.pool, post_id).await
    }
}
