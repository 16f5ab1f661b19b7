use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct TagStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    uuid: String,
    name: String,
    slug: String,
    created_at: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

impl TagStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new tag. Returns the tag ID.
    pub async fn create(&self, uuid: &str, name: &str, slug: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO tags (uuid, name, slug) VALUES (?, ?, ?)")
            .bind(uuid)
            .bind(name)
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a tag by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>, sqlx::Error> {
        let row: Option<TagRow> = sqlx::query_as(
            "SELECT id, uuid, name, slug, created_at FROM tags WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Tag::from))
    }

    /// List all tags, alphabetical.
    pub async fn list(&self) -> Result<Vec<Tag>, sqlx::Error> {
        let rows: Vec<TagRow> =
            sqlx::query_as("SELECT id, uuid, name, slug, created_at FROM tags ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }
}

/// Tags attached to a post, alphabetical.
pub(super) async fn tags_for_post(pool: &SqlitePool, post_id: i64) -> Result<Vec<Tag>, sqlx::Error> {
    let rows: Vec<TagRow> = sqlx::query_as(
        "SELECT t.id, t.uuid, t.name, t.slug, t.created_at
         FROM tags t
         JOIN post_tags pt ON pt.tag_id = t.id
         WHERE pt.post_id = ?
         ORDER BY t.name",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Tag::from).collect())
}
