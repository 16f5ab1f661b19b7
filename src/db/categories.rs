use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct CategoryStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub post_count: i64,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    uuid: String,
    name: String,
    slug: String,
    description: Option<String>,
    post_count: i64,
    created_at: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            name: row.name,
            slug: row.slug,
            description: row.description,
            post_count: row.post_count,
            created_at: row.created_at,
        }
    }
}

impl CategoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new category. Returns the category ID.
    pub async fn create(
        &self,
        uuid: &str,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO categories (uuid, name, slug, description) VALUES (?, ?, ?, ?)",
        )
        .bind(uuid)
        .bind(name)
        .bind(slug)
        .bind(description)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a category by slug, with its published-post count.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT c.id, c.uuid, c.name, c.slug, c.description,
                    (SELECT COUNT(*) FROM posts p WHERE p.category_id = c.id AND p.status = 'published') AS post_count,
                    c.created_at
             FROM categories c WHERE c.slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    /// List all categories with published-post counts, alphabetical.
    pub async fn list(&self) -> Result<Vec<Category>, sqlx::Error> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT c.id, c.uuid, c.name, c.slug, c.description,
                    (SELECT COUNT(*) FROM posts p WHERE p.category_id = c.id AND p.status = 'published') AS post_count,
                    c.created_at
             FROM categories c ORDER BY c.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}
