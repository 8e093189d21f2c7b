use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Paragraph;

const PARAGRAPH_COLUMNS: &str = "paragraph_id, essay_id, paragraph_order, content, created_at";

pub struct ParagraphRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParagraphRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paragraphs of an essay in their stored order
    pub async fn list_by_essay(&self, essay_id: Uuid) -> Result<Vec<Paragraph>> {
        let mut conn = self.pool.acquire().await?;
        self.list_by_essay_in(&mut conn, essay_id).await
    }

    pub async fn count_by_essay(&self, essay_id: Uuid) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        self.count_by_essay_in(&mut conn, essay_id).await
    }

    /// Same as `list_by_essay`, on a caller-held connection or transaction
    pub async fn list_by_essay_in(
        &self,
        conn: &mut PgConnection,
        essay_id: Uuid,
    ) -> Result<Vec<Paragraph>> {
        let paragraphs = sqlx::query_as::<_, Paragraph>(&format!(
            r#"
            SELECT {PARAGRAPH_COLUMNS}
            FROM paragraphs
            WHERE essay_id = $1
            ORDER BY paragraph_order ASC
            "#
        ))
        .bind(essay_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(paragraphs)
    }

    pub async fn count_by_essay_in(&self, conn: &mut PgConnection, essay_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM paragraphs WHERE essay_id = $1")
                .bind(essay_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(count)
    }

    /// Appends a paragraph after the current last one.
    ///
    /// Callers hold the essay row lock (`EssayRepository::lock_for_update`)
    /// on the same transaction, which serializes appends per essay.
    pub async fn append(
        &self,
        conn: &mut PgConnection,
        essay_id: Uuid,
        content: &str,
    ) -> Result<Paragraph> {
        let paragraph = sqlx::query_as::<_, Paragraph>(&format!(
            r#"
            INSERT INTO paragraphs (essay_id, paragraph_order, content)
            SELECT $1, COALESCE(MAX(paragraph_order), 0) + 1, $2
            FROM paragraphs
            WHERE essay_id = $1
            RETURNING {PARAGRAPH_COLUMNS}
            "#
        ))
        .bind(essay_id)
        .bind(content)
        .fetch_one(&mut *conn)
        .await?;

        Ok(paragraph)
    }
}
