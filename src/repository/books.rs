//! Books repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CatalogFacets, CreateBook, UpdateBook},
};

/// Columns selected for every book row; `available` is derived here so the
/// model never recomputes it.
const BOOK_COLUMNS: &str = "id, title, author, genre, description, quantity, available_copies, \
     (available_copies > 0) AS available, image_url, published_year, created_at, updated_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books. All filters are optional and combine with AND;
    /// results keep insertion order.
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref title) = query.title {
            params.push(format!("%{}%", title.to_lowercase()));
            conditions.push(format!("LOWER(title) LIKE ${}", params.len()));
        }
        if let Some(ref genre) = query.genre {
            params.push(genre.clone());
            conditions.push(format!("genre = ${}", params.len()));
        }
        if let Some(ref author) = query.author {
            params.push(author.clone());
            conditions.push(format!("author = ${}", params.len()));
        }
        if query.available == Some(true) {
            conditions.push("available_copies > 0".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM books{} ORDER BY id",
            BOOK_COLUMNS, where_clause
        );

        let mut q = sqlx::query_as::<_, Book>(&sql);
        for param in &params {
            q = q.bind(param);
        }

        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Catalog-wide aggregates, always computed from the full snapshot
    pub async fn facets(&self) -> AppResult<CatalogFacets> {
        let genres: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT genre FROM books ORDER BY genre")
                .fetch_all(&self.pool)
                .await?;

        let authors: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT author FROM books ORDER BY author")
                .fetch_all(&self.pool)
                .await?;

        let row = sqlx::query(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE available_copies > 0) AS available FROM books",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogFacets {
            genres,
            authors,
            total: row.get("total"),
            available: row.get("available"),
        })
    }

    /// Create a new book. All copies start available.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author, genre, description, quantity, available_copies, image_url, published_year)
            VALUES ($1, $2, $3, $4, $5, $5, $6, $7)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(book.quantity)
        .bind(&book.image_url)
        .bind(book.published_year)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book. A quantity change re-derives the available count
    /// from the number of copies currently out on loan.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1 FOR UPDATE",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let new_quantity = update.quantity.unwrap_or(current.quantity);
        // Outstanding loans are exactly quantity - available_copies.
        let outstanding = current.quantity - current.available_copies;
        if new_quantity < outstanding {
            return Err(AppError::Conflict(format!(
                "Cannot reduce quantity below {} copies currently on loan",
                outstanding
            )));
        }
        let new_available = new_quantity - outstanding;

        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $1, author = $2, genre = $3, description = $4,
                quantity = $5, available_copies = $6, image_url = $7,
                published_year = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(update.title.as_ref().unwrap_or(&current.title))
        .bind(update.author.as_ref().unwrap_or(&current.author))
        .bind(update.genre.as_ref().unwrap_or(&current.genre))
        .bind(update.description.as_ref().or(current.description.as_ref()))
        .bind(new_quantity)
        .bind(new_available)
        .bind(update.image_url.as_ref().or(current.image_url.as_ref()))
        .bind(update.published_year.or(current.published_year))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book. Refused while copies are out on loan; reviews and
    /// loan history go with the book.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let book = self.get_by_id(id).await?;

        if book.available_copies < book.quantity {
            return Err(AppError::Conflict(
                "Book has copies out on loan".to_string(),
            ));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Total books and available copies, for the back-office overview
    pub async fn counts(&self) -> AppResult<(i64, i64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS books, COALESCE(SUM(available_copies), 0)::bigint AS copies FROM books",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok((row.get("books"), row.get("copies")))
    }
}
