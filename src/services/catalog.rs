//! Catalog service: book search, detail and admin book management

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetails, BookQuery, CatalogFacets, CreateBook, UpdateBook},
        review,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with optional filters
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.search(query).await
    }

    /// Get a book with its review aggregate
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let ratings = self.repository.reviews.ratings_for_book(id).await?;

        Ok(BookDetails {
            book,
            average_rating: review::average_rating(&ratings),
        })
    }

    /// Catalog-wide aggregates for display
    pub async fn facets(&self) -> AppResult<CatalogFacets> {
        self.repository.books.facets().await
    }

    /// Create a new book (admin)
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    /// Update an existing book (admin)
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &update).await
    }

    /// Delete a book (admin). Refused while copies are out on loan.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
