use crate::models::books::{Book, BookCreate, BookUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Book with ISBN {0} already exists")]
    DuplicateIsbn(String),
    #[error("Connection error: {0}")]
    Connection(String),
}

#[async_trait]
pub trait BookStore {
    async fn get_book(&self, book_id: i32) -> Result<Option<Book>, StorageError>;
    async fn list_books(&self, skip: i64, limit: i64) -> Result<Vec<Book>, StorageError>;
    async fn books_by_author(&self, author: &str) -> Result<Vec<Book>, StorageError>;
    async fn book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StorageError>;
    async fn create_book(&self, book: &BookCreate) -> Result<Book, StorageError>;
    async fn update_book(
        &self,
        book_id: i32,
        update: &BookUpdate,
    ) -> Result<Option<Book>, StorageError>;
    async fn delete_book(&self, book_id: i32) -> Result<bool, StorageError>;
    /// Case-insensitive substring match on title or author.
    async fn search_books(&self, query: &str) -> Result<Vec<Book>, StorageError>;
    async fn test_connection(&self) -> Result<(), StorageError>;
}

pub struct PostgresBookStore {
    pool: PgPool,
}

const BOOK_COLUMNS: &str = "id, title, author, year, isbn, created_at";

fn book_from_row(row: &PgRow) -> Book {
    Book {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        year: row.get::<Option<i32>, _>("year"),
        isbn: row.get("isbn"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn duplicate_or(err: sqlx::Error, isbn: &str) -> StorageError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StorageError::DuplicateIsbn(isbn.to_string())
        }
        other => StorageError::Postgres(other),
    }
}

fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl PostgresBookStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id SERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                author VARCHAR(255) NOT NULL,
                year INTEGER,
                isbn VARCHAR(20) NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_title ON books(title)")
            .execute(&pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_author ON books(author)")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl BookStore for PostgresBookStore {
    async fn get_book(&self, book_id: i32) -> Result<Option<Book>, StorageError> {
        let row = sqlx::query(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(book_from_row))
    }

    async fn list_books(&self, skip: i64, limit: i64) -> Result<Vec<Book>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books ORDER BY id OFFSET $1 LIMIT $2",
            BOOK_COLUMNS
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(book_from_row).collect())
    }

    async fn books_by_author(&self, author: &str) -> Result<Vec<Book>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE author ILIKE $1 ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(like_pattern(author))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(book_from_row).collect())
    }

    async fn book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StorageError> {
        let row = sqlx::query(&format!("SELECT {} FROM books WHERE isbn = $1", BOOK_COLUMNS))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(book_from_row))
    }

    async fn create_book(&self, book: &BookCreate) -> Result<Book, StorageError> {
        if self.book_by_isbn(&book.isbn).await?.is_some() {
            return Err(StorageError::DuplicateIsbn(book.isbn.clone()));
        }

        // The unique constraint still catches a concurrent insert of the same ISBN.
        let row = sqlx::query(&format!(
            "INSERT INTO books (title, author, year, isbn) VALUES ($1, $2, $3, $4) RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, &book.isbn))?;

        Ok(book_from_row(&row))
    }

    async fn update_book(
        &self,
        book_id: i32,
        update: &BookUpdate,
    ) -> Result<Option<Book>, StorageError> {
        let Some(current) = self.get_book(book_id).await? else {
            return Ok(None);
        };

        if let Some(ref isbn) = update.isbn {
            if *isbn != current.isbn && self.book_by_isbn(isbn).await?.is_some() {
                return Err(StorageError::DuplicateIsbn(isbn.clone()));
            }
        }

        let mut book = current;
        update.apply_to(&mut book);

        let row = sqlx::query(&format!(
            "UPDATE books SET title = $2, author = $3, year = $4, isbn = $5 WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year)
        .bind(&book.isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_or(e, &book.isbn))?;

        Ok(row.as_ref().map(book_from_row))
    }

    async fn delete_book(&self, book_id: i32) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search_books(&self, query: &str) -> Result<Vec<Book>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE title ILIKE $1 OR author ILIKE $1 ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(book_from_row).collect())
    }

    async fn test_connection(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryBooks {
    next_id: i32,
    books: Vec<Book>,
}

/// Non-persistent store for local runs and tests.
#[derive(Default)]
pub struct MemoryBookStore {
    inner: Mutex<MemoryBooks>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryBooks>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Connection("memory store lock poisoned".to_string()))
    }

    fn filter<F>(&self, predicate: F) -> Result<Vec<Book>, StorageError>
    where
        F: Fn(&Book) -> bool,
    {
        Ok(self
            .lock()?
            .books
            .iter()
            .filter(|book| predicate(book))
            .cloned()
            .collect())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn get_book(&self, book_id: i32) -> Result<Option<Book>, StorageError> {
        Ok(self.filter(|book| book.id == book_id)?.into_iter().next())
    }

    async fn list_books(&self, skip: i64, limit: i64) -> Result<Vec<Book>, StorageError> {
        let skip = usize::try_from(skip).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(self
            .lock()?
            .books
            .iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn books_by_author(&self, author: &str) -> Result<Vec<Book>, StorageError> {
        self.filter(|book| contains_ignore_case(&book.author, author))
    }

    async fn book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, StorageError> {
        Ok(self.filter(|book| book.isbn == isbn)?.into_iter().next())
    }

    async fn create_book(&self, book: &BookCreate) -> Result<Book, StorageError> {
        let mut inner = self.lock()?;

        if inner.books.iter().any(|existing| existing.isbn == book.isbn) {
            return Err(StorageError::DuplicateIsbn(book.isbn.clone()));
        }

        inner.next_id += 1;
        let created = Book {
            id: inner.next_id,
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year,
            isbn: book.isbn.clone(),
            created_at: Utc::now(),
        };
        inner.books.push(created.clone());

        Ok(created)
    }

    async fn update_book(
        &self,
        book_id: i32,
        update: &BookUpdate,
    ) -> Result<Option<Book>, StorageError> {
        let mut inner = self.lock()?;

        let Some(index) = inner.books.iter().position(|book| book.id == book_id) else {
            return Ok(None);
        };

        if let Some(ref isbn) = update.isbn {
            if inner
                .books
                .iter()
                .any(|existing| existing.id != book_id && existing.isbn == *isbn)
            {
                return Err(StorageError::DuplicateIsbn(isbn.clone()));
            }
        }

        let book = &mut inner.books[index];
        update.apply_to(book);
        Ok(Some(book.clone()))
    }

    async fn delete_book(&self, book_id: i32) -> Result<bool, StorageError> {
        let mut inner = self.lock()?;
        let before = inner.books.len();
        inner.books.retain(|book| book.id != book_id);
        Ok(inner.books.len() < before)
    }

    async fn search_books(&self, query: &str) -> Result<Vec<Book>, StorageError> {
        self.filter(|book| {
            contains_ignore_case(&book.title, query) || contains_ignore_case(&book.author, query)
        })
    }

    async fn test_connection(&self) -> Result<(), StorageError> {
        self.lock().map(|_| ())
    }
}
