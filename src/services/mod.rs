pub mod books;
pub mod cache;
pub mod google_books;
pub mod transform;
