pub mod books;
pub mod external;
pub mod health;
