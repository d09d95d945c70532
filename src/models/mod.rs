pub mod books;
pub mod cache_store;
pub mod external;
pub mod responses;
pub mod storage;
