//! Data models for the bookstore

pub mod account;
pub mod author;
pub mod book;
pub mod genre;

// Re-export commonly used types
pub use account::{Account, Session};
pub use author::Author;
pub use book::Book;
pub use genre::Genre;
