//! Data models for Libris

pub mod author;
pub mod book;
pub mod category;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetails, NewBook};
pub use category::Category;
pub use loan::{LoanDetails, LoanRecord};
pub use user::{Capability, Role, User, UserClaims};
