//! # CSV Storage Implementation
//!
//! File-based storage using one CSV file per record type. Every repository
//! reads the whole file, works on the rows in memory and rewrites the file
//! atomically, which keeps the format trivially inspectable and editable.

pub mod category_repository;
pub mod connection;
pub mod share_repository;
pub mod transaction_repository;

pub use category_repository::CategoryRepository;
pub use connection::CsvConnection;
pub use share_repository::ShareRepository;
pub use transaction_repository::TransactionRepository;
