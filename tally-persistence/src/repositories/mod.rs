pub mod alias_repository;
pub mod result_repository;

pub use alias_repository::AliasRepository;
pub use result_repository::{ClearOptions, ResultRepository, TableCounts};
