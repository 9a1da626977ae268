pub mod alias;
pub mod ingest;
pub mod leaderboard;
pub mod parser;

// Re-export main components
pub use alias::*;
pub use ingest::*;
pub use leaderboard::*;
pub use parser::*;
