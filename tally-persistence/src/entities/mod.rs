pub mod prelude;

pub mod aliases;
pub mod games;
pub mod players;
pub mod results;
