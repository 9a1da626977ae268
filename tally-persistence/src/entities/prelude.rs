pub use super::aliases::Entity as Aliases;
pub use super::games::Entity as Games;
pub use super::players::Entity as Players;
pub use super::results::Entity as Results;
