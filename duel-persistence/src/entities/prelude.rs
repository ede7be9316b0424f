pub use super::guesses::Entity as Guesses;
pub use super::player_sessions::Entity as PlayerSessions;
pub use super::rooms::Entity as Rooms;
pub use super::users::Entity as Users;
