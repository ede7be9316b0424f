pub mod guesses;
pub mod player_sessions;
pub mod prelude;
pub mod rooms;
pub mod users;
