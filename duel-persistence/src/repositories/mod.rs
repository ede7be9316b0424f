pub mod guess_repository;
pub mod room_repository;
pub mod session_repository;
pub mod user_repository;

pub use guess_repository::GuessRepository;
pub use room_repository::RoomRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;

use sea_orm::{DbErr, SqlErr};

/// True when an insert bounced off a unique index. Callers use this to
/// regenerate room codes and to turn duplicate-join races into domain errors.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
