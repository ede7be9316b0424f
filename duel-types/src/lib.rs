pub mod errors;
pub mod requests;
pub mod room;
pub mod session;

// Re-export all types
pub use errors::*;
pub use requests::*;
pub use room::*;
pub use session::*;

/// Player identifiers are plain strings: registered users carry a UUID,
/// guests carry a `guest-` prefixed UUID minted at join time.
pub type PlayerId = String;
