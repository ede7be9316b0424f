use duel_types::RoomError;
use rand::Rng;

/// Secret codes and guesses are exactly this many decimal digits.
pub const CODE_LENGTH: usize = 4;

/// Room codes are short human-shareable identifiers, e.g. "K4QX".
pub const ROOM_CODE_LENGTH: usize = 4;

// Uppercase alphanumerics; room codes are typed by hand between friends.
const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Validate that `code` is exactly [`CODE_LENGTH`] decimal digits.
pub fn validate_code(code: &str) -> Result<(), RoomError> {
    if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RoomError::validation(format!(
            "Code must be exactly {} digits",
            CODE_LENGTH
        )));
    }
    Ok(())
}

/// Parse a validated code into its digits. Returns `None` if the input is
/// not exactly [`CODE_LENGTH`] decimal digits.
pub fn parse_code(code: &str) -> Option<[u8; CODE_LENGTH]> {
    if code.len() != CODE_LENGTH {
        return None;
    }
    let mut digits = [0u8; CODE_LENGTH];
    for (i, b) in code.bytes().enumerate() {
        if !b.is_ascii_digit() {
            return None;
        }
        digits[i] = b - b'0';
    }
    Some(digits)
}

/// Generate a random room code. Collisions are handled by the caller:
/// the room store regenerates on a unique-constraint violation.
pub fn generate_room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_CHARSET[rng.gen_range(0..ROOM_CODE_CHARSET.len())] as char)
        .collect()
}
