use rand::Rng;

pub const ROOM_CODE_LENGTH: usize = 6;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fresh shareable room code. The server assigns the authoritative room id;
/// this code only names the room locally until it answers.
pub fn generate_room_code(rng: &mut impl Rng) -> String {
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize typed room-code input: uppercase, whitespace dropped, truncated
/// to [`ROOM_CODE_LENGTH`]. Existence is for the server to decide.
pub fn normalize_room_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .take(ROOM_CODE_LENGTH)
        .collect()
}
