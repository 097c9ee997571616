use rand::Rng;

use crate::{errors::AppResult, repositories::TestRepository};

/// Code alphabet without the lookalike symbols 0/O and 1/I.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LENGTH: usize = 6;

const MAX_ATTEMPTS: usize = 5;
const FALLBACK_LENGTH: usize = 8;

/// Draw a random join code of the given length.
pub fn generate(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a join code that is free at the time of the check. After five
/// collisions the code grows to eight characters and is returned unchecked;
/// the unique index on the tests collection catches the residual collision.
pub async fn generate_unique(repository: &dyn TestRepository) -> AppResult<String> {
    for _ in 0..MAX_ATTEMPTS {
        let code = generate(CODE_LENGTH);
        if !repository.code_exists(&code).await? {
            return Ok(code);
        }
    }

    log::warn!(
        "Join code generation hit {} collisions, falling back to length {}",
        MAX_ATTEMPTS,
        FALLBACK_LENGTH
    );

    Ok(generate(FALLBACK_LENGTH))
}
