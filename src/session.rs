//! Session identity: who is playing and which shared game they join.

use anyhow::{bail, Result};
use rand::Rng;

const CODE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const CODE_LEN: usize = 6;

/// Generate a fresh 6-character base-36 session code
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalise a code typed by the player; `None` if nothing usable remains
pub fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub player_name: String,
    pub session_code: String,
}

impl SessionInfo {
    /// Join `code` if given, otherwise start a new session
    pub fn new(player_name: &str, code: Option<&str>) -> Result<Self> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            bail!("Player name must not be empty");
        }

        let session_code = match code {
            Some(raw) => match normalize_code(raw) {
                Some(code) => code,
                None => bail!("Game code must not be empty"),
            },
            None => generate_code(),
        };

        Ok(Self {
            player_name: player_name.to_string(),
            session_code,
        })
    }
}
