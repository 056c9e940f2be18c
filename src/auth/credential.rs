//! The single configured login credential.

use argon2::Argon2;
use password_hash::{PasswordHash, PasswordVerifier};

/// `user:secret`, where the secret is either a plain password or an argon2
/// PHC string (`$argon2id$...`).
#[derive(Clone)]
pub struct Credential {
    username: String,
    secret: Secret,
}

#[derive(Clone)]
enum Secret {
    Plain(String),
    Hashed(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Split on the first `:`. Returns `None` for an empty or malformed value.
    pub fn parse(raw: &str) -> Option<Self> {
        let (username, secret) = raw.split_once(':')?;
        if username.is_empty() || secret.is_empty() {
            return None;
        }
        let secret = if secret.starts_with("$argon2") {
            Secret::Hashed(secret.to_string())
        } else {
            Secret::Plain(secret.to_string())
        };
        Some(Self {
            username: username.to_string(),
            secret,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        if !constant_time_eq(username.as_bytes(), self.username.as_bytes()) {
            return false;
        }
        match &self.secret {
            Secret::Plain(expected) => constant_time_eq(password.as_bytes(), expected.as_bytes()),
            Secret::Hashed(phc) => match PasswordHash::new(phc) {
                Ok(hash) => Argon2::default()
                    .verify_password(password.as_bytes(), &hash)
                    .is_ok(),
                Err(e) => {
                    tracing::error!(error = %e, "Configured credential hash is not a valid PHC string");
                    false
                }
            },
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
