use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::error;

/// Argon2 time cost applied to every new hash.
pub const WORK_FACTOR: u32 = 10;

/// Exact length a password must have.
pub const REQUIRED_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("hashing not completed: {0}")]
    Hashing(String),
    #[error("password verification failed: {0}")]
    Verification(String),
}

/// A password that went through [`hash`]. Plaintext cannot be turned into this
/// type any other way, so whatever the store receives is always a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of the password policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCheck {
    pub valid: bool,
    pub message: &'static str,
}

fn hasher() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        WORK_FACTOR,
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|e| {
        error!(error = %e, "argon2 params error");
        CredentialError::Hashing(e.to_string())
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash(plain: &str) -> Result<HashedPassword, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            CredentialError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(HashedPassword(hash))
}

/// Cost parameters come from the stored PHC string, not from [`WORK_FACTOR`].
pub fn verify(plain: &str, hashed: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(hashed).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        CredentialError::Verification(e.to_string())
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "argon2 verify_password error");
            Err(CredentialError::Verification(e.to_string()))
        }
    }
}

/// Checks the password policy; the first rule that fails decides the message.
pub fn validate(plain: &str) -> PasswordCheck {
    lazy_static! {
        static ref LOWERCASE: Regex = Regex::new(r"[a-z]").unwrap();
        static ref UPPERCASE: Regex = Regex::new(r"[A-Z]").unwrap();
        static ref DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
    }

    // Exact equality, not a minimum.
    let message = if plain.chars().count() != REQUIRED_LENGTH {
        Some("Password must be 8 characters long")
    } else if !LOWERCASE.is_match(plain) {
        Some("Password must contain at least one lowercase letter")
    } else if !UPPERCASE.is_match(plain) {
        Some("Password must contain at least one uppercase letter")
    } else if !DIGIT.is_match(plain) {
        Some("Password must contain at least one digit")
    } else {
        None
    };

    match message {
        Some(message) => PasswordCheck {
            valid: false,
            message,
        },
        None => PasswordCheck {
            valid: true,
            message: "Password is valid",
        },
    }
}
