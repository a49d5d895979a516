//! Login credentials and password hashing (Argon2id, PHC strings with a random salt).

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::core::{ConsultantError, Result};

/// Login and password as supplied by the client. Both are trimmed and non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    login: String,
    password: String,
}

impl Credentials {
    pub fn new(login: &str, password: &str) -> Result<Self> {
        let login = login.trim();
        let password = password.trim();
        if login.is_empty() {
            return Err(ConsultantError::InvalidCredentials("empty login".to_string()));
        }
        if password.is_empty() {
            return Err(ConsultantError::InvalidCredentials("empty password".to_string()));
        }
        Ok(Self {
            login: login.to_string(),
            password: password.to_string(),
        })
    }

    /// Parses the legacy composite `login_password` key, split at the first `_`.
    pub fn parse_key(key: &str) -> Result<Self> {
        let (login, password) = key
            .split_once('_')
            .ok_or_else(|| ConsultantError::InvalidCredentials("expected login_password".to_string()))?;
        Self::new(login, password)
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Hashes `password` into a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ConsultantError::PasswordHash(e.to_string()))
}

/// True when `password` matches `phc_hash`. A malformed stored hash never verifies.
pub fn verify_password(password: &str, phc_hash: &str) -> bool {
    match PasswordHash::new(phc_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_are_trimmed() {
        let creds = Credentials::new("  alice ", " pw1 ").unwrap();
        assert_eq!(creds.login(), "alice");
        assert_eq!(creds.password(), "pw1");
    }

    #[test]
    fn empty_parts_are_rejected() {
        assert!(matches!(
            Credentials::new("", "pw"),
            Err(ConsultantError::InvalidCredentials(_))
        ));
        assert!(matches!(
            Credentials::new("alice", "   "),
            Err(ConsultantError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn parse_key_splits_at_first_underscore() {
        let creds = Credentials::parse_key("alice_pw1").unwrap();
        assert_eq!(creds.login(), "alice");
        assert_eq!(creds.password(), "pw1");

        let creds = Credentials::parse_key("bob_my_secret").unwrap();
        assert_eq!(creds.login(), "bob");
        assert_eq!(creds.password(), "my_secret");

        assert!(Credentials::parse_key("nounderscore").is_err());
        assert!(Credentials::parse_key("_pw").is_err());
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials::new("alice", "pw1").unwrap();
        let shown = format!("{:?}", creds);
        assert!(shown.contains("alice"));
        assert!(!shown.contains("pw1"));
    }

    #[test]
    fn hash_verifies_only_the_same_password() {
        let hash = hash_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pw1", &hash));
        assert!(!verify_password("pw2", &hash));
        assert!(!verify_password("pw1", "not-a-phc-string"));
        assert_ne!(hash, hash_password("pw1").unwrap());
    }
}
