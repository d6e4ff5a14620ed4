//! Local authentication
//!
//! Accounts live in `accounts.json` and the active session in `session.json`,
//! both in the data directory. Secrets are stored as Argon2 hashes. The signed
//! in user's id scopes every persisted collection; without a session the
//! [`DEFAULT_OWNER`] scope is used.

use std::fs;
use std::path::{Path, PathBuf};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::storage::DEFAULT_OWNER;

pub const ACCOUNTS_FILE: &str = "accounts.json";
pub const SESSION_FILE: &str = "session.json";

/// Domain appended to bare user names
pub const LOCAL_DOMAIN: &str = "casebook.local";

/// Shortest accepted secret
pub const MIN_SECRET_LEN: usize = 6;

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHandle {
    pub id: EntityId,
    pub email: String,
    pub display_name: String,
}

impl UserHandle {
    pub fn owner_key(&self) -> String {
        self.id.to_string()
    }
}

/// Owner scope for collections: the user's id, or `default` when signed out
pub fn owner_key(user: Option<&UserHandle>) -> String {
    user.map(UserHandle::owner_key)
        .unwrap_or_else(|| DEFAULT_OWNER.to_string())
}

#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    #[error("'{0}' is not a valid e-mail address")]
    InvalidEmail(String),

    #[error("An account for '{0}' already exists")]
    #[diagnostic(help("sign in with `casebook auth login` instead"))]
    EmailTaken(String),

    #[error("Invalid e-mail or password")]
    InvalidCredentials,

    #[error("Password must be at least {} characters", MIN_SECRET_LEN)]
    WeakSecret,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt account file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sign-in collaborator
pub trait Authenticator {
    fn sign_in(&self, identifier: &str, secret: &str) -> Result<UserHandle, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<UserHandle>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    id: EntityId,
    email: String,
    display_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl Account {
    fn handle(&self) -> UserHandle {
        UserHandle {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user: UserHandle,
    signed_in_at: DateTime<Utc>,
}

/// Normalize a sign-in identifier to a lowercase e-mail address
///
/// A bare user name becomes `<name>@casebook.local`.
pub fn normalize_identifier(identifier: &str) -> Result<String, AuthError> {
    let id = identifier.trim().to_lowercase();
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail(identifier.to_string()));
    }
    match id.split_once('@') {
        None => Ok(format!("{}@{}", id, LOCAL_DOMAIN)),
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(id)
        }
        Some(_) => Err(AuthError::InvalidEmail(identifier.to_string())),
    }
}

fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_secret(secret: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// File-backed authenticator
pub struct LocalAuthenticator {
    dir: PathBuf,
}

impl LocalAuthenticator {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: data_dir.into(),
        }
    }

    fn accounts_path(&self) -> PathBuf {
        self.dir.join(ACCOUNTS_FILE)
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn load_accounts(&self) -> Result<Vec<Account>, AuthError> {
        let path = self.accounts_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_accounts(&self, accounts: &[Account]) -> Result<(), AuthError> {
        write_json(&self.accounts_path(), accounts)
    }

    /// Create an account and sign it in
    pub fn register(
        &self,
        email: &str,
        display_name: &str,
        secret: &str,
    ) -> Result<UserHandle, AuthError> {
        let email = normalize_identifier(email)?;
        if secret.chars().count() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret);
        }

        let mut accounts = self.load_accounts()?;
        if accounts.iter().any(|a| a.email == email) {
            return Err(AuthError::EmailTaken(email));
        }

        let display_name = if display_name.trim().is_empty() {
            email.split('@').next().unwrap_or_default().to_string()
        } else {
            display_name.trim().to_string()
        };
        let account = Account {
            id: EntityId::new(EntityPrefix::Usr),
            email,
            display_name,
            password_hash: hash_secret(secret)?,
            created_at: Utc::now(),
        };
        let handle = account.handle();
        accounts.push(account);
        self.save_accounts(&accounts)?;
        debug!(email = %handle.email, "account registered");

        self.start_session(&handle)?;
        Ok(handle)
    }

    fn start_session(&self, user: &UserHandle) -> Result<(), AuthError> {
        let session = Session {
            user: user.clone(),
            signed_in_at: Utc::now(),
        };
        write_json(&self.session_path(), &session)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl Authenticator for LocalAuthenticator {
    fn sign_in(&self, identifier: &str, secret: &str) -> Result<UserHandle, AuthError> {
        let email = normalize_identifier(identifier)?;
        let accounts = self.load_accounts()?;
        let account = accounts
            .iter()
            .find(|a| a.email == email)
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_secret(secret, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        let handle = account.handle();
        self.start_session(&handle)?;
        debug!(email = %handle.email, "signed in");
        Ok(handle)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn current_user(&self) -> Option<UserHandle> {
        let content = fs::read_to_string(self.session_path()).ok()?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) => Some(session.user),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(" Lan@Example.VN ").unwrap(), "lan@example.vn");
        assert_eq!(normalize_identifier("lan").unwrap(), "lan@casebook.local");
        assert!(normalize_identifier("@example.vn").is_err());
        assert!(normalize_identifier("lan@").is_err());
        assert!(normalize_identifier("a b@c.d").is_err());
        assert!(normalize_identifier("").is_err());
    }

    #[test]
    fn test_register_sign_out_sign_in() {
        let tmp = TempDir::new().unwrap();
        let auth = LocalAuthenticator::new(tmp.path());
        assert!(auth.current_user().is_none());

        let user = auth.register("lan@example.vn", "Lan", "secret-pass").unwrap();
        assert!(user.id.to_string().starts_with("USR-"));
        assert_eq!(auth.current_user(), Some(user.clone()));

        auth.sign_out().unwrap();
        assert!(auth.current_user().is_none());
        auth.sign_out().unwrap();

        let again = auth.sign_in("LAN@example.vn", "secret-pass").unwrap();
        assert_eq!(again, user);
        assert_eq!(owner_key(auth.current_user().as_ref()), user.id.to_string());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let tmp = TempDir::new().unwrap();
        let auth = LocalAuthenticator::new(tmp.path());
        auth.register("lan@example.vn", "", "secret-pass").unwrap();
        auth.sign_out().unwrap();

        assert!(matches!(
            auth.sign_in("lan@example.vn", "wrong-pass"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@example.vn", "secret-pass"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_register_validation() {
        let tmp = TempDir::new().unwrap();
        let auth = LocalAuthenticator::new(tmp.path());
        assert!(matches!(auth.register("a@b.c", "", "123"), Err(AuthError::WeakSecret)));
        let user = auth.register("a@b.c", "", "123456").unwrap();
        assert_eq!(user.display_name, "a");
        assert!(matches!(
            auth.register("A@B.C", "", "123456"),
            Err(AuthError::EmailTaken(_))
        ));
    }

    #[test]
    fn test_secret_is_not_stored_in_clear() {
        let tmp = TempDir::new().unwrap();
        let auth = LocalAuthenticator::new(tmp.path());
        auth.register("a@b.c", "", "plain-secret").unwrap();
        let stored = fs::read_to_string(tmp.path().join(ACCOUNTS_FILE)).unwrap();
        assert!(!stored.contains("plain-secret"));
        assert!(stored.contains("$argon2"));
    }

    #[test]
    fn test_signed_out_owner_is_default() {
        assert_eq!(owner_key(None), "default");
    }
}
