//! # Identity Repository
//!
//! Identity accounts: creation, authentication and the one-time passcode
//! flow behind password resets. Credential digests are salted SHA-256 and
//! every comparison is constant-time; the passcode never expires rows, its
//! validity is recomputed from the issuance timestamp at each check.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{self, Entity as User, UserRole};

/// Request data for creating a new identity account
#[derive(Debug, Clone)]
pub struct CreateIdentityRequest {
    /// Login name, unique across the deployment
    pub username: String,
    /// E-mail address, unique across the deployment
    pub email: String,
    /// Initial cleartext password
    pub password: String,
    /// Role tag for the account
    pub role: UserRole,
    /// Owning school; None only for global administrators
    pub school_id: Option<Uuid>,
}

/// Generates a random initial password for a provisioned account.
pub fn generate_password() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// Generates a 6-digit one-time passcode.
pub fn generate_passcode() -> String {
    format!("{:06}", thread_rng().gen_range(0..1_000_000))
}

/// Produces a salted digest in the stored `salt$digest` form.
pub fn hash_password(password: &str) -> String {
    let salt: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("{}${}", salt, digest_with_salt(&salt, password))
}

/// Constant-time check of a candidate password against a stored digest.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let computed = digest_with_salt(salt, candidate);
    ConstantTimeEq::ct_eq(computed.as_bytes(), digest.as_bytes()).into()
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `candidate` matches the outstanding passcode issued at
/// `issued_at`, evaluated against the validity window ending at
/// `issued_at + ttl`. Pure; called on every check, nothing is expired
/// proactively.
pub fn passcode_is_valid(
    stored: Option<&str>,
    issued_at: Option<DateTime<Utc>>,
    candidate: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> bool {
    let (Some(stored), Some(issued_at)) = (stored, issued_at) else {
        return false;
    };
    let matches: bool = ConstantTimeEq::ct_eq(stored.as_bytes(), candidate.as_bytes()).into();
    matches && now - issued_at <= ttl
}

/// Creates an identity on any connection (pool or transaction), so profile
/// creations can include it in their unit of work.
pub async fn create_identity_on<C: ConnectionTrait>(
    conn: &C,
    request: CreateIdentityRequest,
) -> Result<user::Model, RepositoryError> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_string();

    if username.is_empty() {
        return Err(RepositoryError::validation_error("Username is required"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(RepositoryError::validation_error(
            "A valid e-mail address is required",
        ));
    }
    if request.password.is_empty() {
        return Err(RepositoryError::validation_error("Password is required"));
    }

    let clash = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(username.clone()))
                .add(user::Column::Email.eq(email.clone())),
        )
        .one(conn)
        .await
        .map_err(RepositoryError::database_error)?;

    if let Some(existing) = clash {
        let field = if existing.username == username {
            "username"
        } else {
            "e-mail"
        };
        return Err(RepositoryError::DuplicateIdentity(format!(
            "An identity with this {} already exists",
            field
        )));
    }

    let now = Utc::now();
    let account = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        school_id: Set(request.school_id),
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(&request.password)),
        role: Set(request.role),
        otp_code: Set(None),
        otp_issued_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    account
        .insert(conn)
        .await
        .map_err(RepositoryError::database_error)
}

/// Repository for identity account operations
pub struct IdentityRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> IdentityRepository<'a> {
    /// Create a new IdentityRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a standalone identity (no role profile attached).
    pub async fn create_identity(
        &self,
        request: CreateIdentityRequest,
    ) -> Result<user::Model, RepositoryError> {
        create_identity_on(self.db, request).await
    }

    /// Look up an identity by its primary key.
    pub async fn get_by_id(&self, user_id: Uuid) -> Result<Option<user::Model>, RepositoryError> {
        User::find_by_id(user_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Authenticate by username and password.
    ///
    /// Returns `None` for an unknown username and for a wrong password
    /// alike; the caller cannot tell the two apart.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<user::Model>, RepositoryError> {
        let account = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(account.filter(|account| verify_password(&account.password_hash, password)))
    }

    /// Issue a fresh one-time passcode for the named identity, replacing
    /// any outstanding one. Returns the account and the cleartext code for
    /// delivery.
    pub async fn issue_passcode(
        &self,
        username: &str,
    ) -> Result<(user::Model, String), RepositoryError> {
        let account = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Unknown username".to_string()))?;

        let code = generate_passcode();
        let now = Utc::now();

        let mut active = account.into_active_model();
        active.otp_code = Set(Some(code.clone()));
        active.otp_issued_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());

        let updated = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok((updated, code))
    }

    /// Complete a password reset: the passcode must match and still be
    /// inside its validity window, after which it is cleared and the new
    /// credential stored.
    pub async fn reset_password(
        &self,
        username: &str,
        passcode: &str,
        new_password: &str,
        ttl: Duration,
    ) -> Result<user::Model, RepositoryError> {
        if new_password.is_empty() {
            return Err(RepositoryError::validation_error(
                "New password is required",
            ));
        }

        let account = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Unknown username".to_string()))?;

        let now = Utc::now();
        let valid = passcode_is_valid(
            account.otp_code.as_deref(),
            account.otp_issued_at.map(|dt| dt.with_timezone(&Utc)),
            passcode,
            ttl,
            now,
        );
        if !valid {
            return Err(RepositoryError::validation_error(
                "Passcode is invalid or has expired",
            ));
        }

        let mut active = account.into_active_model();
        active.password_hash = Set(hash_password(new_password));
        active.otp_code = Set(None);
        active.otp_issued_at = Set(None);
        active.updated_at = Set(now.into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip_verifies() {
        let hash = hash_password("hunter2");
        assert!(verify_password(&hash, "hunter2"));
        assert!(!verify_password(&hash, "hunter3"));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let first = hash_password("hunter2");
        let second = hash_password("hunter2");
        assert_ne!(first, second);
        assert!(verify_password(&first, "hunter2"));
        assert!(verify_password(&second, "hunter2"));
    }

    #[test]
    fn malformed_stored_digest_never_verifies() {
        assert!(!verify_password("no-separator", "anything"));
        assert!(!verify_password("", "anything"));
    }

    #[test]
    fn generated_passcode_is_six_digits() {
        for _ in 0..32 {
            let code = generate_passcode();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn passcode_validity_window() {
        let issued = Utc::now();
        let ttl = Duration::minutes(5);

        // Inside the window.
        assert!(passcode_is_valid(
            Some("123456"),
            Some(issued),
            "123456",
            ttl,
            issued + Duration::minutes(4),
        ));
        // Exactly at the boundary still counts.
        assert!(passcode_is_valid(
            Some("123456"),
            Some(issued),
            "123456",
            ttl,
            issued + Duration::minutes(5),
        ));
        // One second past the window does not.
        assert!(!passcode_is_valid(
            Some("123456"),
            Some(issued),
            "123456",
            ttl,
            issued + Duration::minutes(5) + Duration::seconds(1),
        ));
    }

    #[test]
    fn passcode_requires_exact_match_and_issuance() {
        let issued = Utc::now();
        let ttl = Duration::minutes(5);

        assert!(!passcode_is_valid(
            Some("123456"),
            Some(issued),
            "654321",
            ttl,
            issued
        ));
        assert!(!passcode_is_valid(None, Some(issued), "123456", ttl, issued));
        assert!(!passcode_is_valid(Some("123456"), None, "123456", ttl, issued));
    }
}
