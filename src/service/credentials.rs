// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.
//!
//! bcrypt work and redb transactions both run on tokio's blocking pool.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{PasswordError, PasswordHasher, Role, TokenError, TokenIssuer};
use crate::storage::{run_blocking, Identity, IdentityRepository, StorageError, StorageResult};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of names and emails, in characters.
pub const MAX_FIELD_LENGTH: usize = 255;

/// Registration input.
#[derive(Clone)]
pub struct NewIdentity {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("hashing failure: {0}")]
    Hashing(#[from] PasswordError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown email or wrong password; the two are indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("hashing failure: {0}")]
    Hashing(#[from] PasswordError),

    #[error("token failure: {0}")]
    Token(#[from] TokenError),
}

/// Trim surrounding whitespace and lowercase. All lookups and the storage
/// uniqueness index use this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Shape check on a normalized email: one `@`, a non-empty local part, a
/// dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

impl NewIdentity {
    fn validate(&self) -> Result<(), RegistrationError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(RegistrationError::Validation(
                "full_name is required".to_string(),
            ));
        }
        if full_name.chars().count() > MAX_FIELD_LENGTH {
            return Err(RegistrationError::Validation(format!(
                "full_name must be at most {MAX_FIELD_LENGTH} characters"
            )));
        }

        let email = normalize_email(&self.email);
        if email.chars().count() > MAX_FIELD_LENGTH || !is_valid_email(&email) {
            return Err(RegistrationError::Validation(
                "email must be a valid email address".to_string(),
            ));
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RegistrationError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        Ok(())
    }
}

/// Orchestrates registration and login over the identity store.
pub struct CredentialService {
    identities: Arc<dyn IdentityRepository>,
    hasher: PasswordHasher,
    tokens: Arc<dyn TokenIssuer>,
}

impl CredentialService {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        hasher: PasswordHasher,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            identities,
            hasher,
            tokens,
        }
    }

    /// Register a new staff identity.
    pub async fn register(&self, input: NewIdentity) -> Result<Identity, RegistrationError> {
        input.validate()?;
        let email = normalize_email(&input.email);

        match self.find_by_email(email.clone()).await {
            Ok(_) => return Err(RegistrationError::DuplicateEmail),
            Err(StorageError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = self.hash_password(input.password).await?;

        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            full_name: input.full_name.trim().to_string(),
            email,
            password_hash,
            role: input.role,
            created_at: now,
            updated_at: now,
        };

        let identities = self.identities.clone();
        let record = identity.clone();
        match run_blocking(move || identities.create_identity(&record)).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration for the same email
            Err(StorageError::EmailTaken(_)) => return Err(RegistrationError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            identity_id = %identity.id,
            role = %identity.role,
            "Registered staff identity"
        );
        Ok(identity)
    }

    /// Authenticate with email and password and issue a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, LoginError> {
        let email = normalize_email(email);

        let identity = match self.find_by_email(email).await {
            Ok(identity) => Some(identity),
            Err(StorageError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        // Unknown emails are checked against the dummy hash so both failure
        // paths cost one bcrypt verification.
        let stored_hash = match &identity {
            Some(identity) => identity.password_hash.clone(),
            None => self.hasher.dummy_hash().to_string(),
        };
        let matches = self.verify_password(password.to_string(), stored_hash).await?;

        let identity = match identity {
            Some(identity) if matches => identity,
            _ => {
                tracing::debug!("Rejected login attempt");
                return Err(LoginError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(identity.id, identity.role)?;
        tracing::info!(identity_id = %identity.id, role = %identity.role, "Issued session token");
        Ok(token)
    }

    async fn find_by_email(&self, email: String) -> StorageResult<Identity> {
        let identities = self.identities.clone();
        run_blocking(move || identities.find_identity_by_email(&email)).await
    }

    async fn hash_password(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::MIN_COST, JwtIssuer};
    use crate::storage::{HospitalDb, StorageResult};
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        service: CredentialService,
        tokens: Arc<JwtIssuer>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(HospitalDb::open(&dir.path().join("test.redb")).unwrap());
        let tokens = Arc::new(JwtIssuer::new(b"credential-test-secret", Duration::hours(24)));
        let service = CredentialService::new(
            db,
            PasswordHasher::new(MIN_COST).unwrap(),
            tokens.clone(),
        );
        Fixture {
            service,
            tokens,
            _dir: dir,
        }
    }

    fn new_identity(email: &str, role: Role) -> NewIdentity {
        NewIdentity {
            full_name: "A Doctor".to_string(),
            email: email.to_string(),
            password: "longenough".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn register_returns_identity_with_supplied_role() {
        let f = fixture();
        for (email, role) in [("r@x.com", Role::Receptionist), ("d@x.com", Role::Doctor)] {
            let identity = f.service.register(new_identity(email, role)).await.unwrap();
            assert_eq!(identity.role, role);
            assert_eq!(identity.email, email);
            assert_ne!(identity.password_hash, "longenough");
            assert!(identity.password_hash.starts_with("$2b$"));
        }
    }

    #[tokio::test]
    async fn register_generates_distinct_ids() {
        let f = fixture();
        let a = f.service.register(new_identity("a@x.com", Role::Doctor)).await.unwrap();
        let b = f.service.register(new_identity("b@x.com", Role::Doctor)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn second_registration_with_same_email_is_duplicate() {
        let f = fixture();
        f.service
            .register(new_identity("a@x.com", Role::Doctor))
            .await
            .unwrap();

        let mut again = new_identity("a@x.com", Role::Receptionist);
        again.full_name = "Someone Else".to_string();
        again.password = "a-different-password".to_string();

        let result = f.service.register(again).await;
        assert!(matches!(result, Err(RegistrationError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn email_is_normalized_before_uniqueness_check() {
        let f = fixture();
        let identity = f
            .service
            .register(new_identity("  Mixed@Case.COM ", Role::Doctor))
            .await
            .unwrap();
        assert_eq!(identity.email, "mixed@case.com");

        let result = f
            .service
            .register(new_identity("mixed@case.com", Role::Doctor))
            .await;
        assert!(matches!(result, Err(RegistrationError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let f = fixture();

        let mut short = new_identity("a@x.com", Role::Doctor);
        short.password = "short".to_string();

        let mut unnamed = new_identity("b@x.com", Role::Doctor);
        unnamed.full_name = "   ".to_string();

        let bad_email = new_identity("not-an-email", Role::Doctor);
        let spaced_email = new_identity("a b@x.com", Role::Doctor);

        for input in [short, unnamed, bad_email, spaced_email] {
            let result = f.service.register(input).await;
            assert!(matches!(result, Err(RegistrationError::Validation(_))));
        }
    }

    #[test]
    fn email_shape_checks() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@ward.hospital.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@@x.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@x.com."));
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let f = fixture();
        let identity = f
            .service
            .register(new_identity("a@x.com", Role::Doctor))
            .await
            .unwrap();

        let token = f.service.login("a@x.com", "longenough").await.unwrap();
        assert!(!token.is_empty());

        let claims = f.tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, identity.id);
        assert_eq!(claims.role, Role::Doctor);
    }

    #[tokio::test]
    async fn login_normalizes_email() {
        let f = fixture();
        f.service
            .register(new_identity("a@x.com", Role::Doctor))
            .await
            .unwrap();

        assert!(f.service.login(" A@X.com", "longenough").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let f = fixture();
        f.service
            .register(new_identity("a@x.com", Role::Doctor))
            .await
            .unwrap();

        let wrong_password = f.service.login("a@x.com", "not-the-password").await;
        let unknown_email = f.service.login("ghost@x.com", "longenough").await;

        assert!(matches!(wrong_password, Err(LoginError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(LoginError::InvalidCredentials)));
        assert_eq!(
            wrong_password.unwrap_err().to_string(),
            unknown_email.unwrap_err().to_string()
        );
    }

    /// Identity store that fails every call with a storage error and counts
    /// lookups.
    #[derive(Default)]
    struct BrokenStore {
        lookups: AtomicUsize,
    }

    impl IdentityRepository for BrokenStore {
        fn create_identity(&self, _: &Identity) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::other("disk unavailable")))
        }

        fn find_identity_by_email(&self, _: &str) -> StorageResult<Identity> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Io(std::io::Error::other("disk unavailable")))
        }
    }

    fn broken_service(store: Arc<BrokenStore>) -> CredentialService {
        CredentialService::new(
            store,
            PasswordHasher::new(MIN_COST).unwrap(),
            Arc::new(JwtIssuer::new(b"secret", Duration::hours(24))),
        )
    }

    #[tokio::test]
    async fn lookup_failure_is_storage_error_not_duplicate() {
        let store = Arc::new(BrokenStore::default());
        let service = broken_service(store.clone());

        let result = service.register(new_identity("a@x.com", Role::Doctor)).await;
        assert!(matches!(result, Err(RegistrationError::Storage(_))));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn login_storage_failure_is_not_invalid_credentials() {
        let service = broken_service(Arc::new(BrokenStore::default()));

        let result = service.login("a@x.com", "longenough").await;
        assert!(matches!(result, Err(LoginError::Storage(_))));
    }

    /// Store whose email lookup misses but whose insert reports a taken email,
    /// as happens when two registrations race.
    struct RacingStore;

    impl IdentityRepository for RacingStore {
        fn create_identity(&self, identity: &Identity) -> StorageResult<()> {
            Err(StorageError::EmailTaken(identity.email.clone()))
        }

        fn find_identity_by_email(&self, email: &str) -> StorageResult<Identity> {
            Err(StorageError::NotFound(email.to_string()))
        }
    }

    #[tokio::test]
    async fn insert_conflict_maps_to_duplicate_email() {
        let service = CredentialService::new(
            Arc::new(RacingStore),
            PasswordHasher::new(MIN_COST).unwrap(),
            Arc::new(JwtIssuer::new(b"secret", Duration::hours(24))),
        );

        let result = service.register(new_identity("a@x.com", Role::Doctor)).await;
        assert!(matches!(result, Err(RegistrationError::DuplicateEmail)));
    }

    /// Store whose insert collides on the generated ID rather than the email.
    struct IdCollisionStore;

    impl IdentityRepository for IdCollisionStore {
        fn create_identity(&self, identity: &Identity) -> StorageResult<()> {
            Err(StorageError::AlreadyExists(format!("Identity {}", identity.id)))
        }

        fn find_identity_by_email(&self, email: &str) -> StorageResult<Identity> {
            Err(StorageError::NotFound(email.to_string()))
        }
    }

    #[tokio::test]
    async fn id_collision_is_storage_error_not_duplicate_email() {
        let service = CredentialService::new(
            Arc::new(IdCollisionStore),
            PasswordHasher::new(MIN_COST).unwrap(),
            Arc::new(JwtIssuer::new(b"secret", Duration::hours(24))),
        );

        let result = service.register(new_identity("a@x.com", Role::Doctor)).await;
        assert!(matches!(result, Err(RegistrationError::Storage(_))));
    }

    /// Fastest of a few runs, to smooth out scheduler noise.
    async fn fastest_login(service: &CredentialService, email: &str) -> std::time::Duration {
        let mut fastest = std::time::Duration::MAX;
        for _ in 0..3 {
            let started = std::time::Instant::now();
            let result = service.login(email, "not-the-password").await;
            assert!(matches!(result, Err(LoginError::InvalidCredentials)));
            fastest = fastest.min(started.elapsed());
        }
        fastest
    }

    #[tokio::test]
    async fn unknown_email_pays_for_a_bcrypt_verification() {
        // High enough that one verification dwarfs a redb lookup
        const COST: u32 = 8;

        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(HospitalDb::open(&dir.path().join("test.redb")).unwrap());
        let service = CredentialService::new(
            db,
            PasswordHasher::new(COST).unwrap(),
            Arc::new(JwtIssuer::new(b"secret", Duration::hours(24))),
        );
        service
            .register(new_identity("known@x.com", Role::Doctor))
            .await
            .unwrap();

        let wrong_password = fastest_login(&service, "known@x.com").await;
        let unknown_email = fastest_login(&service, "ghost@x.com").await;

        assert!(
            unknown_email * 4 >= wrong_password,
            "unknown email took {unknown_email:?}, wrong password took {wrong_password:?}"
        );
    }
}
