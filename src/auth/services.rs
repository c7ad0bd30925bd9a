use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::{
    dto::{LoginRequest, RegisterRequest},
    error::AuthError,
    jwt::JwtKeys,
    password::{hash_password, hash_password_async, verify_password_async},
    repo::UserStore,
    repo_types::{NewUser, User},
};

pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    // Dot-separated local atoms; domain labels of letters, digits and inner hyphens;
    // alphabetic TLD of two or more letters.
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$"
    )
    .unwrap();

    // Verified against on unknown emails so both login failures cost one Argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("rsvp-no-such-user").ok();
}

/// A freshly authenticated user and the token the caller must put in the session cookie.
#[derive(Debug)]
pub struct AuthOutcome {
    pub token: String,
    pub user: User,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub async fn register(
    store: &dyn UserStore,
    keys: &JwtKeys,
    input: RegisterRequest,
) -> Result<AuthOutcome, AuthError> {
    if !is_valid_email(&input.email) {
        warn!(email = %input.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AuthError::WeakPassword);
    }

    if store.find_by_email(&input.email).await?.is_some() {
        warn!(email = %input.email, "email already registered");
        return Err(AuthError::DuplicateEmail);
    }

    let password_hash = hash_password_async(input.password)
        .await
        .map_err(AuthError::Internal)?;

    // a concurrent registration can still win the insert; the store reports it as a duplicate
    let user = store
        .create(NewUser {
            email: input.email,
            password_hash,
            name: input.name,
        })
        .await?;

    let token = keys.issue(user.id, &user.email).map_err(AuthError::Internal)?;
    Ok(AuthOutcome { token, user })
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    input: LoginRequest,
) -> Result<AuthOutcome, AuthError> {
    if !is_valid_email(&input.email) {
        warn!(email = %input.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }

    let user = match store.find_by_email(&input.email).await? {
        Some(u) => u,
        None => {
            if let Some(dummy) = DUMMY_HASH.as_ref() {
                let _ = verify_password_async(input.password, dummy.clone()).await;
            }
            warn!(email = %input.email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let matches = verify_password_async(input.password, user.password_hash.clone())
        .await
        .map_err(AuthError::Internal)?;
    if !matches {
        warn!(user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = keys.issue(user.id, &user.email).map_err(AuthError::Internal)?;
    debug!(user_id = user.id, "session issued");
    Ok(AuthOutcome { token, user })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{auth::repo::memory::MemoryUserStore, config::JwtConfig};

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
        })
    }

    fn register_req(email: &str, password: &str, name: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            name: name.map(Into::into),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("guest@party.io"));
        assert!(is_valid_email("First.Last+rsvp@sub.example.com"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("nodot@example"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@.b.c"));
        assert!(!is_valid_email("a@b..c"));
        assert!(!is_valid_email("a@b.c."));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("<x>@y.zz"));
        assert!(!is_valid_email("a@b.123"));
        assert!(!is_valid_email(".lead@example.com"));
        assert!(!is_valid_email("dots..inside@example.com"));
        assert!(!is_valid_email("a@-host.com"));
        assert!(!is_valid_email("a@host-.com"));
        assert!(is_valid_email("o'brien@my-host.example.org"));
    }

    #[test]
    fn unknown_email_path_has_a_hash_to_verify_against() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash built");
        assert!(dummy.starts_with("$argon2"));
        assert!(!crate::auth::password::verify_password("s3cret!", dummy));
    }

    #[tokio::test]
    async fn register_then_login_with_same_credentials() {
        let store = MemoryUserStore::default();
        let keys = keys();

        let registered = register(&store, &keys, register_req("ann@example.com", "s3cret!", Some("Ann")))
            .await
            .expect("register");
        assert_eq!(registered.user.email, "ann@example.com");
        assert_eq!(registered.user.name.as_deref(), Some("Ann"));
        assert_ne!(registered.user.password_hash, "s3cret!");
        let claim = keys.verify(&registered.token).expect("token verifies");
        assert_eq!(claim.subject_id, registered.user.id);

        let logged_in = login(&store, &keys, login_req("ann@example.com", "s3cret!"))
            .await
            .expect("login");
        assert_eq!(logged_in.user.id, registered.user.id);
        assert!(keys.verify(&logged_in.token).is_ok());
    }

    #[tokio::test]
    async fn short_password_is_weak_and_creates_nothing() {
        let store = MemoryUserStore::default();
        for pw in ["", "a", "abcde", "ääääà"] {
            let err = register(&store, &keys(), register_req("bob@example.com", pw, None))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::WeakPassword), "password {pw:?}");
        }
        assert_eq!(store.len().await, 0);

        // exactly six characters is enough
        register(&store, &keys(), register_req("bob@example.com", "abcdef", None))
            .await
            .expect("six chars accepted");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_before_lookup() {
        let store = MemoryUserStore::default();
        let err = register(&store, &keys(), register_req("not-an-email", "s3cret!", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn second_registration_is_duplicate() {
        let store = MemoryUserStore::default();
        register(&store, &keys(), register_req("cy@example.com", "s3cret!", None))
            .await
            .expect("first");
        let err = register(&store, &keys(), register_req("cy@example.com", "other-pass", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_yield_one_winner() {
        let store = Arc::new(MemoryUserStore::default());
        let keys = keys();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            let keys = keys.clone();
            handles.push(tokio::spawn(async move {
                register(store.as_ref(), &keys, register_req("race@example.com", "s3cret!", None)).await
            }));
        }

        let mut ok = 0;
        let mut duplicate = 0;
        for h in handles {
            match h.await.expect("task") {
                Ok(_) => ok += 1,
                Err(AuthError::DuplicateEmail) => duplicate += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(duplicate, 3);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let store = MemoryUserStore::default();
        register(&store, &keys(), register_req("dee@example.com", "s3cret!", None))
            .await
            .expect("register");

        let wrong_password = login(&store, &keys(), login_req("dee@example.com", "nope-nope"))
            .await
            .unwrap_err();
        let unknown_email = login(&store, &keys(), login_req("ghost@example.com", "s3cret!"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.code(), unknown_email.code());
        assert_eq!(wrong_password.status(), unknown_email.status());
    }

    #[tokio::test]
    async fn login_email_is_case_sensitive() {
        let store = MemoryUserStore::default();
        register(&store, &keys(), register_req("Eve@Example.com", "s3cret!", None))
            .await
            .expect("register");
        let err = login(&store, &keys(), login_req("eve@example.com", "s3cret!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
