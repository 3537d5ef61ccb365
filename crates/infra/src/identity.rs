//! Identity & session service: signup, login, logout and bearer-token
//! authentication.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use airhouse_auth::account::{AUTHENTICATION_FAILED, EMAIL_TAKEN};
use airhouse_auth::{
    Credentials, Hs256Jwt, JwtClaims, JwtIssuer, JwtValidator, PasswordError, Session, SessionId,
    SessionRegistry, SignUp, TokenValidationError, UserAccount, hash_password, verify_password,
};
use airhouse_core::{DomainError, UserId};

use crate::accounts::AccountStore;
use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Form validation failed (field or non-field messages).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    Token(#[from] TokenValidationError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// A freshly opened session and the bearer token bound to it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub session: Session,
    pub account: UserAccount,
}

/// Who a verified token belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub user_id: UserId,
    pub session_id: SessionId,
}

#[derive(Clone)]
pub struct IdentityService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<SessionRegistry>,
    jwt: Arc<Hs256Jwt>,
    token_ttl: Duration,
}

impl IdentityService {
    pub fn new(accounts: Arc<dyn AccountStore>, jwt_secret: &str, token_ttl: Duration) -> Self {
        Self {
            accounts,
            sessions: Arc::new(SessionRegistry::new()),
            jwt: Arc::new(Hs256Jwt::new(jwt_secret)),
            token_ttl,
        }
    }

    /// Register a user, then log them in with the same credentials.
    pub async fn signup(&self, form: &SignUp) -> IdentityResult<IssuedToken> {
        let valid = form.validate()?;

        if self.accounts.find_by_email(&valid.email).await?.is_some() {
            return Err(DomainError::field("email", EMAIL_TAKEN).into());
        }

        let account = UserAccount {
            id: UserId::new(),
            email: valid.email.clone(),
            password_hash: hash_password(&valid.password)?,
            created_at: Utc::now(),
        };
        let account = match self.accounts.insert(account).await {
            Ok(account) => account,
            Err(StoreError::Conflict(_)) => {
                return Err(DomainError::field("email", EMAIL_TAKEN).into());
            }
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %account.id, "user signed up");

        let credentials = Credentials {
            email: valid.email,
            password: valid.password,
        };
        match self.login(&credentials).await {
            Ok(issued) => Ok(issued),
            Err(IdentityError::InvalidCredentials) => {
                warn!(user_id = %account.id, "login after signup failed");
                Err(DomainError::non_field(AUTHENTICATION_FAILED).into())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn login(&self, form: &Credentials) -> IdentityResult<IssuedToken> {
        let credentials = form.validate()?;

        let account = match self.accounts.find_by_email(&credentials.email).await? {
            Some(account) if verify_password(&credentials.password, &account.password_hash) => account,
            _ => {
                info!("login rejected");
                return Err(IdentityError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        self.sessions.purge_expired(now);
        let session = self.sessions.open(account.id, now, self.token_ttl);
        let claims = JwtClaims {
            sub: account.id,
            sid: session.id,
            issued_at: session.opened_at,
            expires_at: session.expires_at,
        };
        let token = self.jwt.issue(&claims)?;

        info!(user_id = %account.id, session_id = %session.id, "session opened");
        Ok(IssuedToken {
            token,
            session,
            account,
        })
    }

    /// Revoke a session. Returns whether it was still active.
    pub fn logout(&self, session_id: SessionId) -> bool {
        let revoked = self.sessions.revoke(session_id);
        if revoked {
            info!(session_id = %session_id, "session closed");
        }
        revoked
    }

    /// Verify signature, time window and that the session is still open.
    pub fn authenticate(&self, token: &str, now: DateTime<Utc>) -> IdentityResult<Authenticated> {
        let claims = self.jwt.validate(token, now)?;
        if !self.sessions.is_active(claims.sid, claims.sub, now) {
            return Err(TokenValidationError::SessionRevoked.into());
        }
        Ok(Authenticated {
            user_id: claims.sub,
            session_id: claims.sid,
        })
    }

    pub async fn account(&self, user_id: UserId) -> IdentityResult<UserAccount> {
        match self.accounts.get(user_id).await {
            Ok(account) => Ok(account),
            Err(StoreError::NotFound) => Err(DomainError::NotFound.into()),
            Err(e) => Err(e.into()),
        }
    }
}
