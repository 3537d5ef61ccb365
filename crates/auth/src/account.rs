//! User accounts and signup/login form validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airhouse_core::validation::REQUIRED;
use airhouse_core::{DomainResult, Entity, FieldErrors, UserId};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_EMAIL_LEN: usize = 254;

pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const BAD_CREDENTIALS: &str = "Please enter a correct email and password.";
pub const AUTHENTICATION_FAILED: &str = "Authentication failed.";

/// A registered user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    /// Normalised (see [`normalize_email`]).
    pub email: String,
    /// argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl core::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Emails compare case-insensitively; stored lowercase and trimmed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

/// Signup form.
#[derive(Clone, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Signup form that passed field validation. Email uniqueness is checked
/// against the account store by the caller.
#[derive(Clone)]
pub struct ValidSignUp {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for SignUp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignUp")
            .field("email", &self.email)
            .field("password1", &"<redacted>")
            .field("password2", &"<redacted>")
            .finish()
    }
}

impl core::fmt::Debug for ValidSignUp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidSignUp")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SignUp {
    pub fn validate(&self) -> DomainResult<ValidSignUp> {
        let mut errors = FieldErrors::new();

        let email = normalize_email(&self.email);
        if email.is_empty() {
            errors.push_field("email", REQUIRED);
        } else if email.len() > MAX_EMAIL_LEN || !is_plausible_email(&email) {
            errors.push_field("email", INVALID_EMAIL);
        }

        if self.password1.is_empty() {
            errors.push_field("password1", REQUIRED);
        } else if self.password1.chars().count() < MIN_PASSWORD_LEN {
            errors.push_field(
                "password1",
                format!(
                    "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
                ),
            );
        }

        if self.password2.is_empty() {
            errors.push_field("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.push_field("password2", PASSWORD_MISMATCH);
        }

        errors.into_result(ValidSignUp {
            email,
            password: self.password1.clone(),
        })
    }
}

/// Login form.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn validate(&self) -> DomainResult<Credentials> {
        let mut errors = FieldErrors::new();
        let email = normalize_email(&self.email);
        if email.is_empty() {
            errors.push_field("email", REQUIRED);
        }
        if self.password.is_empty() {
            errors.push_field("password", REQUIRED);
        }
        errors.into_result(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airhouse_core::DomainError;

    fn signup(email: &str, p1: &str, p2: &str) -> SignUp {
        SignUp {
            email: email.to_string(),
            password1: p1.to_string(),
            password2: p2.to_string(),
        }
    }

    fn errors(err: DomainError) -> FieldErrors {
        match err {
            DomainError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_signup_normalises_email() {
        let valid = signup("  Alice@Example.COM ", "longenough", "longenough")
            .validate()
            .unwrap();
        assert_eq!(valid.email, "alice@example.com");
        assert_eq!(valid.password, "longenough");
    }

    #[test]
    fn mismatched_passwords_flag_password2() {
        let errs = errors(signup("a@b.io", "longenough", "different1").validate().unwrap_err());
        assert_eq!(errs.messages_for(Some("password2")), vec![PASSWORD_MISMATCH]);
    }

    #[test]
    fn short_password_and_bad_email_are_reported_together() {
        let errs = errors(signup("nobody", "short", "short").validate().unwrap_err());
        assert_eq!(errs.messages_for(Some("email")), vec![INVALID_EMAIL]);
        assert_eq!(errs.messages_for(Some("password1")).len(), 1);
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn email_shapes() {
        assert!(is_plausible_email("a@b.io"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.io"));
        assert!(!is_plausible_email("a@@b.io"));
        assert!(!is_plausible_email("a b@c.io"));
    }

    #[test]
    fn login_requires_both_fields() {
        let creds = Credentials {
            email: " ".to_string(),
            password: String::new(),
        };
        assert_eq!(errors(creds.validate().unwrap_err()).len(), 2);
    }

    #[test]
    fn form_debug_redacts_passwords() {
        let form = signup("a@b.io", "hunter2hunter2", "hunter2hunter2");
        let valid = form.validate().unwrap();
        let creds = Credentials {
            email: "a@b.io".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        for rendered in [format!("{form:?}"), format!("{valid:?}"), format!("{creds:?}")] {
            assert!(rendered.contains("a@b.io"));
            assert!(!rendered.contains("hunter2"));
        }
    }

    #[test]
    fn debug_redacts_hash() {
        let account = UserAccount {
            id: UserId::new(),
            email: "a@b.io".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        assert!(!format!("{account:?}").contains("secret"));
    }
}
