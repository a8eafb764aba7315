//! Account service: registration with emailed OTP verification, password
//! reset, login, and bearer-token authentication.

use chrono::{Duration, Utc};
use uniassist_types::config::AuthConfig;
use uniassist_types::error::{AuthError, RepositoryError};
use uniassist_types::user::{
    AuthSession, EmailRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, User, UserId,
    UserProfile, VerifyOtpRequest, normalize_email,
};

use crate::mail::{Mailer, templates};
use crate::repository::user::UserRepository;
use crate::service::hash::{ContentHasher, PasswordHasher};
use crate::service::otp::{self, OtpCheck};
use crate::service::token::TokenIssuer;
use crate::service::validation::{is_valid_email, required};

/// Service orchestrating the account lifecycle.
///
/// Generic over repository and infrastructure traits to maintain clean
/// architecture -- uniassist-core never depends on uniassist-infra.
pub struct AuthService<U, M, P, T, H>
where
    U: UserRepository,
    M: Mailer,
    P: PasswordHasher,
    T: TokenIssuer,
    H: ContentHasher,
{
    users: U,
    mailer: M,
    passwords: P,
    tokens: T,
    otp_hasher: H,
    config: AuthConfig,
}

impl<U, M, P, T, H> AuthService<U, M, P, T, H>
where
    U: UserRepository,
    M: Mailer,
    P: PasswordHasher,
    T: TokenIssuer,
    H: ContentHasher,
{
    pub fn new(users: U, mailer: M, passwords: P, tokens: T, otp_hasher: H, config: AuthConfig) -> Self {
        Self {
            users,
            mailer,
            passwords,
            tokens,
            otp_hasher,
            config,
        }
    }

    fn otp_ttl(&self) -> Duration {
        Duration::seconds(self.config.otp_ttl_secs)
    }

    fn otp_ttl_minutes(&self) -> i64 {
        (self.config.otp_ttl_secs / 60).max(1)
    }

    fn check_password_length(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.config.min_password_len {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_len
            )));
        }
        Ok(())
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, AuthError> {
        Ok(AuthSession {
            token: self.tokens.issue(&user.id)?,
            user: UserProfile::from(user),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.get_by_email(&normalize_email(email)).await?)
    }

    /// Register (or re-register an unverified) account and mail a verification code.
    pub async fn register(&self, request: RegisterRequest) -> Result<(), AuthError> {
        let name = required(request.name.as_deref())
            .ok_or_else(|| AuthError::Validation("Name is required".to_string()))?
            .to_string();
        let email = required(request.email.as_deref())
            .map(normalize_email)
            .ok_or_else(|| AuthError::Validation("Email is required".to_string()))?;
        if !is_valid_email(&email) {
            return Err(AuthError::Validation(
                "Please enter a valid email".to_string(),
            ));
        }
        let password = request.password.unwrap_or_default();
        self.check_password_length(&password)?;

        let existing = self.users.get_by_email(&email).await?;
        if existing.as_ref().is_some_and(|u| u.is_verified) {
            return Err(AuthError::AlreadyExists);
        }

        let now = Utc::now();
        let (code, challenge) = otp::issue(&self.otp_hasher, self.otp_ttl(), now);
        let password_hash = self.passwords.hash_password(&password)?;

        let (user, created) = match existing {
            Some(mut user) => {
                user.name = name;
                user.password_hash = password_hash;
                user.verification = Some(challenge);
                user.updated_at = now;
                self.users.update(&user).await?;
                (user, false)
            }
            None => {
                let user = User {
                    id: UserId::new(),
                    name,
                    email,
                    password_hash,
                    credits: self.config.starting_credits,
                    is_verified: false,
                    verification: Some(challenge),
                    password_reset: None,
                    created_at: now,
                    updated_at: now,
                };
                let user = self.users.create(&user).await.map_err(|e| match e {
                    RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                    other => AuthError::Repository(other),
                })?;
                (user, true)
            }
        };

        let mail = templates::verification(&user.email, &user.name, &code, self.otp_ttl_minutes());
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::error!(user_id = %user.id, error = %e, "failed to send verification mail");
            if created {
                if let Err(e) = self.users.delete(&user.id).await {
                    tracing::error!(user_id = %user.id, error = %e, "failed to roll back unverified user");
                }
            }
            return Err(AuthError::MailDelivery(e));
        }

        tracing::info!(user_id = %user.id, created, "verification code sent");
        Ok(())
    }

    /// Confirm the emailed code, mark the account verified, and sign in.
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<AuthSession, AuthError> {
        let (Some(email), Some(code)) = (
            required(request.email.as_deref()),
            required(request.otp.as_deref()),
        ) else {
            return Err(AuthError::Validation(
                "Email and OTP are required".to_string(),
            ));
        };

        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let now = Utc::now();
        match otp::check(&self.otp_hasher, user.verification.as_ref(), code, now) {
            OtpCheck::Mismatch => return Err(AuthError::InvalidOtp("Invalid OTP code")),
            OtpCheck::Expired => {
                return Err(AuthError::OtpExpired(
                    "OTP has expired. Please request a new one.",
                ));
            }
            OtpCheck::Valid => {}
        }

        user.is_verified = true;
        user.verification = None;
        user.updated_at = now;
        self.users.update(&user).await?;

        tracing::info!(user_id = %user.id, "account verified");
        self.session_for(&user)
    }

    /// Issue and mail a fresh verification code.
    pub async fn resend_otp(&self, request: EmailRequest) -> Result<(), AuthError> {
        let email = required(request.email.as_deref())
            .ok_or_else(|| AuthError::Validation("Email is required".to_string()))?;
        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let now = Utc::now();
        let (code, challenge) = otp::issue(&self.otp_hasher, self.otp_ttl(), now);
        user.verification = Some(challenge);
        user.updated_at = now;
        self.users.update(&user).await?;

        let mail = templates::resend(&user.email, &user.name, &code, self.otp_ttl_minutes());
        self.mailer
            .send(&mail)
            .await
            .map_err(AuthError::MailDelivery)?;
        Ok(())
    }

    /// Mail a password-reset code. Unknown addresses succeed silently so the
    /// endpoint cannot be used to probe for accounts.
    pub async fn forgot_password(&self, request: EmailRequest) -> Result<(), AuthError> {
        let email = required(request.email.as_deref())
            .ok_or_else(|| AuthError::Validation("Email is required".to_string()))?;
        let Some(mut user) = self.find_by_email(email).await? else {
            tracing::debug!("password reset requested for unknown address");
            return Ok(());
        };

        let now = Utc::now();
        let (code, challenge) = otp::issue(&self.otp_hasher, self.otp_ttl(), now);
        user.password_reset = Some(challenge);
        user.updated_at = now;
        self.users.update(&user).await?;

        let mail = templates::password_reset(&user.email, &user.name, &code, self.otp_ttl_minutes());
        self.mailer
            .send(&mail)
            .await
            .map_err(AuthError::MailDelivery)?;
        Ok(())
    }

    /// Replace the password after checking the reset code.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), AuthError> {
        let (Some(email), Some(code), Some(new_password)) = (
            required(request.email.as_deref()),
            required(request.otp.as_deref()),
            request.new_password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::Validation("All fields are required".to_string()));
        };
        self.check_password_length(new_password)?;

        let mut user = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let now = Utc::now();
        match otp::check(&self.otp_hasher, user.password_reset.as_ref(), code, now) {
            OtpCheck::Mismatch => return Err(AuthError::InvalidOtp("Invalid OTP")),
            OtpCheck::Expired => return Err(AuthError::OtpExpired("OTP expired")),
            OtpCheck::Valid => {}
        }

        user.password_hash = self.passwords.hash_password(new_password)?;
        user.password_reset = None;
        user.updated_at = now;
        self.users.update(&user).await?;

        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Check credentials and issue a token. Unverified accounts may log in;
    /// the profile reports `isVerified` so the client can prompt for the code.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AuthError> {
        let (Some(email), Some(password)) = (
            required(request.email.as_deref()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.passwords.verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        self.session_for(&user)
    }

    /// Resolve a bearer token to a live user.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::Unauthorized)?;
        self.users
            .get_by_id(&user_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }
}
