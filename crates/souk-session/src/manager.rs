//! The session manager: owns the in-memory session and every operation
//! that changes it.
//!
//! It keeps memory and the store in step:
//!
//! | Operation          | Memory                         | Store                     |
//! |--------------------|--------------------------------|---------------------------|
//! | `restore`          | filled from the store          | read only                 |
//! | `login`            | tokens, user id, then user     | all four entries written  |
//! | `logout`           | cleared                        | all four entries removed  |
//! | `update_user`      | user replaced                  | `user` entry replaced     |
//! | refresh (pipeline) | access token replaced          | `accessToken` replaced    |
//! | expiry (pipeline)  | cleared                        | all four entries removed  |
//!
//! The last two happen inside [`ApiClient`] and reach the manager through
//! its [`SessionObserver`] registration.
//!
//! # Concurrency note
//!
//! The session sits in a `tokio::sync::watch` channel. Writers go through
//! `send_modify`, so a reader never sees a half-applied change, and
//! [`subscribe`](SessionManager::subscribe) hands out receivers that wake
//! on every change.

use std::sync::Arc;

use souk_protocol::endpoints::{FORGOT_PASSWORD, LOGIN, PROFILE, RESEND_OTP, SIGNUP, VERIFY_OTP};
use souk_protocol::validate::{validate_email, validate_otp, validate_password, validate_required};
use souk_protocol::{
    Codec, ForgotPasswordRequest, JsonCodec, LoginRequest, MessageData, ResendOtpRequest,
    TokenPair, User, UserData, VerifyOtpRequest, claims,
};
use souk_store::{SessionStore, StoreKey};
use souk_transport::{ApiRequest, FormPart, HttpTransport, ImageAsset};
use tokio::sync::watch;

use crate::error::GENERIC_MESSAGE;
use crate::{ApiClient, AuthFailure, FailureKind, Session, SessionObserver};

/// Login failed and the server didn't say why.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password.";

/// Signup failed and the server didn't say why.
pub const SIGNUP_FAILED_MESSAGE: &str = "Signup failed. Please try again.";

/// What to tell the user after a successful signup.
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Check your email for the OTP";

/// The only answer `forgot_password` ever gives, success or not, so the
/// screen can't be used to find out which emails have accounts.
pub const FORGOT_PASSWORD_MESSAGE: &str = "If an account with that email exists, a password reset email has been sent. Please check your inbox.";

/// Verification was refused and the server didn't say why.
pub const INVALID_OTP_MESSAGE: &str = "Invalid OTP. Please try again.";

// ---------------------------------------------------------------------------
// SignupForm
// ---------------------------------------------------------------------------

/// Everything the signup screen collects.
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub profile_image: Option<ImageAsset>,
}

impl SignupForm {
    /// Runs the client-side checks, first failure wins.
    pub fn validate(&self) -> Result<(), AuthFailure> {
        validate_required("First name", &self.first_name)
            .and_then(|()| validate_required("Last name", &self.last_name))
            .and_then(|()| validate_email(&self.email))
            .and_then(|()| validate_password(&self.password))
            .map_err(AuthFailure::validation)
    }

    async fn into_parts(self) -> Result<Vec<FormPart>, AuthFailure> {
        let mut parts = vec![
            FormPart::text("firstName", self.first_name),
            FormPart::text("lastName", self.last_name),
            FormPart::text("email", self.email.trim()),
            FormPart::text("password", self.password),
        ];
        if let Some(image) = self.profile_image {
            let part = image.into_part("profileImage").await.map_err(|e| {
                tracing::warn!(error = %e, "could not read profile image");
                AuthFailure::new(FailureKind::Validation, "Could not read the selected image.")
            })?;
            parts.push(part);
        }
        Ok(parts)
    }
}

// ---------------------------------------------------------------------------
// SessionCell
// ---------------------------------------------------------------------------

/// The watch channel holding the session, registered with the pipeline.
struct SessionCell {
    tx: watch::Sender<Session>,
}

impl SessionObserver for SessionCell {
    fn on_token_refreshed(&self, access_token: &str) {
        self.tx.send_modify(|session| {
            session.access_token = Some(access_token.to_string());
        });
    }

    fn on_session_expired(&self) {
        self.tx.send_modify(Session::clear);
    }
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Owns the in-memory [`Session`] and runs the auth operations.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ restore() ──→ login() / logout() / ... ──→ teardown()
/// ```
///
/// `new` registers the manager with the [`ApiClient`] so refreshes and
/// expiries show up in the session; `teardown` undoes that.
pub struct SessionManager<T, S> {
    client: Arc<ApiClient<T, S>>,
    store: Arc<S>,
    cell: Arc<SessionCell>,
    observer: Arc<dyn SessionObserver>,
}

impl<T: HttpTransport, S: SessionStore> SessionManager<T, S> {
    /// Creates a manager with an empty session (`is_loading` = true) and
    /// hooks it into `client`.
    pub fn new(client: Arc<ApiClient<T, S>>) -> Self {
        let (tx, _) = watch::channel(Session::restoring());
        let cell = Arc::new(SessionCell { tx });
        let observer: Arc<dyn SessionObserver> = cell.clone();
        client.add_observer(Arc::clone(&observer));
        let store = Arc::clone(client.store());
        Self {
            client,
            store,
            cell,
            observer,
        }
    }

    /// The client this manager sends through.
    pub fn client(&self) -> &Arc<ApiClient<T, S>> {
        &self.client
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.cell.tx.borrow().clone()
    }

    /// A receiver that sees every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.cell.tx.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cell.tx.borrow().is_authenticated
    }

    pub fn current_user(&self) -> Option<User> {
        self.cell.tx.borrow().user.clone()
    }

    /// Stops listening to the pipeline. The session is left as is.
    pub fn teardown(&self) {
        self.client.remove_observer(&self.observer);
        tracing::debug!("session manager detached");
    }

    // -----------------------------------------------------------------------
    // Restore
    // -----------------------------------------------------------------------

    /// Rebuilds the session from the store at startup.
    ///
    /// With no stored access token the session stays signed out. With
    /// one, the session is signed in right away and the user comes from
    /// the cache, or from `GET /user/profile` when the cache is missing or
    /// unreadable. Store failures are logged and treated as "no session".
    /// Whatever happens, `is_loading` is false afterwards.
    pub async fn restore(&self) -> Session {
        match self.store.get(StoreKey::AccessToken).await {
            Ok(Some(token)) => self.restore_from(token).await,
            Ok(None) => tracing::info!("no stored session"),
            Err(e) => tracing::error!(error = %e, "could not read stored session, starting signed out"),
        }
        self.cell.tx.send_modify(|session| session.is_loading = false);
        self.snapshot()
    }

    async fn restore_from(&self, access_token: String) {
        let refresh_token = self.store.get_or_absent(StoreKey::RefreshToken).await;
        let user_id = self.store.get_or_absent(StoreKey::UserId).await;
        self.cell.tx.send_modify(|session| {
            session.access_token = Some(access_token);
            session.refresh_token = refresh_token;
            session.user_id = user_id;
            session.is_authenticated = true;
        });

        match self.cached_user().await {
            Some(user) => {
                tracing::info!(user = %user.id, "session restored from cache");
                self.cell.tx.send_modify(|session| session.user = Some(user));
            }
            None => {
                tracing::info!("session restored without cached user, fetching profile");
                self.fetch_user().await;
            }
        }
    }

    async fn cached_user(&self) -> Option<User> {
        let json = self.store.get_or_absent(StoreKey::User).await?;
        match JsonCodec.decode::<User>(json.as_bytes()) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "cached user is unreadable, ignoring it");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Login / signup / verification
    // -----------------------------------------------------------------------

    /// Signs in with email and password.
    ///
    /// On success the tokens and the user id (read from the token's
    /// claims) are in memory and in the store, and the profile has been
    /// fetched. The profile fetch failing doesn't fail the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthFailure> {
        validate_email(email)
            .and_then(|()| validate_password(password))
            .map_err(AuthFailure::validation)?;

        let request = ApiRequest::post(LOGIN)
            .json(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
                token_expires_in: self.client.config().token_expires_in.clone(),
            })
            .map_err(|e| AuthFailure::from_api(&e.into(), LOGIN_FAILED_MESSAGE))?;

        let pair: TokenPair = self.client.send_json(request).await.map_err(|e| {
            tracing::warn!(error = %e, "login failed");
            AuthFailure::from_api(&e, LOGIN_FAILED_MESSAGE)
        })?;

        let user_id = claims::decode_user_id(&pair.access_token);
        if user_id.is_none() {
            tracing::warn!("access token has no readable userId claim");
        }

        self.cell.tx.send_modify(|session| {
            session.access_token = Some(pair.access_token.clone());
            session.refresh_token = pair.refresh_token.clone();
            session.user_id = user_id.clone();
            session.user = None;
            session.is_authenticated = true;
            session.is_loading = false;
        });
        self.persist_login(&pair, user_id.as_deref()).await;

        tracing::info!(user_id = user_id.as_deref().unwrap_or("?"), "login successful");
        self.fetch_user().await;
        Ok(())
    }

    async fn persist_login(&self, pair: &TokenPair, user_id: Option<&str>) {
        let mut stale = vec![StoreKey::User];
        let writes = [
            (StoreKey::AccessToken, Some(pair.access_token.as_str())),
            (StoreKey::RefreshToken, pair.refresh_token.as_deref()),
            (StoreKey::UserId, user_id),
        ];
        for (key, value) in writes {
            match value {
                Some(value) => {
                    if let Err(e) = self.store.set(key, value).await {
                        tracing::warn!(%key, error = %e, "could not persist login");
                    }
                }
                None => stale.push(key),
            }
        }
        if let Err(e) = self.store.remove_many(&stale).await {
            tracing::warn!(error = %e, "could not clear stale session entries");
        }
    }

    /// Creates an account. The user must verify their email (OTP) before
    /// they can log in, so the session is not touched.
    pub async fn signup(&self, form: SignupForm) -> Result<(), AuthFailure> {
        form.validate()?;
        let email = form.email.trim().to_string();
        let parts = form.into_parts().await?;

        let request = ApiRequest::post(SIGNUP).multipart(parts);
        self.client
            .send(request)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "signup failed");
                AuthFailure::from_api(&e, SIGNUP_FAILED_MESSAGE)
            })?;

        tracing::info!(%email, "signup accepted, awaiting verification");
        Ok(())
    }

    /// Confirms the emailed code, then logs in with the same credentials.
    pub async fn verify_otp_and_login(
        &self,
        email: &str,
        password: &str,
        otp: &str,
    ) -> Result<(), AuthFailure> {
        validate_email(email)
            .and_then(|()| validate_otp(otp))
            .map_err(AuthFailure::validation)?;

        let request = ApiRequest::post(VERIFY_OTP)
            .json(&VerifyOtpRequest {
                email: email.trim().to_string(),
                otp: otp.trim().to_string(),
            })
            .map_err(|e| AuthFailure::from_api(&e.into(), GENERIC_MESSAGE))?;

        let envelope = self
            .client
            .send_envelope::<MessageData>(request)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "otp verification failed");
                AuthFailure::from_api(&e, INVALID_OTP_MESSAGE)
            })?;
        if !envelope.is_confirmed() {
            return Err(AuthFailure::new(
                FailureKind::Rejected,
                envelope.message.unwrap_or_else(|| INVALID_OTP_MESSAGE.to_string()),
            ));
        }

        tracing::info!("email verified");
        self.login(email, password).await
    }

    /// Asks the backend to email a new verification code.
    pub async fn resend_verification_otp(&self, email: &str) -> Result<(), AuthFailure> {
        validate_email(email).map_err(AuthFailure::validation)?;
        let request = ApiRequest::post(RESEND_OTP)
            .json(&ResendOtpRequest {
                email: email.trim().to_string(),
            })
            .map_err(|e| AuthFailure::from_api(&e.into(), GENERIC_MESSAGE))?;

        self.client.send(request).await.map_err(|e| {
            tracing::warn!(error = %e, "resend otp failed");
            AuthFailure::from_api(&e, GENERIC_MESSAGE)
        })?;
        Ok(())
    }

    /// Requests a password reset email.
    ///
    /// Any failure past local validation comes back as
    /// [`FORGOT_PASSWORD_MESSAGE`], the same sentence a success would
    /// show. Only `Ok` means the server confirmed.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthFailure> {
        validate_email(email).map_err(AuthFailure::validation)?;
        let generic = || AuthFailure::new(FailureKind::Rejected, FORGOT_PASSWORD_MESSAGE);

        let request = ApiRequest::post(FORGOT_PASSWORD)
            .json(&ForgotPasswordRequest {
                email: email.trim().to_string(),
            })
            .map_err(|_| generic())?;

        match self.client.send_envelope::<MessageData>(request).await {
            Ok(envelope) if envelope.is_confirmed() => Ok(()),
            Ok(_) => {
                tracing::warn!("forgot-password not confirmed by server");
                Err(generic())
            }
            Err(e) => {
                tracing::warn!(error = %e, "forgot-password request failed");
                Err(generic())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Logout / user
    // -----------------------------------------------------------------------

    /// Signs out: memory and store are both cleared. Safe to call twice.
    pub async fn logout(&self) {
        self.cell.tx.send_modify(Session::clear);
        if let Err(e) = self.store.clear_all().await {
            tracing::error!(error = %e, "could not clear stored session");
        }
        tracing::info!("logged out");
    }

    /// Replaces the user in memory and in the cache.
    pub async fn update_user(&self, user: User) {
        match JsonCodec.encode_to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.store.set(StoreKey::User, &json).await {
                    tracing::warn!(error = %e, "could not cache user");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize user"),
        }
        self.cell.tx.send_modify(|session| session.user = Some(user));
    }

    /// Re-reads the profile from the server. `None` if that failed.
    pub async fn refresh_user(&self) -> Option<User> {
        self.fetch_user().await
    }

    async fn fetch_user(&self) -> Option<User> {
        match self.client.send_json::<UserData>(ApiRequest::get(PROFILE)).await {
            Ok(UserData { user }) => {
                self.update_user(user.clone()).await;
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch profile");
                None
            }
        }
    }
}
