//! Account endpoints: registration, OTP, login and profile.

use super::client::ApiClient;
use super::error::{ApiError, ErrorMessages, Wording};
use super::types::{
    ChangePasswordRequest, EmailRequest, Envelope, LoginRequest, LoginResult, MessageResponse,
    OtpRequest, RegisterRequest, RegisterResponse, UpdateProfileRequest, User,
};
use crate::auth::AuthSession;

const REGISTER: ErrorMessages = ErrorMessages {
    bad_request: Some(Wording::PreferServer(
        "Invalid registration data. Please check your information.",
    )),
    conflict: Some(Wording::PreferServer(
        "Email already exists. Please use a different email.",
    )),
    server: Some(Wording::Fixed("Server error. Please try again later.")),
    network: "Network error. Please check your internet connection.",
    ..ErrorMessages::fallback_only("Failed to send verification email. Please try again.")
};

const VERIFY_REGISTRATION: ErrorMessages = ErrorMessages::fallback_only("OTP verification failed");

const LOGIN: ErrorMessages = ErrorMessages::fallback_only("Login failed");

const RESEND_OTP: ErrorMessages = ErrorMessages {
    not_found: Some(Wording::Fixed("Email not found. Please register first.")),
    rate_limited: Some(Wording::Fixed(
        "Too many requests. Please wait before requesting a new code.",
    )),
    ..ErrorMessages::fallback_only("Failed to send verification code")
};

const PROFILE: ErrorMessages = ErrorMessages {
    unauthorized: Some(Wording::Fixed("Unauthorized. Please login again.")),
    not_found: Some(Wording::Fixed("User not found.")),
    ..ErrorMessages::fallback_only("Failed to get user profile")
};

const PROFILE_BY_ID: ErrorMessages = ErrorMessages {
    forbidden: Some(Wording::Fixed("Access denied. Insufficient privileges.")),
    ..PROFILE
};

const UPDATE_PROFILE: ErrorMessages = ErrorMessages {
    bad_request: Some(Wording::PreferServer(
        "Invalid profile data. Please check your information.",
    )),
    unauthorized: Some(Wording::Fixed("Unauthorized. Please login again.")),
    conflict: Some(Wording::PreferServer(
        "Username already exists. Please choose a different username.",
    )),
    ..ErrorMessages::fallback_only("Failed to update profile")
};

const CHANGE_PASSWORD: ErrorMessages = ErrorMessages {
    bad_request: Some(Wording::PreferServer(
        "Invalid password data. Please check your passwords.",
    )),
    unauthorized: Some(Wording::Fixed("Unauthorized or incorrect old password.")),
    unprocessable: Some(Wording::PreferServer(
        "Password validation failed. Please check password requirements.",
    )),
    ..ErrorMessages::fallback_only("Failed to change password")
};

/// Account API borrowed from an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct UserApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn bearer(session: &AuthSession) -> Result<&str, ApiError> {
        session.token().ok_or(ApiError::NotAuthenticated)
    }

    /// Starts registration; the platform emails an OTP.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let builder = self.client.post("/users/register").json(request);
        self.client.send(builder, &REGISTER).await
    }

    /// Completes registration with the emailed OTP.
    pub async fn verify_registration(
        &self,
        email: &str,
        code: &str,
    ) -> Result<MessageResponse, ApiError> {
        let builder = self
            .client
            .post("/users/verify-registration")
            .json(&OtpRequest { email, code });
        self.client.send(builder, &VERIFY_REGISTRATION).await
    }

    /// Requests a fresh OTP.
    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let builder = self
            .client
            .post("/users/resend-otp")
            .json(&EmailRequest { email });
        self.client.send(builder, &RESEND_OTP).await
    }

    /// Logs in and initialises `session` on success.
    pub async fn login(
        &self,
        session: &mut AuthSession,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let builder = self.client.post("/users/login").json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let envelope: Envelope<LoginResult> = self.client.send(builder, &LOGIN).await?;
        tracing::info!(
            user = %envelope.result.user.email,
            role = envelope.result.user.role.as_str(),
            "Logged in"
        );
        session.login(envelope.result.user, envelope.result.access_token);
        Ok(())
    }

    /// Rebuilds a session from a previously issued token.
    ///
    /// This is the authentication check: the token is accepted only if
    /// the profile endpoint accepts it.
    pub async fn restore(&self, token: &str) -> Result<AuthSession, ApiError> {
        let mut session = AuthSession::with_token(token);
        let user = self.profile(&session).await?;
        session.login(user, token);
        Ok(session)
    }

    /// Profile of the session's user.
    pub async fn profile(&self, session: &AuthSession) -> Result<User, ApiError> {
        let builder = self.client.get("/users/me").bearer_auth(Self::bearer(session)?);
        let envelope: Envelope<User> = self.client.send(builder, &PROFILE).await?;
        Ok(envelope.result)
    }

    /// Profile of any user, subject to the caller's privileges.
    pub async fn profile_by_id(
        &self,
        session: &AuthSession,
        user_id: &str,
    ) -> Result<User, ApiError> {
        let builder = self
            .client
            .get(&format!("/users/profile/{user_id}"))
            .bearer_auth(Self::bearer(session)?);
        self.client.send(builder, &PROFILE_BY_ID).await
    }

    /// Updates the session's profile and refreshes the cached user.
    pub async fn update_profile(
        &self,
        session: &mut AuthSession,
        update: &UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        let builder = self
            .client
            .patch("/users/me")
            .bearer_auth(Self::bearer(session)?)
            .json(update);
        let envelope: Envelope<User> = self.client.send(builder, &UPDATE_PROFILE).await?;
        session.set_user(envelope.result.clone());
        Ok(envelope.result)
    }

    pub async fn change_password(
        &self,
        session: &AuthSession,
        request: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        let builder = self
            .client
            .post("/users/change-password")
            .bearer_auth(Self::bearer(session)?)
            .json(request);
        self.client.send(builder, &CHANGE_PASSWORD).await
    }
}
