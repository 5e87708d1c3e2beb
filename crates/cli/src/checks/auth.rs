//! Authentication flow check.
//!
//! 1. The profile endpoint rejects a request without credentials.
//! 2. Login with the configured account issues an access token.
//! 3. The token grants access to the profile endpoint.

use shop_smoke_core::{
    BearerToken, Credentials, ErrorEnvelope, LoginResponse, ProfileResponse, TokenResponse,
    UserSummary,
};
use tracing::debug;

use super::{CheckError, StageFailure, conclude, decode, endpoints, excerpt};
use crate::probe::{ApiProbe, ProbeRequest};
use crate::report::Reporter;

/// Name used in the closing diagnostic.
pub const NAME: &str = "Authentication flow test";

/// A logged-in session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Access token to send as a bearer credential.
    pub token: BearerToken,
    /// The logged-in user.
    pub user: UserSummary,
    /// Message returned with the token, if any.
    pub message: Option<String>,
}

/// Run the authentication flow check.
///
/// # Errors
///
/// Returns the first failing stage. Diagnostics for every stage, including
/// the failing one, have already been written to `out`.
pub async fn run<R: Reporter>(
    probe: &ApiProbe,
    credentials: &Credentials,
    out: &mut R,
) -> Result<(), StageFailure> {
    out.banner("Authentication Flow Test");
    let result = stages(probe, credentials, out).await;
    conclude(out, NAME, result)
}

async fn stages<R: Reporter>(
    probe: &ApiProbe,
    credentials: &Credentials,
    out: &mut R,
) -> Result<(), StageFailure> {
    check_unauthorized(probe, out)
        .await
        .map_err(StageFailure::at("unauthorized access check"))?;

    out.section("Testing user login...");
    let session = login(probe, credentials)
        .await
        .map_err(StageFailure::at("login"))?;
    out.pass(&format!(
        "Login successful: {}",
        session.message.as_deref().unwrap_or("no message")
    ));
    out.detail(&format!("User: {} ({})", session.user.name, session.user.email));
    out.detail(&format!("Role: {}", session.user.role));

    check_protected(probe, &session.token, out)
        .await
        .map_err(StageFailure::at("protected endpoint"))
}

/// Log in and return the session.
///
/// # Errors
///
/// Returns `CheckError::Rejected` if the response carries no token, and
/// `CheckError::UnexpectedShape` if it carries a token but no user object
/// with `name`, `email` and `role`.
pub async fn login(probe: &ApiProbe, credentials: &Credentials) -> Result<Session, CheckError> {
    let body = send_login(probe, credentials).await?;
    let response: LoginResponse = decode(endpoints::LOGIN, &body)?;

    let token = issued_token(response.access_token, response.message.as_deref())?;
    let Some(user) = response.user else {
        return Err(CheckError::UnexpectedShape {
            endpoint: endpoints::LOGIN,
            reason: "login response has no `user` object".to_owned(),
        });
    };

    Ok(Session {
        token,
        user,
        message: response.message,
    })
}

/// Log in and return only the access token.
///
/// Nothing but `accessToken` is required of the response.
///
/// # Errors
///
/// Returns `CheckError::Rejected` if the response carries no token.
pub async fn login_token(
    probe: &ApiProbe,
    credentials: &Credentials,
) -> Result<BearerToken, CheckError> {
    let body = send_login(probe, credentials).await?;
    let response: TokenResponse = decode(endpoints::LOGIN, &body)?;
    issued_token(response.access_token, response.message.as_deref())
}

async fn send_login(probe: &ApiProbe, credentials: &Credentials) -> Result<String, CheckError> {
    debug!(email = %credentials.email, "Logging in");
    let request = ProbeRequest::post(endpoints::LOGIN, &credentials.payload())?;
    Ok(probe.call(request).await?)
}

fn issued_token(token: Option<String>, message: Option<&str>) -> Result<BearerToken, CheckError> {
    token.and_then(BearerToken::new).ok_or_else(|| {
        CheckError::Rejected(format!(
            "Login failed: {}",
            message.unwrap_or("Unknown error")
        ))
    })
}

/// Whether an error message says the request lacked valid credentials.
fn mentions_rejection(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("token") || message.contains("unauthorized")
}

async fn check_unauthorized<R: Reporter>(probe: &ApiProbe, out: &mut R) -> Result<(), CheckError> {
    out.section("Testing unauthorized access...");

    let body = probe.call(ProbeRequest::get(endpoints::PROFILE)).await?;
    let envelope: ErrorEnvelope = decode(endpoints::PROFILE, &body)?;

    match envelope.text() {
        Some(text) if mentions_rejection(text) => {
            out.pass(&format!("Unauthorized access correctly blocked: {text}"));
            Ok(())
        }
        _ => Err(CheckError::Rejected(format!(
            "Unexpected response: {}",
            excerpt(&body)
        ))),
    }
}

async fn check_protected<R: Reporter>(
    probe: &ApiProbe,
    token: &BearerToken,
    out: &mut R,
) -> Result<(), CheckError> {
    out.section("Testing protected endpoint...");

    let body = probe
        .call(ProbeRequest::get(endpoints::PROFILE).bearer(token))
        .await?;
    let profile: ProfileResponse = decode(endpoints::PROFILE, &body)?;

    let Some(user) = profile.user else {
        return Err(CheckError::Rejected(format!(
            "Protected endpoint failed: {}",
            profile.message.as_deref().unwrap_or("Unknown error")
        )));
    };

    out.pass("Protected endpoint accessible");
    out.detail(&format!(
        "User email: {}",
        user.email.as_deref().unwrap_or("n/a")
    ));
    Ok(())
}
