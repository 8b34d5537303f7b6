use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config,
    error::SyncError,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token, TokenResponse},
    utils, warning,
};

const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Returns a valid token for `username`, authorizing interactively if needed.
///
/// A cached token is used when present, refreshed first if it is about to
/// expire. When there is no usable cached token the interactive PKCE flow
/// runs. Any failure is an [`SyncError::AuthenticationFailed`].
pub async fn authenticate(client: &Client, username: &str) -> Result<Token, SyncError> {
    match TokenManager::load(username).await {
        Ok(mut manager) => match manager.get_valid_token(client).await {
            Ok(_) => return Ok(manager.current_token().clone()),
            Err(e) => warning!("Cached token for {} is unusable: {}", username, e),
        },
        Err(e) => log::debug!("No cached token for {username}: {e}"),
    }

    authorize(username).await
}

/// Runs the OAuth 2.0 PKCE authorization flow and caches the token.
///
/// 1. Generates the code verifier and its SHA256 challenge
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the browser
/// 4. Waits for the callback to exchange the code for a token
/// 5. Persists the token for `username`
///
/// Gives up after two minutes without a callback.
pub async fn authorize(username: &str) -> Result<Token, SyncError> {
    let client_id = config::spotify_client_id()?;
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let shared_state: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        token: None,
    })));

    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move { start_api_server(server_state).await });

    let auth_url = match authorization_url(
        &config::spotify_apiauth_url(),
        &client_id,
        &config::spotify_redirect_uri(),
        &code_challenge,
        &config::spotify_scope(),
    ) {
        Ok(url) => url,
        Err(e) => {
            server.abort();
            return Err(e);
        }
    };

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(&shared_state, &server).await;
    server.abort();

    let Some(token) = token else {
        return Err(SyncError::AuthenticationFailed(
            "authorization failed or timed out".to_string(),
        ));
    };

    let manager = TokenManager::new(username, token.clone());
    if let Err(e) = manager.persist().await {
        warning!("Failed to save token to cache: {}", e);
    }

    success!("Authorized Spotify account {}", username);
    Ok(token)
}

/// Authorization endpoint URL with every query parameter percent-encoded.
pub fn authorization_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    code_challenge: &str,
    scope: &str,
) -> Result<String, SyncError> {
    reqwest::Url::parse_with_params(
        auth_url,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", scope),
        ],
    )
    .map(String::from)
    .map_err(|e| SyncError::Config(format!("invalid SPOTIFY_API_AUTH_URL '{auth_url}': {e}")))
}

/// Polls the shared state until the callback stored a token.
///
/// Stops early if the callback server died, e.g. because its address was taken.
async fn wait_for_token(
    shared_state: &Arc<Mutex<Option<PkceToken>>>,
    server: &tokio::task::JoinHandle<crate::Res<()>>,
) -> Option<Token> {
    let poll = async {
        loop {
            let token = shared_state
                .lock()
                .await
                .as_ref()
                .and_then(|pkce| pkce.token.clone());
            if token.is_some() {
                return token;
            }
            if server.is_finished() {
                warning!("Callback server stopped before authorization completed.");
                return None;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    };

    tokio::time::timeout(AUTHORIZATION_TIMEOUT, poll)
        .await
        .ok()
        .flatten()
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may omit the refresh token in the answer; the old one is kept then.
pub async fn refresh_token(client: &Client, refresh_token: &str) -> Result<Token, SyncError> {
    let client_id = config::spotify_client_id()?;
    let response = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id.as_str()),
        ])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| SyncError::AuthenticationFailed(format!("token refresh failed: {e}")))?;

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| SyncError::AuthenticationFailed(format!("token refresh failed: {e}")))?;

    Ok(token_from_response(body, refresh_token))
}

/// Exchanges the authorization code from the callback for a token.
pub async fn exchange_code_pkce(
    client: &Client,
    code: &str,
    verifier: &str,
) -> Result<Token, SyncError> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();

    let response = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| SyncError::AuthenticationFailed(format!("code exchange failed: {e}")))?;

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| SyncError::AuthenticationFailed(format!("code exchange failed: {e}")))?;

    Ok(token_from_response(body, ""))
}

pub fn token_from_response(body: TokenResponse, previous_refresh_token: &str) -> Token {
    Token {
        access_token: body.access_token,
        refresh_token: body
            .refresh_token
            .unwrap_or_else(|| previous_refresh_token.to_string()),
        scope: body.scope,
        expires_in: body.expires_in.unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    }
}
