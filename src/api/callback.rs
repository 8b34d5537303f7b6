use std::{collections::HashMap, future::Future, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    error::SyncError,
    spotify,
    types::{PkceToken, Token},
    warning,
};

/// Completes the PKCE flow: exchanges `code` for a token and stores it in
/// the shared state the authorization flow is polling.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PkceToken>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        warning!("Authorization denied: {}", error);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    complete_authorization(&shared_state, code, |code, verifier| async move {
        spotify::auth::exchange_code_pkce(&Client::new(), &code, &verifier).await
    })
    .await
}

/// Exchanges `code` with the stored verifier and stores the token.
///
/// The state lock is only held to read the verifier and to store the token,
/// never across the exchange itself.
async fn complete_authorization<F, Fut>(
    shared_state: &Arc<Mutex<Option<PkceToken>>>,
    code: &str,
    exchange: F,
) -> Html<&'static str>
where
    F: FnOnce(String, String) -> Fut,
    Fut: Future<Output = Result<Token, SyncError>>,
{
    let verifier = match shared_state.lock().await.as_ref() {
        Some(pkce_state) => pkce_state.code_verifier.clone(),
        None => return Html("<h4>Missing PKCE code verifier.</h4>"),
    };

    match exchange(code.to_string(), verifier).await {
        Ok(token) => {
            if let Some(pkce_state) = shared_state.lock().await.as_mut() {
                pkce_state.token = Some(token);
            }
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
