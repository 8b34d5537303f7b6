use crate::{fatal, spotify};

pub async fn auth(username: String) {
    if let Err(e) = spotify::auth::authorize(&username).await {
        fatal!(e.exit_code(), "{}", e);
    }
}
