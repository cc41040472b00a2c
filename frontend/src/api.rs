use std::rc::Rc;

use async_trait::async_trait;
use gloo::storage::{SessionStorage, Storage};
use gloo_net::http::Request;
use log::{debug, warn};
use parking_core::api::{HttpRequest, HttpResponse, HttpTransport, Method, ParkingApi};
use parking_core::error::TransportError;
use parking_core::password::PwnedPasswords;
use parking_core::session::cognito::{StoredTokens, TokenStore};
use parking_core::SessionManager;

/// API typée, jeton Bearer lu sur la session à chaque appel.
pub type Api = ParkingApi<Rc<GlooTransport>, Rc<SessionManager>>;
pub type Breach = PwnedPasswords<Rc<GlooTransport>>;

/* ---------------- transport fetch() via gloo-net ------------------------ */

#[derive(Debug, Default)]
pub struct GlooTransport;

fn transport_error(e: gloo_net::Error) -> TransportError {
    TransportError(e.to_string())
}

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Patch => Request::patch(&request.url),
            Method::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(transport_error)?;

        let resp = prepared.send().await.map_err(transport_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;
        Ok(HttpResponse { status, body })
    }
}

/* ---------------- jetons dans sessionStorage ---------------------------- */

const TOKENS_KEY: &str = "parking.tokens";

/// Scoped to the tab: closing it ends the session.
#[derive(Debug, Default)]
pub struct SessionStorageTokenStore;

impl TokenStore for SessionStorageTokenStore {
    fn load(&self) -> Option<StoredTokens> {
        SessionStorage::get(TOKENS_KEY).ok()
    }

    fn save(&self, tokens: &StoredTokens) {
        if let Err(e) = SessionStorage::set(TOKENS_KEY, tokens) {
            warn!("sessionStorage: {e}");
        }
    }

    fn clear(&self) {
        SessionStorage::delete(TOKENS_KEY);
    }
}
