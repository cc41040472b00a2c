//! Client core of the parking allocation app.
//!
//! Everything with decision logic lives here and builds both natively (for
//! tests) and for `wasm32` (for the Yew front):
//!
//! - `session`: session state machine over an identity provider
//! - `claims`: permissions read from the id token
//! - `guard`: route gates and the login round trip
//! - `calendar`: week datasets, pending edits and diff-only saves
//! - `api`: bearer-authenticated JSON endpoints

pub mod api;
pub mod calendar;
pub mod claims;
pub mod config;
pub mod error;
pub mod guard;
pub mod password;
pub mod session;

pub use claims::{Claims, ClaimsResolver, ClaimsState, Permission};
pub use config::ClientConfig;
pub use session::{SessionManager, SessionStatus};
