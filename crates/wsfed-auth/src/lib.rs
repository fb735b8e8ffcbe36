//! # wsfed-auth
//!
//! Adapts validated WS-Federation credentials to the host's authentication
//! contract.
//!
//! ## Features
//!
//! - Tagged [`Credentials`] variant handed to authentication handlers
//! - Principal resolution from a configured identity attribute
//! - The `wresult` callback boundary of the web flow
//!
//! ## Example
//!
//! ```ignore
//! use wsfed_auth::{CallbackOutcome, FederationCallback};
//!
//! wsfed_protocol::initialize();
//! let callback = FederationCallback::from_config(&config)?;
//!
//! match callback.handle(&form_params) {
//!     CallbackOutcome::NoToken => redirect_to_identity_provider(),
//!     CallbackOutcome::Authenticated(auth) => start_session(auth.principal),
//!     CallbackOutcome::Rejected { message } => show_error(message),
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod callback;
pub mod credentials;
pub mod error;
pub mod handler;
pub mod principal;

pub use callback::{CallbackOutcome, FederationCallback, LOGIN_FAILED, WRESULT};
pub use credentials::Credentials;
pub use error::{AuthError, AuthResult};
pub use handler::{Authentication, AuthenticationHandler, WsFederationAuthenticationHandler};
pub use principal::{populate_attributes, Principal, WsFederationPrincipalResolver};
