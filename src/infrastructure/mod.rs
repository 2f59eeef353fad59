pub mod sso;

pub use sso::{SsoCredentials, SsoTokenProvider, TokenError, TokenProvider};
