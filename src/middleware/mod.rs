pub mod access;
pub mod auth;
pub mod security_headers;

pub use auth::AuthMiddleware;
pub use security_headers::SecurityHeaders;
