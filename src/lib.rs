//! Authentication boundary of the face-recognition service.
//!
//! Issues signed, short-lived session tokens at login, carries them in an
//! HTTP-only `access_token` cookie, and resolves them back into an identity on
//! every request.

pub mod clock;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod identity;
    pub mod user;
}

pub mod repositories {
    pub mod user;
}

pub mod services {
    pub mod credentials;
    pub mod registration;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
}
