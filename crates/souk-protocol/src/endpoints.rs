//! Request paths, relative to the API base URL.
//!
//! These are part of the backend contract and must match byte for byte.

pub const LOGIN: &str = "/auth/login";
pub const SIGNUP: &str = "/auth/signup";
pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
pub const REFRESH_TOKEN: &str = "/auth/refresh-token";
pub const VERIFY_OTP: &str = "/auth/verify-otp";
pub const RESEND_OTP: &str = "/auth/resend-verification-otp";
pub const PROFILE: &str = "/user/profile";
pub const PRODUCTS: &str = "/products";
pub const POSTS: &str = "/posts";

/// Lifetime requested for every access token the client mints.
pub const TOKEN_EXPIRES_IN: &str = "1y";

/// Path of a single product.
pub fn product(id: &str) -> String {
    format!("{PRODUCTS}/{id}")
}

/// Whether a request to `path` must go out without a bearer token.
///
/// Login and signup are the only calls made before a session exists; they
/// never carry a token and never take part in refresh-and-retry.
pub fn is_unauthenticated(path: &str) -> bool {
    path.contains(LOGIN) || path.contains(SIGNUP)
}
