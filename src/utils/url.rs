//! URL helpers for talking to the chat gateway
//!
//! The gateway base URL comes from config, a flag, or an environment
//! variable, so it may or may not carry trailing slashes. Routes are
//! always joined through these helpers to avoid double slashes.

/// Normalize a base URL by removing trailing slashes.
///
/// # Examples
///
/// ```
/// use vortex::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000///"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a route onto a base URL with exactly one slash between them.
///
/// # Examples
///
/// ```
/// use vortex::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000", "api/chat/stream"),
///     "http://localhost:8000/api/chat/stream"
/// );
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/api/models"),
///     "http://localhost:8000/api/models"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
