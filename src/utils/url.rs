//! Endpoint construction for the generative service.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use parley::utils::url::normalize_base_url;
///
/// assert_eq!(
///     normalize_base_url("https://generativelanguage.googleapis.com/v1beta/"),
///     "https://generativelanguage.googleapis.com/v1beta"
/// );
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Build `{base}/models/{model}:{method}`.
///
/// # Examples
///
/// ```
/// use parley::utils::url::model_method_url;
///
/// assert_eq!(
///     model_method_url("https://example.test/v1beta/", "gemini-2.5-flash", "generateContent"),
///     "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
/// );
/// assert_eq!(
///     model_method_url(
///         "https://example.test/v1beta",
///         "models/imagen-4.0-generate-001",
///         "predict",
///     ),
///     "https://example.test/v1beta/models/imagen-4.0-generate-001:predict"
/// );
/// ```
pub fn model_method_url(base_url: &str, model: &str, method: &str) -> String {
    let model = model.trim_start_matches('/');
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{}/models/{}:{}", normalize_base_url(base_url), model, method)
}
