//! Endpoint paths for the Gemini API.

/// Base path for models endpoints.
pub const MODELS: &str = "/models";

/// Constructs a path for the generateContent endpoint.
///
/// Accepts both bare model ids and fully-qualified `models/...` names.
///
/// # Example
///
/// ```
/// use gemini_gateway::transport::endpoints;
///
/// assert_eq!(
///     endpoints::generate_content("gemini-2.0-flash"),
///     "/models/gemini-2.0-flash:generateContent"
/// );
/// assert_eq!(
///     endpoints::generate_content("models/gemini-2.0-flash"),
///     "/models/gemini-2.0-flash:generateContent"
/// );
/// ```
pub fn generate_content(model: &str) -> String {
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{MODELS}/{model}:generateContent")
}
