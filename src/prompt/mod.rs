//! Prompt shaping for structured output.

/// Appended to prompts when the caller asks for a JSON response.
pub const JSON_OUTPUT_INSTRUCTION: &str = "IMPORTANT: Respond ONLY with valid JSON. \
Do not wrap the JSON in markdown code fences. \
Do not include any explanation, commentary or text outside the JSON value.";

/// Return `prompt`, followed by [`JSON_OUTPUT_INSTRUCTION`] when `wants_json` is set.
///
/// # Example
///
/// ```
/// use gemini_gateway::prompt::{format_prompt, JSON_OUTPUT_INSTRUCTION};
///
/// assert_eq!(format_prompt("Say hi", false), "Say hi");
/// assert_eq!(
///     format_prompt("Say hi", true),
///     format!("Say hi\n\n{JSON_OUTPUT_INSTRUCTION}")
/// );
/// ```
pub fn format_prompt(prompt: &str, wants_json: bool) -> String {
    if wants_json {
        format!("{prompt}\n\n{JSON_OUTPUT_INSTRUCTION}")
    } else {
        prompt.to_string()
    }
}
