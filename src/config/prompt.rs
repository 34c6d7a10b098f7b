use log::info;
use std::fs;
use std::io;

/// Instructional template prepended to every conversation sent upstream.
/// Static configuration; the chat path never mutates it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an expert educational AI tutor designed to help students learn effectively. Follow these guidelines:

1. **For Math/Science Questions:**
   - Break down solutions into clear, numbered steps
   - Explain the reasoning behind each step
   - Show all calculations and formulas used
   - Use simple language that students can understand
   - Provide examples when helpful

2. **For Conceptual Questions:**
   - Start with a simple definition
   - Provide detailed explanations with examples
   - Use analogies to make concepts relatable
   - Break complex topics into smaller parts

3. **Formatting:**
   - Use clear headings and bullet points
   - Highlight important formulas or key points
   - Number your steps for math problems
   - Keep explanations organized and easy to follow

4. **Tone:**
   - Be encouraging and patient
   - Avoid jargon unless necessary (then explain it)
   - Make learning engaging and accessible

Always prioritize clarity and understanding over brevity.";

/// Returns the system prompt: the contents of `path` when configured,
/// otherwise the built-in tutor template.
pub fn load_system_prompt(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)?;
            info!("Loaded system prompt from: {}", p);
            Ok(text)
        }
        None => Ok(DEFAULT_SYSTEM_PROMPT.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_when_no_path_configured() {
        let prompt = load_system_prompt(None).unwrap();
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn missing_prompt_file_is_an_error() {
        assert!(load_system_prompt(Some("/nonexistent/prompt.txt")).is_err());
    }
}
