use serde_json::Value;

/// Instructions given to the chat model ahead of every consultant question
pub const CONSULTANT_SYSTEM_PROMPT: &str = "You are an experienced business consultant for small private healthcare clinics. \
You help clinic owners understand their revenue, expenses, invoicing and patient retention. \
Base your answers on the clinic data provided, say so when the data is insufficient, \
and keep recommendations concrete and practical. Never give medical advice about individual patients.";

/// Builds the user message from the question and optional clinic data
pub fn consultant_user_prompt(question: &str, context: Option<&Value>) -> String {
    match context {
        Some(context) if !context.is_null() => {
            let context = serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
            format!(
                "{}\n\nClinic data (JSON):\n{}",
                question.trim(),
                context
            )
        }
        _ => question.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn includes_context_when_present() {
        let prompt = consultant_user_prompt(" How is revenue? ", Some(&json!({ "revenue": 1200 })));
        assert!(prompt.starts_with("How is revenue?\n\nClinic data (JSON):\n"));
        assert!(prompt.contains("\"revenue\": 1200"));

        assert_eq!(consultant_user_prompt("Hi", None), "Hi");
        assert_eq!(consultant_user_prompt("Hi", Some(&Value::Null)), "Hi");
    }
}
