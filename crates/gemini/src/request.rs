use {orion_relay::Turn, serde_json::json};

use crate::config::{GeminiConfig, ToolConfig};

/// Convert turns to Gemini `contents`: `{ role, parts: [{ text }] }`.
pub fn to_gemini_contents(turns: &[Turn]) -> Vec<serde_json::Value> {
    turns
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role,
                "parts": [{ "text": turn.text }],
            })
        })
        .collect()
}

fn to_gemini_tools(tools: ToolConfig) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    if tools.code_execution {
        out.push(json!({ "codeExecution": {} }));
    }
    if tools.google_search {
        out.push(json!({ "googleSearch": {} }));
    }
    out
}

/// Full `streamGenerateContent` request body.
pub fn request_body(config: &GeminiConfig, turns: &[Turn]) -> serde_json::Value {
    let mut body = json!({ "contents": to_gemini_contents(turns) });

    if !config.system_instruction.is_empty() {
        body["systemInstruction"] = json!({
            "parts": [{ "text": config.system_instruction }]
        });
    }

    let tools = to_gemini_tools(config.tools);
    if !tools.is_empty() {
        body["tools"] = serde_json::Value::Array(tools);
    }

    body
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    #[test]
    fn contents_keep_order_and_roles() {
        let turns = vec![Turn::user("2+2?"), Turn::model("4"), Turn::user("and 3+3?")];
        let contents = to_gemini_contents(&turns);

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "4");
        assert_eq!(contents[2]["parts"][0]["text"], "and 3+3?");
    }

    #[test]
    fn body_carries_tools_and_system_instruction() {
        let mut cfg = GeminiConfig::new(Secret::new("k".into()));
        cfg.system_instruction = "be brief".into();
        let body = request_body(&cfg, &[Turn::user("hi")]);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert!(tools[0].get("codeExecution").is_some());
        assert!(tools[1].get("googleSearch").is_some());
    }

    #[test]
    fn disabled_tools_and_blank_instruction_are_omitted() {
        let mut cfg = GeminiConfig::new(Secret::new("k".into()));
        cfg.system_instruction = String::new();
        cfg.tools = ToolConfig {
            google_search: false,
            code_execution: false,
        };
        let body = request_body(&cfg, &[Turn::user("hi")]);

        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("tools").is_none());
    }
}
