//! Conversion between core message types and the Anthropic Messages API
//! wire format.

use osai_core::{ContentPart, Message, TokenUsage, ToolDescriptor, ToolKind};
use serde_json::{Map, Value, json};

use crate::provider::{LlmRequest, LlmResponse, ProviderError, ProviderResult};

/// Options that shape the request body but come from client config.
pub struct BodyOptions<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// Output token cap.
    pub max_tokens: u32,
    /// Tool `type` used for computer-use declarations lacking one.
    pub computer_tool_type: &'a str,
}

/// Build the `POST /v1/messages` body.
pub fn request_body(request: &LlmRequest<'_>, options: &BodyOptions<'_>) -> Value {
    let mut body = json!({
        "model": options.model,
        "max_tokens": options.max_tokens,
        "messages": request.messages.iter().map(message_to_wire).collect::<Vec<_>>(),
    });
    if !request.system.is_empty() {
        body["system"] = Value::String(request.system.to_owned());
    }
    if !request.tools.is_empty() {
        body["tools"] = Value::Array(
            request
                .tools
                .iter()
                .map(|t| tool_to_wire(t, options.computer_tool_type))
                .collect(),
        );
    }
    body
}

fn message_to_wire(message: &Message) -> Value {
    json!({
        "role": message.role,
        "content": message.content.iter().map(part_to_wire).collect::<Vec<_>>(),
    })
}

fn part_to_wire(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!({"type": "text", "text": text}),
        ContentPart::Image { media_type, data } => json!({
            "type": "image",
            "source": {"type": "base64", "media_type": media_type, "data": data},
        }),
        ContentPart::ToolUse { id, name, input } => json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "input": input,
        }),
        ContentPart::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content.iter().map(part_to_wire).collect::<Vec<_>>(),
            "is_error": is_error,
        }),
    }
}

fn tool_to_wire(tool: &ToolDescriptor, computer_tool_type: &str) -> Value {
    let mut wire = Map::new();
    match tool.kind {
        ToolKind::ComputerUse => {
            let _ = wire.insert("type".into(), Value::String(computer_tool_type.to_owned()));
            let _ = wire.insert("name".into(), Value::String(tool.name.clone()));
            for (key, value) in &tool.config {
                let _ = wire.insert(key.clone(), value.clone());
            }
        }
        ToolKind::Function => {
            let _ = wire.insert("name".into(), Value::String(tool.name.clone()));
            if let Some(description) = tool.config.get("description").filter(|d| !d.is_null()) {
                let _ = wire.insert("description".into(), description.clone());
            }
            let schema = tool
                .config
                .get("input_schema")
                .cloned()
                .unwrap_or_else(|| json!({"type": "object", "properties": {}}));
            let _ = wire.insert("input_schema".into(), schema);
        }
    }
    Value::Object(wire)
}

/// Parse a successful response body.
///
/// Unknown content block types are skipped.
pub fn parse_response(body: &Value) -> ProviderResult<LlmResponse> {
    let blocks = body["content"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed {
            message: "response has no content array".into(),
        })?;

    let mut content = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block["type"].as_str() {
            Some("text") => {
                let text = block["text"].as_str().unwrap_or_default();
                content.push(ContentPart::text(text));
            }
            Some("tool_use") => {
                let (Some(id), Some(name)) = (block["id"].as_str(), block["name"].as_str()) else {
                    return Err(ProviderError::Malformed {
                        message: "tool_use block without id or name".into(),
                    });
                };
                content.push(ContentPart::ToolUse {
                    id: id.to_owned(),
                    name: name.to_owned(),
                    input: block.get("input").cloned().unwrap_or_else(|| json!({})),
                });
            }
            other => tracing::debug!(block_type = ?other, "skipping content block"),
        }
    }

    let usage = TokenUsage {
        input_tokens: body["usage"]["input_tokens"].as_u64().unwrap_or(0),
        output_tokens: body["usage"]["output_tokens"].as_u64().unwrap_or(0),
    };

    Ok(LlmResponse {
        content,
        usage,
        stop_reason: body["stop_reason"].as_str().map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const OPTS: BodyOptions<'static> = BodyOptions {
        model: "claude-test",
        max_tokens: 1024,
        computer_tool_type: "computer_20250124",
    };

    #[test]
    fn body_includes_system_messages_and_computer_tool() {
        let messages = vec![Message::user_text("open safari")];
        let tools = vec![
            ToolDescriptor::new("computer", ToolKind::ComputerUse)
                .with("display_width_px", 1280)
                .with("display_height_px", 800),
        ];
        let req = LlmRequest {
            system: "be careful",
            messages: &messages,
            tools: &tools,
        };
        let body = request_body(&req, &OPTS);
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["system"], "be careful");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "open safari");
        assert_eq!(body["tools"][0]["type"], "computer_20250124");
        assert_eq!(body["tools"][0]["name"], "computer");
        assert_eq!(body["tools"][0]["display_width_px"], 1280);
    }

    #[test]
    fn descriptor_type_overrides_default() {
        let tools = vec![ToolDescriptor::new("computer", ToolKind::ComputerUse).with("type", "computer_20241022")];
        let req = LlmRequest {
            system: "",
            messages: &[],
            tools: &tools,
        };
        let body = request_body(&req, &OPTS);
        assert_eq!(body["tools"][0]["type"], "computer_20241022");
        assert!(body.get("system").is_none());
    }

    #[test]
    fn function_tool_wire_shape() {
        let tools = vec![ToolDescriptor::new("lookup", ToolKind::Function).with("description", "find")];
        let req = LlmRequest {
            system: "",
            messages: &[],
            tools: &tools,
        };
        let body = request_body(&req, &OPTS);
        assert_eq!(body["tools"][0]["description"], "find");
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
    }

    #[test]
    fn function_tool_without_description_omits_field() {
        let tools = vec![
            ToolDescriptor::new("lookup", ToolKind::Function),
            ToolDescriptor::new("search", ToolKind::Function).with("description", Value::Null),
        ];
        let req = LlmRequest {
            system: "",
            messages: &[],
            tools: &tools,
        };
        let body = request_body(&req, &OPTS);
        assert!(body["tools"][0].get("description").is_none());
        assert!(body["tools"][1].get("description").is_none());
        assert_eq!(body["tools"][1]["name"], "search");
    }

    #[test]
    fn tool_result_with_image_encodes_nested_source() {
        let messages = vec![Message::user(vec![ContentPart::ToolResult {
            tool_use_id: "t1".into(),
            content: vec![ContentPart::image("image/png", b"png")],
            is_error: false,
        }])];
        let req = LlmRequest {
            system: "",
            messages: &messages,
            tools: &[],
        };
        let body = request_body(&req, &OPTS);
        let block = &body["messages"][0]["content"][0];
        assert_eq!(block["type"], "tool_result");
        assert_eq!(block["content"][0]["source"]["type"], "base64");
        assert_eq!(block["content"][0]["source"]["media_type"], "image/png");
    }

    #[test]
    fn parse_text_and_tool_use() {
        let body = json!({
            "content": [
                {"type": "text", "text": "Taking a screenshot"},
                {"type": "tool_use", "id": "toolu_1", "name": "computer", "input": {"action": "screenshot"}},
                {"type": "thinking", "thinking": "..."}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 30}
        });
        let resp = parse_response(&body).unwrap();
        assert_eq!(resp.content.len(), 2);
        assert_eq!(resp.usage.input_tokens, 120);
        assert_eq!(resp.usage.output_tokens, 30);
        assert_eq!(resp.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(resp.tool_calls()[0].input["action"], "screenshot");
    }

    #[test]
    fn parse_missing_content_is_malformed() {
        let err = parse_response(&json!({"usage": {}})).unwrap_err();
        assert_matches!(err, ProviderError::Malformed { .. });
    }
}
