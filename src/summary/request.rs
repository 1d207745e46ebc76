use crate::error::SummarizeError;
use crate::summary::config::ApiConfig;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

pub const SUMMARY_PROMPT: &str = "Summarize the following text without any additional answer. Answer in the language the user speaks:";

/// Raw outcome of one completion call, before classification.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// One outbound chat-completion POST. Implementations must not retry.
pub trait CompletionTransport {
    fn send(&self, payload: &Value) -> Result<HttpReply, SummarizeError>;
}

pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    api_key: String,
    site_url: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(api: &ApiConfig, api_key: String) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|err| SummarizeError::Network(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: api.endpoint.trim().to_string(),
            api_key,
            site_url: api.site_url.clone(),
            app_title: api.app_title.clone(),
        })
    }
}

impl CompletionTransport for OpenRouterClient {
    fn send(&self, payload: &Value) -> Result<HttpReply, SummarizeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_title)
            .json(payload)
            .send()
            .map_err(|err| SummarizeError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| SummarizeError::Network(format!("failed to read response: {err}")))?;
        Ok(HttpReply { status, body })
    }
}

pub fn build_prompt(input_text: &str) -> String {
    format!("{SUMMARY_PROMPT}\n\n{input_text}")
}

pub fn build_payload(model_id: &str, input_text: &str, api: &ApiConfig) -> Value {
    serde_json::json!({
        "model": model_id,
        "messages": [
            {"role": "user", "content": build_prompt(input_text)}
        ],
        "max_tokens": api.max_tokens,
        "temperature": api.temperature
    })
}

fn remote_message(status: u16, body: &str) -> String {
    let server_message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToOwned::to_owned)
    });
    if let Some(message) = server_message {
        return message;
    }
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("");
    format!("Error {status}: {reason}").trim_end().to_string()
}

fn extract_message_content(json: &Value) -> Option<String> {
    let choices = json.get("choices").and_then(Value::as_array)?;
    let first = choices.first()?;
    let content = first.get("message")?.get("content")?;
    match content {
        Value::String(s) => Some(s.to_string()),
        Value::Array(parts) => {
            let chunks: Vec<&str> = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            if chunks.is_empty() {
                None
            } else {
                Some(chunks.join("\n"))
            }
        }
        _ => None,
    }
}

/// Turn a reply into the summary text or the matching error class.
pub fn interpret_reply(reply: &HttpReply) -> Result<String, SummarizeError> {
    match reply.status {
        200..=299 => {}
        401 => return Err(SummarizeError::Auth),
        429 => return Err(SummarizeError::RateLimited),
        402 => return Err(SummarizeError::QuotaExhausted),
        status => {
            return Err(SummarizeError::Remote {
                status,
                message: remote_message(status, &reply.body),
            });
        }
    }

    let json: Value = serde_json::from_str(&reply.body)
        .map_err(|err| SummarizeError::Network(format!("failed to parse response: {err}")))?;
    extract_message_content(&json).ok_or(SummarizeError::ResponseShape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AUTH_MESSAGE, QUOTA_MESSAGE, RATE_LIMIT_MESSAGE};
    use serde_json::json;

    fn reply(status: u16, body: &str) -> HttpReply {
        HttpReply {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn payload_carries_model_prompt_and_sampling() {
        let api = ApiConfig::default();
        let payload = build_payload("google/gemini-2.0-flash-exp:free", "Some text", &api);
        assert_eq!(payload["model"], "google/gemini-2.0-flash-exp:free");
        assert_eq!(payload["messages"][0]["role"], "user");
        let content = payload["messages"][0]["content"].as_str().expect("content");
        assert!(content.starts_with(SUMMARY_PROMPT));
        assert!(content.ends_with("\n\nSome text"));
        assert_eq!(payload["max_tokens"], 1000);
        assert_eq!(payload["temperature"], 0.7);
    }

    #[test]
    fn fixed_statuses_map_to_fixed_messages() {
        let err = interpret_reply(&reply(401, "{}")).expect_err("401");
        assert_eq!(err.to_string(), AUTH_MESSAGE);
        let err = interpret_reply(&reply(429, "")).expect_err("429");
        assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
        let err = interpret_reply(&reply(402, "{\"error\":{\"message\":\"x\"}}")).expect_err("402");
        assert_eq!(err.to_string(), QUOTA_MESSAGE);
    }

    #[test]
    fn other_statuses_prefer_server_message() {
        let body = json!({"error": {"message": "model not found"}}).to_string();
        let err = interpret_reply(&reply(404, &body)).expect_err("404");
        assert_eq!(err.to_string(), "model not found");
    }

    #[test]
    fn other_statuses_fall_back_to_status_text() {
        let err = interpret_reply(&reply(503, "<html>bad gateway</html>")).expect_err("503");
        assert_eq!(err.to_string(), "Error 503: Service Unavailable");
        assert!(matches!(err, SummarizeError::Remote { status: 503, .. }));
    }

    #[test]
    fn success_reads_first_choice_content() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "A short summary."}}]
        })
        .to_string();
        assert_eq!(
            interpret_reply(&reply(200, &body)).expect("ok"),
            "A short summary."
        );
    }

    #[test]
    fn success_joins_content_parts() {
        let body = json!({
            "choices": [{"message": {"content": [{"type": "text", "text": "one"}, {"type": "text", "text": "two"}]}}]
        })
        .to_string();
        assert_eq!(interpret_reply(&reply(200, &body)).expect("ok"), "one\ntwo");
    }

    #[test]
    fn success_without_choices_is_a_shape_error() {
        let err = interpret_reply(&reply(200, "{\"choices\":[]}")).expect_err("shape");
        assert!(matches!(err, SummarizeError::ResponseShape));
        let err = interpret_reply(&reply(200, "{\"id\":\"x\"}")).expect_err("shape");
        assert!(matches!(err, SummarizeError::ResponseShape));
    }

    #[test]
    fn success_with_non_json_body_is_a_network_error() {
        let err = interpret_reply(&reply(200, "<html>")).expect_err("parse");
        assert!(matches!(err, SummarizeError::Network(_)));
    }
}
