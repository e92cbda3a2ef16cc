// src/llm/mod.rs

use std::fmt;
use std::time::Duration;

use regex::Regex;
use serde_json::{Value, json};

/// Failure of a single collaborator HTTP call.
#[derive(Debug, Clone)]
pub enum LlmError {
    /// Transport-level failure: connect, timeout, body read.
    Request(String),
    /// Non-success HTTP status, with a truncated response body.
    Status { code: u16, body: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Request(e) => write!(f, "request failed: {}", e),
            LlmError::Status { code, body } => write!(f, "status {}: {}", code, body),
        }
    }
}

impl std::error::Error for LlmError {}

/// One call to the responses API.
#[derive(Clone, Debug)]
pub struct ResponseRequest {
    pub model: String,
    pub input: Vec<Value>,
    pub tools: Vec<Value>,
    pub response_format: Option<Value>,
    pub store: bool,
    pub previous_response_id: Option<String>,
    pub max_output_tokens: Option<u32>,
}

impl ResponseRequest {
    pub fn new(model: &str, input: Vec<Value>) -> Self {
        Self {
            model: model.to_string(),
            input,
            tools: Vec::new(),
            response_format: None,
            store: false,
            previous_response_id: None,
            max_output_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_response_format(mut self, format: Value) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_store(mut self, store: bool) -> Self {
        self.store = store;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// Blocking client for the xAI responses API (OpenAI-compatible REST).
pub struct GrokClient {
    base_url: String,
    api_key: String,
    timeout: Duration,
    http: reqwest::blocking::Client,
}

impl GrokClient {
    pub fn new(base_url: &str, api_key: &str, timeout_s: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(timeout_s),
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn create_response(&self, req: &ResponseRequest) -> Result<Value, LlmError> {
        let mut payload = json!({
            "model": req.model,
            "input": req.input,
            "store": req.store,
        });
        if !req.tools.is_empty() {
            payload["tools"] = Value::Array(req.tools.clone());
        }
        if let Some(format) = &req.response_format {
            payload["response_format"] = format.clone();
        }
        if let Some(prev) = &req.previous_response_id {
            payload["previous_response_id"] = Value::String(prev.clone());
        }
        if let Some(max) = req.max_output_tokens {
            payload["max_output_tokens"] = Value::from(max);
        }

        let url = format!("{}/v1/responses", self.base_url);
        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().unwrap_or_default();
            body.truncate(2000);
            return Err(LlmError::Status { code: status.as_u16(), body });
        }
        resp.json::<Value>()
            .map_err(|e| LlmError::Request(e.to_string()))
    }
}

/// Collects the text parts of a responses-API reply.
pub fn extract_output_text(resp: &Value) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(output) = resp.get("output").and_then(|v| v.as_array()) {
        for item in output {
            if item.get("type").and_then(|v| v.as_str()) != Some("message") {
                continue;
            }
            if let Some(content) = item.get("content").and_then(|v| v.as_array()) {
                for c in content {
                    match c.get("type").and_then(|v| v.as_str()) {
                        Some("output_text") | Some("text") => {
                            if let Some(text) = c.get("text").and_then(|v| v.as_str()) {
                                parts.push(text);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    // Some SDKs put plain text under `content` instead.
    if parts.is_empty() {
        if let Some(content) = resp.get("content") {
            return match content.as_str() {
                Some(s) => s.trim().to_string(),
                None => content.to_string(),
            };
        }
    }
    parts.concat().trim().to_string()
}

/// Cuts the first JSON object out of raw model output, dropping code fences
/// and thinking markers first.
pub fn extract_json_block(raw: &str) -> Option<String> {
    let cleaned = raw
        .lines()
        .filter(|line| {
            let t = line.trim_start();
            !t.starts_with("```") && !t.starts_with("<think>") && !t.starts_with("</think>")
        })
        .collect::<Vec<_>>()
        .join("\n");

    Regex::new(r"\{[\s\S]*\}")
        .unwrap()
        .find(&cleaned)
        .map(|m| m.as_str().to_string())
}

/// OpenAI-style strict json_schema response format wrapper.
pub fn response_format(name: &str, schema: Value) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "schema": schema,
            "strict": true,
        },
    })
}
