use anyhow::Result;
use serde_json::Value;

/// Agent that researches the product and authors the video scripts.
pub const MANAGER_AGENT_ID: &str = "production-manager";
/// Agent that produces storyboard frames and thumbnail descriptions.
pub const VISUAL_AGENT_ID: &str = "visual-generator";

const AGENT_SERVICE_URL: &str = "http://127.0.0.1:8010";

/// Raw result envelope of one agent invocation. `result` is the unstructured
/// JSON payload handed to normalization; `None` means the service reported
/// success but supplied no payload. `artifact_urls` come from the
/// module-outputs side-channel, independent of `result`.
#[derive(Debug, Clone, Default)]
pub struct AgentReply {
    pub result: Option<Value>,
    pub artifact_urls: Vec<String>,
}

#[async_trait::async_trait]
pub trait AgentBackend: Send + Sync {
    async fn invoke(&self, prompt: &str, agent_id: &str) -> Result<AgentReply>;
}

pub struct HttpAgentBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpAgentBackend {
    pub fn from_env() -> Self {
        HttpAgentBackend {
            client: reqwest::Client::new(),
            base_url: std::env::var("REELFORGE_AGENT_URL")
                .unwrap_or_else(|_| AGENT_SERVICE_URL.to_string()),
            api_key: std::env::var("REELFORGE_API_KEY").ok(),
        }
    }
}

#[async_trait::async_trait]
impl AgentBackend for HttpAgentBackend {
    async fn invoke(&self, prompt: &str, agent_id: &str) -> Result<AgentReply> {
        let mut request = self
            .client
            .post(format!("{}/invoke", self.base_url))
            .json(&serde_json::json!({
                "message": prompt,
                "agent_id": agent_id,
            }));
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Agent service error: {} - {}",
                status,
                error_text
            ));
        }

        let body: Value = response.json().await?;
        parse_envelope(&body)
    }
}

/// Split the service envelope into the structured payload and the artifact
/// side-channel. A missing or null `response.result` is a valid (empty)
/// success; a false `success` flag is a failure.
fn parse_envelope(body: &Value) -> Result<AgentReply> {
    if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return Err(anyhow::anyhow!("Agent service reported failure"));
    }

    let result = body
        .pointer("/response/result")
        .filter(|v| !v.is_null())
        .cloned();

    let artifact_urls = body
        .pointer("/module_outputs/artifact_files")
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .filter_map(|f| f.get("file_url").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(AgentReply {
        result,
        artifact_urls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_with_result_and_artifacts() {
        let reply = parse_envelope(&json!({
            "success": true,
            "response": { "result": { "videos": [] } },
            "module_outputs": {
                "artifact_files": [
                    { "file_url": "https://cdn.example/a.png" },
                    { "not_a_url": true },
                    { "file_url": "https://cdn.example/b.png" },
                ],
            },
        }))
        .unwrap();

        assert_eq!(reply.result, Some(json!({ "videos": [] })));
        assert_eq!(
            reply.artifact_urls,
            vec!["https://cdn.example/a.png", "https://cdn.example/b.png"]
        );
    }

    #[test]
    fn success_without_payload_is_an_empty_reply() {
        let reply = parse_envelope(&json!({ "success": true })).unwrap();
        assert!(reply.result.is_none());
        assert!(reply.artifact_urls.is_empty());

        let null_result = parse_envelope(&json!({
            "success": true,
            "response": { "result": null },
        }))
        .unwrap();
        assert!(null_result.result.is_none());
    }

    #[test]
    fn unsuccessful_or_malformed_envelope_is_an_error() {
        assert!(parse_envelope(&json!({ "success": false })).is_err());
        assert!(parse_envelope(&json!({})).is_err());
        assert!(parse_envelope(&json!({ "success": "yes" })).is_err());
    }

    #[test]
    fn artifacts_are_independent_of_the_structured_payload() {
        let reply = parse_envelope(&json!({
            "success": true,
            "module_outputs": {
                "artifact_files": [{ "file_url": "https://cdn.example/thumb.png" }],
            },
        }))
        .unwrap();
        assert!(reply.result.is_none());
        assert_eq!(reply.artifact_urls, vec!["https://cdn.example/thumb.png"]);
    }
}
