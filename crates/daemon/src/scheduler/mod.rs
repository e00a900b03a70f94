use anyhow::Result;
use content::normalize::{bool_field, opt_bool_field, opt_str_field, str_field, u32_field};
use serde::Serialize;
use serde_json::Value;

pub mod controller;

/// The single remote schedule this application controls.
pub const SCHEDULE_ID: &str = "daily-video-generation";

const SCHEDULER_SERVICE_URL: &str = "http://127.0.0.1:8020";

/// Remote recurring-trigger resource. Read-only from this layer apart from
/// the pause/resume/trigger verbs.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub is_active: bool,
    pub cron_expression: String,
    pub timezone: String,
    pub next_run_time: Option<String>,
    pub last_run_at: Option<String>,
    pub last_run_success: Option<bool>,
}

/// One past invocation of the schedule, as reported by the service.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionLogEntry {
    pub id: String,
    pub executed_at: String,
    pub success: bool,
    pub attempt: u32,
    pub max_attempts: u32,
    pub response_status: String,
    pub error_message: Option<String>,
}

/// Parsed `get_schedule` envelope; the service reports failures in-band via
/// a `success` flag and an optional error string.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFetch {
    pub schedule: Option<Schedule>,
    pub error: Option<String>,
}

#[async_trait::async_trait]
pub trait SchedulerBackend: Send + Sync {
    async fn get_schedule(&self, id: &str) -> Result<ScheduleFetch>;
    async fn pause(&self, id: &str) -> Result<()>;
    async fn resume(&self, id: &str) -> Result<()>;
    async fn trigger_now(&self, id: &str) -> Result<()>;
    async fn get_logs(&self, id: &str, limit: usize) -> Result<Vec<ExecutionLogEntry>>;
}

fn schedule_from_value(value: &Value) -> Schedule {
    Schedule {
        is_active: bool_field(value, "is_active"),
        cron_expression: str_field(value, "cron_expression"),
        timezone: str_field(value, "timezone"),
        next_run_time: opt_str_field(value, "next_run_time"),
        last_run_at: opt_str_field(value, "last_run_at"),
        last_run_success: opt_bool_field(value, "last_run_success"),
    }
}

// The service reports HTTP-ish statuses either as strings or bare numbers.
fn status_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn log_entry_from_value(value: &Value) -> ExecutionLogEntry {
    ExecutionLogEntry {
        id: str_field(value, "id"),
        executed_at: str_field(value, "executed_at"),
        success: bool_field(value, "success"),
        attempt: u32_field(value, "attempt"),
        max_attempts: u32_field(value, "max_attempts"),
        response_status: status_field(value, "response_status"),
        error_message: opt_str_field(value, "error_message"),
    }
}

pub struct HttpSchedulerBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSchedulerBackend {
    pub fn from_env() -> Self {
        HttpSchedulerBackend {
            client: reqwest::Client::new(),
            base_url: std::env::var("REELFORGE_SCHEDULER_URL")
                .unwrap_or_else(|_| SCHEDULER_SERVICE_URL.to_string()),
            api_key: std::env::var("REELFORGE_API_KEY").ok(),
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    async fn post_verb(&self, id: &str, verb: &str) -> Result<()> {
        let response = self
            .request(
                self.client
                    .post(format!("{}/schedules/{}/{}", self.base_url, id, verb)),
            )
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Scheduler service error: {} - {}",
                status,
                error_text
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SchedulerBackend for HttpSchedulerBackend {
    async fn get_schedule(&self, id: &str) -> Result<ScheduleFetch> {
        let response = self
            .request(self.client.get(format!("{}/schedules/{}", self.base_url, id)))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Scheduler service error: {}", status));
        }

        let body: Value = response.json().await?;
        let schedule = if bool_field(&body, "success") {
            body.get("schedule").map(schedule_from_value)
        } else {
            None
        };
        Ok(ScheduleFetch {
            schedule,
            error: opt_str_field(&body, "error"),
        })
    }

    async fn pause(&self, id: &str) -> Result<()> {
        self.post_verb(id, "pause").await
    }

    async fn resume(&self, id: &str) -> Result<()> {
        self.post_verb(id, "resume").await
    }

    async fn trigger_now(&self, id: &str) -> Result<()> {
        self.post_verb(id, "trigger").await
    }

    async fn get_logs(&self, id: &str, limit: usize) -> Result<Vec<ExecutionLogEntry>> {
        let response = self
            .request(
                self.client
                    .get(format!("{}/schedules/{}/logs", self.base_url, id))
                    .query(&[("limit", limit)]),
            )
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Scheduler service error: {}", status));
        }

        let body: Value = response.json().await?;
        if !bool_field(&body, "success") {
            return Err(anyhow::anyhow!("Scheduler service reported failure"));
        }
        Ok(body
            .get("executions")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(log_entry_from_value).collect())
            .unwrap_or_default())
    }
}

/// Render a five-field cron expression to a human-readable phrase, falling
/// back to the raw expression for shapes it does not recognize.
pub fn cron_to_human(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return expr.to_string();
    }
    let (minute, hour) = match (fields[0].parse::<u32>(), fields[1].parse::<u32>()) {
        (Ok(m), Ok(h)) if m < 60 && h < 24 => (m, h),
        _ => return expr.to_string(),
    };
    let time = format_time(hour, minute);

    match (fields[2], fields[3], fields[4]) {
        ("*", "*", "*") => format!("Daily at {}", time),
        ("*", "*", dow) => match weekday_name(dow) {
            Some(day) => format!("Every {} at {}", day, time),
            None => expr.to_string(),
        },
        (dom, "*", "*") => match dom.parse::<u32>() {
            Ok(day) if (1..=31).contains(&day) => {
                format!("Monthly on day {} at {}", day, time)
            }
            _ => expr.to_string(),
        },
        _ => expr.to_string(),
    }
}

fn weekday_name(field: &str) -> Option<&'static str> {
    match field {
        "0" | "7" => Some("Sunday"),
        "1" => Some("Monday"),
        "2" => Some("Tuesday"),
        "3" => Some("Wednesday"),
        "4" => Some("Thursday"),
        "5" => Some("Friday"),
        "6" => Some("Saturday"),
        _ => None,
    }
}

fn format_time(hour: u32, minute: u32) -> String {
    let (display_hour, suffix) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{}:{:02} {}", display_hour, minute, suffix)
}
