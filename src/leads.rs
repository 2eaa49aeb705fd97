use crate::config::MAIL_API_ROOT;
use crate::http::build_client;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Availability,
    Offer,
    TestDrive,
}

impl LeadKind {
    pub fn subject(&self) -> &'static str {
        match self {
            LeadKind::Availability => "Availability request",
            LeadKind::Offer => "Offer submitted",
            LeadKind::TestDrive => "Test drive request",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeadKind::Availability => "availability",
            LeadKind::Offer => "offer",
            LeadKind::TestDrive => "test_drive",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeadRequest {
    pub kind: LeadKind,
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default)]
    pub vehicle_title: String,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub offer_amount: Option<f64>,
    #[serde(default)]
    pub preferred_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("mail relay not configured")]
    NotConfigured,
    #[error("mail relay request failed: {0}")]
    Relay(String),
}

/// Presence validation only; the relay forwards whatever else the form sent.
pub fn validate(request: &LeadRequest) -> Result<(), LeadError> {
    if request.name.trim().is_empty() {
        return Err(LeadError::MissingField("name"));
    }
    if request.phone.trim().is_empty() && request.email.trim().is_empty() {
        return Err(LeadError::MissingField("phone or email"));
    }
    if request.kind == LeadKind::Offer && request.offer_amount.is_none() {
        return Err(LeadError::MissingField("offer_amount"));
    }
    Ok(())
}

/// Human-readable summary the dealership reads in its inbox. Empty fields
/// are omitted rather than rendered as blanks.
pub fn format_summary(request: &LeadRequest) -> String {
    let mut lines = vec![format!("{} via lotline", request.kind.subject())];
    push_line(&mut lines, "Vehicle", &request.vehicle_title);
    push_line(&mut lines, "Vehicle id", &request.vehicle_id);
    push_line(&mut lines, "VIN", &request.vin);
    push_line(&mut lines, "Name", &request.name);
    push_line(&mut lines, "Phone", &request.phone);
    push_line(&mut lines, "Email", &request.email);
    if let Some(amount) = request.offer_amount {
        lines.push(format!("Offer: ${amount:.2}"));
    }
    push_line(&mut lines, "Preferred time", &request.preferred_time);
    push_line(&mut lines, "Message", &request.message);
    lines.push(format!("Received: {}", Utc::now().to_rfc3339()));
    lines.join("\n")
}

fn push_line(lines: &mut Vec<String>, label: &str, value: &str) {
    if !value.trim().is_empty() {
        lines.push(format!("{label}: {}", value.trim()));
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
    reply_to: Option<&'a str>,
}

/// Resend-style transactional-email relay. Constructed only when the env
/// carries credentials; an absent mailer degrades to `{ok:false}` upstream.
#[derive(Debug, Clone)]
pub struct LeadMailer {
    api_key: String,
    from: String,
    to: String,
    http: Client,
}

impl LeadMailer {
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        let from = std::env::var("LEAD_FROM_EMAIL").ok()?;
        let to = std::env::var("LEAD_TO_EMAIL").ok()?;
        Some(Self {
            api_key,
            from,
            to,
            http: build_client(),
        })
    }

    /// Returns a reference id for the relayed lead.
    pub async fn relay(&self, request: &LeadRequest) -> Result<String, LeadError> {
        let reference = Uuid::new_v4().to_string();
        let subject = if request.vehicle_title.trim().is_empty() {
            format!("{} [{}]", request.kind.subject(), reference)
        } else {
            format!(
                "{} - {} [{}]",
                request.kind.subject(),
                request.vehicle_title.trim(),
                reference
            )
        };
        let reply_to = Some(request.email.trim()).filter(|value| !value.is_empty());
        let payload = OutboundEmail {
            from: &self.from,
            to: vec![&self.to],
            subject,
            text: format_summary(request),
            reply_to,
        };

        let url = format!("{}/emails", *MAIL_API_ROOT);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| LeadError::Relay(err.to_string()))?;

        if !response.status().is_success() {
            return Err(LeadError::Relay(format!("HTTP {}", response.status())));
        }

        info!(
            target = "lotline.leads",
            kind = request.kind.label(),
            reference = %reference,
            "lead relayed"
        );
        Ok(reference)
    }
}

// ---- Pre-qualification intake ----

#[derive(Debug, Clone, Deserialize)]
pub struct PrequalRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub income: Option<f64>,
    #[serde(default)]
    pub consent: bool,
    #[serde(default)]
    pub vehicle_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrequalResponse {
    pub ok: bool,
}

pub fn validate_prequal(request: &PrequalRequest) -> Result<(), LeadError> {
    if request.name.trim().is_empty() {
        return Err(LeadError::MissingField("name"));
    }
    if request.phone.trim().is_empty() {
        return Err(LeadError::MissingField("phone"));
    }
    if request.income.is_none() {
        return Err(LeadError::MissingField("income"));
    }
    if !request.consent {
        return Err(LeadError::MissingField("consent"));
    }
    Ok(())
}

/// No persistence: the submission is operator-visible through the log only.
pub fn record_prequal(request: &PrequalRequest) {
    info!(
        target = "lotline.leads",
        name = %request.name.trim(),
        phone = %request.phone.trim(),
        income = request.income,
        vehicle_id = %request.vehicle_id,
        "prequalification received"
    );
}
