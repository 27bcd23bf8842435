//! Outbound phone calls through the calling backend.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Shown while a dial request is in flight.
pub const DIALING_MESSAGE: &str = "Starting phone call to marketing assistant...";

/// Country code prefixed to bare ten-digit numbers.
const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Strips whitespace and `-()` from a typed number. A result of exactly ten
/// characters gets the default country code.
pub fn normalize_phone_number(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    if digits.chars().count() == 10 {
        format!("{DEFAULT_COUNTRY_CODE}{digits}")
    } else {
        digits
    }
}

#[derive(Debug, Serialize)]
struct StartCallRequest<'a> {
    phone_number: &'a str,
}

/// What the calling backend said about an accepted dial request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DialOutcome {
    #[serde(rename = "id", default)]
    pub call_id: Option<String>,
}

impl DialOutcome {
    /// Status line for the host.
    pub fn message(&self) -> String {
        format!(
            "Call initiated! Call ID: {}",
            self.call_id.as_deref().unwrap_or("Processing...")
        )
    }
}

/// Client for `POST {dialer_url}/start-call`.
#[derive(Debug, Clone)]
pub struct DialerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DialerClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Normalizes `raw` and asks the backend to place the call.
    pub async fn start_call(&self, raw: &str) -> Result<DialOutcome, ControlError> {
        let phone_number = normalize_phone_number(raw);
        if phone_number.is_empty() {
            return Err(ControlError::EmptyPhoneNumber);
        }

        info!(%phone_number, "requesting outbound call");
        let response = self
            .client
            .post(format!("{}/start-call", self.base_url))
            .json(&StartCallRequest {
                phone_number: &phone_number,
            })
            .send()
            .await
            .map_err(ControlError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ControlError::rejected(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "dialer rejected call");
            return Err(err);
        }

        let outcome: DialOutcome = response.json().await.map_err(ControlError::Decode)?;
        info!(call_id = ?outcome.call_id, "outbound call initiated");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digits_gain_the_country_code() {
        assert_eq!(normalize_phone_number("98765 43210"), "+919876543210");
        assert_eq!(normalize_phone_number("(987) 654-3210"), "+919876543210");
    }

    #[test]
    fn other_lengths_are_only_stripped() {
        assert_eq!(normalize_phone_number("+1 (415) 555-0100"), "+14155550100");
        assert_eq!(normalize_phone_number("12345"), "12345");
        assert_eq!(normalize_phone_number(" - ( ) "), "");
    }

    #[test]
    fn outcome_message_falls_back_while_processing() {
        let pending = DialOutcome { call_id: None };
        assert_eq!(pending.message(), "Call initiated! Call ID: Processing...");
        let placed = DialOutcome {
            call_id: Some("call-7".into()),
        };
        assert_eq!(placed.message(), "Call initiated! Call ID: call-7");
    }
}
