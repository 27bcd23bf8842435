//! Post-call persistence of the vendor's call record.
//!
//! After a call ends the vendor holds the authoritative call detail record.
//! [`CallRecordPersister`] fetches it and forwards it, with the call id and a
//! submission timestamp, to the internal log store. The console runs this
//! fire-and-forget; failures come back as [`PersistError`]s and never touch
//! the call state machine.

use crate::config::VapiConfig;
use crate::error::PersistError;
use async_trait::async_trait;
use campaign_types::CallLogSubmission;
use std::fmt;
use tracing::{info, warn};

/// Persists the record of one finished call.
#[async_trait]
pub trait Persister: Send + Sync {
    /// Fetches the call record for `call_id` and forwards it to the log
    /// store. The store write is skipped when the fetch fails.
    async fn persist(&self, call_id: &str) -> Result<CallLogSubmission, PersistError>;
}

/// HTTP implementation backed by the vendor API and the log store.
#[derive(Clone)]
pub struct CallRecordPersister {
    client: reqwest::Client,
    vendor_api_url: String,
    log_store_url: String,
    api_key: String,
}

impl fmt::Debug for CallRecordPersister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRecordPersister")
            .field("vendor_api_url", &self.vendor_api_url)
            .field("log_store_url", &self.log_store_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl CallRecordPersister {
    pub fn new(config: &VapiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &VapiConfig) -> Self {
        Self {
            client,
            vendor_api_url: config.vendor_api_url.trim_end_matches('/').to_string(),
            log_store_url: config.log_store_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// `GET /call/{call_id}` against the vendor API.
    pub async fn fetch_call_record(
        &self,
        call_id: &str,
    ) -> Result<serde_json::Value, PersistError> {
        let url = format!("{}/call/{}", self.vendor_api_url, call_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(PersistError::VendorUnreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::VendorRejected {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(PersistError::VendorDecode)
    }

    /// `POST /call-logs` against the log store. Any 2xx is success.
    pub async fn submit(&self, submission: &CallLogSubmission) -> Result<(), PersistError> {
        let url = format!("{}/call-logs", self.log_store_url);
        let response = self
            .client
            .post(&url)
            .json(submission)
            .send()
            .await
            .map_err(PersistError::StoreUnreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistError::StoreRejected(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Persister for CallRecordPersister {
    async fn persist(&self, call_id: &str) -> Result<CallLogSubmission, PersistError> {
        info!(call_id, "fetching call record");
        let record = self.fetch_call_record(call_id).await.inspect_err(|e| {
            warn!(call_id, error = %e, "failed to fetch call record");
        })?;

        let submission = CallLogSubmission::new(call_id, record);
        self.submit(&submission).await.inspect_err(|e| {
            warn!(call_id, error = %e, "failed to forward call record to log store");
        })?;

        info!(call_id, "call record saved to log store");
        Ok(submission)
    }
}
