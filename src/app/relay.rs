use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct ChatMessage {
    #[serde(rename = "Content")]
    content: String,
}

/// Forwards upload announcements to the chat room webhook.
#[derive(Clone)]
pub struct RelayService {
    http_client: Client,
    webhook_url: String,
    site_url: String,
}

impl RelayService {
    pub fn new(webhook_url: String, site_url: String) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| Error::RelayUnavailable(format!("build http client: {}", err)))?;

        Ok(Self {
            http_client,
            webhook_url,
            site_url,
        })
    }

    pub async fn announce(&self, name: &str, photo_url: &str) -> Result<()> {
        let message = ChatMessage {
            content: announcement(name, &self.site_url, photo_url),
        };

        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|err| Error::RelayUnavailable(format!("send message to chat room: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RelayUnavailable(format!(
                "chat room responded with {}",
                status
            )));
        }

        info!(url = %photo_url, "sent announcement to chat room");
        Ok(())
    }
}

pub fn announcement(name: &str, site_url: &str, photo_url: &str) -> String {
    format!(
        "/md @Present A new photo of {name} has been posted on [🐶DDOS]({site_url})! ![{name}!!!]({photo_url})"
    )
}
