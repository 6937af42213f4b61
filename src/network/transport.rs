// src/network/transport.rs
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::feedback::{DispatchError, FeedbackCommand};

/// Raw channel to a device's feedback endpoint. Returns the HTTP status of an
/// accepted command.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackTransport: Send + Sync {
    async fn send(&self, address: SocketAddr, command: &FeedbackCommand) -> Result<u16, DispatchError>;
}

pub struct HttpFeedbackTransport {
    client: Client,
}

impl HttpFeedbackTransport {
    pub fn new(timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Unreachable(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedbackTransport for HttpFeedbackTransport {
    async fn send(&self, address: SocketAddr, command: &FeedbackCommand) -> Result<u16, DispatchError> {
        let url = format!("http://{}/feedback", address);
        let response = self
            .client
            .post(&url)
            .json(command)
            .send()
            .await
            .map_err(|e| DispatchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(DispatchError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
