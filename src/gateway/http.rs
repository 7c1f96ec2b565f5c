//! Live gateway speaking the chat backend's HTTP API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use super::wire::{ConversationWire, SendResponseWire, SummaryWire};
use super::{ChatGateway, GatewayError, OutgoingFile, SendOutcome};
use crate::model::{Conversation, ConversationSummary};

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

fn payload(err: reqwest::Error) -> GatewayError {
    GatewayError::Payload(err.to_string())
}

#[async_trait]
impl ChatGateway for HttpGateway {
    async fn get_conversation(&self, id: &str) -> Result<Conversation, GatewayError> {
        let url = self.url(&format!("/api/conversations/{id}"));
        let response = self.client.get(&url).send().await.map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        let response = Self::check_status(response).await?;
        let wire: ConversationWire = response.json().await.map_err(payload)?;
        wire.try_into()
    }

    async fn create_conversation(&self) -> Result<Conversation, GatewayError> {
        let url = self.url("/api/conversations");
        let response = self.client.post(&url).send().await.map_err(transport)?;
        let response = Self::check_status(response).await?;
        let wire: ConversationWire = response.json().await.map_err(payload)?;
        wire.try_into()
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
        files: Vec<OutgoingFile>,
    ) -> Result<SendOutcome, GatewayError> {
        let mut form = Form::new()
            .text("message", text.to_string())
            .text("conversation_id", conversation_id.to_string());
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str(&file.mime)
                .map_err(|err| GatewayError::Payload(format!("bad mime type: {err}")))?;
            form = form.part("files", part);
        }

        let url = self.url("/api/chat/message");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(conversation_id.to_string()));
        }
        let response = Self::check_status(response).await?;
        let wire: SendResponseWire = response.json().await.map_err(payload)?;
        Ok(SendOutcome {
            conversation: wire.conversation.try_into()?,
        })
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, GatewayError> {
        let url = self.url("/api/conversations");
        let response = self.client.get(&url).send().await.map_err(transport)?;
        let response = Self::check_status(response).await?;
        let wires: Vec<SummaryWire> = response.json().await.map_err(payload)?;
        wires.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let gateway = HttpGateway::new("http://localhost:8000/");
        assert_eq!(
            gateway.url("/api/conversations/abc"),
            "http://localhost:8000/api/conversations/abc"
        );
    }
}
