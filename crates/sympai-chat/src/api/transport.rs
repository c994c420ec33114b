//! ChatTransport implementation for HttpTransport (reply stream + title).

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::debug;

use crate::{ChatError, ChatTransport};

use super::client::{error_from_response, HttpTransport, StreamRequest, TitleRequest, TitleResponse};
use super::handle::StreamHandle;

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open_stream(&self, request: &StreamRequest) -> Result<StreamHandle, ChatError> {
        self.config.ensure_credentials()?;

        debug!(session = %request.session_id, url = %self.config.chat_url(), "opening reply stream");

        let response = self
            .http
            .post(self.config.chat_url())
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| ChatError::Network(e.to_string()))
            })
            .boxed();

        let session = request.session_id.clone();
        Ok(StreamHandle::new(body)
            .with_lock(self.locks.lock_for(&request.session_id))
            .with_close_hook(move |reason| {
                debug!(session = %session, %reason, "reply stream closed");
            }))
    }

    async fn generate_title(&self, request: &TitleRequest) -> Result<String, ChatError> {
        self.config.ensure_credentials()?;

        debug!(url = %self.config.title_url(), "title request");

        let response = self
            .http
            .post(self.config.title_url())
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let reply: TitleResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        if reply.status != "success" {
            let detail = reply.message.unwrap_or_else(|| "no details".to_string());
            return Err(ChatError::Api(format!(
                "title service returned status {:?}: {detail}",
                reply.status
            )));
        }

        reply
            .title
            .ok_or_else(|| ChatError::Parse("title missing from successful reply".into()))
    }
}
