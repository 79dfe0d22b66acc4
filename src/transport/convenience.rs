//! Shortcuts over [`TransportClient::send`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::runtime::{Builder, Handle};
use tokio::task::JoinHandle;

use super::client::TransportClient;
use super::engine::Engine;
use crate::error::SendError;
use crate::lifecycle::CancelToken;
use crate::request::Request;
use crate::response::Response;

impl<E: Engine> TransportClient<E> {
    /// Send with a caller deadline on top of the request's own timeout.
    pub async fn send_with_timeout(&self, request: &mut Request, timeout: Duration) -> Response {
        self.send(request, &CancelToken::after(timeout)).await
    }

    /// Body as text; `None` if the send failed.
    pub async fn get_string(&self, request: &mut Request) -> Option<String> {
        let response = self.send(request, &CancelToken::none()).await;
        let text = response.into_result().ok().map(|r| r.text());
        if let Some(text) = &text {
            tracing::debug!(bytes = text.len(), "response text");
        }
        text
    }

    /// Body bytes; `None` if the send failed.
    pub async fn get_bytes(&self, request: &mut Request) -> Option<Bytes> {
        let response = self.send(request, &CancelToken::none()).await;
        response.into_result().ok().map(|r| r.bytes().clone())
    }

    /// Body parsed as JSON. A failed send or an empty body yields `Ok(None)`.
    pub async fn get_object<T: DeserializeOwned>(
        &self,
        request: &mut Request,
    ) -> Result<Option<T>, serde_json::Error> {
        let response = self.send(request, &CancelToken::none()).await;
        match response.into_result() {
            Ok(response) if !response.bytes().is_empty() => response.json().map(Some),
            _ => Ok(None),
        }
    }

    /// Send from synchronous code on a private current-thread runtime.
    ///
    /// Must not be called from inside a Tokio runtime.
    pub fn send_blocking(&self, request: &mut Request) -> Response {
        if Handle::try_current().is_ok() {
            return Response::failed(SendError::InvalidRequest(
                "send_blocking called from inside an async runtime".to_string(),
            ));
        }
        let runtime = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => return Response::failed(SendError::transport(Box::new(e))),
        };
        runtime.block_on(self.send(request, &CancelToken::none()))
    }
}

impl<E: Engine + 'static> TransportClient<E> {
    /// Send on a spawned task and hand the request and response to `callback`.
    pub fn send_with_callback<F>(self: &Arc<Self>, request: Request, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Request, Response) + Send + 'static,
    {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let mut request = request;
            let response = client.send(&mut request, &CancelToken::none()).await;
            callback(request, response);
        })
    }
}

impl Request {
    /// Send on the process-wide client.
    pub async fn send(&mut self) -> Response {
        self.send_with(&CancelToken::none()).await
    }

    /// Send on the process-wide client, observing `cancel`.
    pub async fn send_with(&mut self, cancel: &CancelToken) -> Response {
        match TransportClient::global() {
            Ok(client) => client.send(self, cancel).await,
            Err(e) => Response::failed(SendError::transport(Box::new(e))),
        }
    }
}
