//! Scripted in-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use sdbridge_core::result::AppResult;
use sdbridge_core::traits::{DeviceReply, DeviceRequest, DeviceTransport, MultipartUpload};
use sdbridge_core::types::{Endpoint, ProgressSink, TransferProgress};

/// A request as seen by the fake device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCall {
    pub endpoint: Endpoint,
    pub query: Option<String>,
    pub file_name: Option<String>,
    pub timeout: Option<Duration>,
}

/// Fake device answering from per-endpoint queues.
///
/// Unscripted requests get an empty `200`.
#[derive(Debug, Default)]
pub struct FakeTransport {
    queued: Mutex<HashMap<Endpoint, VecDeque<AppResult<DeviceReply>>>>,
    fallback: Mutex<HashMap<Endpoint, AppResult<DeviceReply>>>,
    calls: Mutex<Vec<DeviceCall>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue one answer for `endpoint`.
    pub fn reply(&self, endpoint: Endpoint, result: AppResult<DeviceReply>) {
        self.queued
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(result);
    }

    /// Queue a `200` text answer for `endpoint`.
    pub fn reply_text(&self, endpoint: Endpoint, body: &str) {
        self.reply(endpoint, Ok(DeviceReply::new(200, body.to_string())));
    }

    /// Answer every otherwise unscripted request to `endpoint` with `result`.
    pub fn always(&self, endpoint: Endpoint, result: AppResult<DeviceReply>) {
        self.fallback.lock().unwrap().insert(endpoint, result);
    }

    /// Make the next request wait until the returned handle is notified.
    pub fn hold_next(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    async fn respond(&self, call: DeviceCall) -> AppResult<DeviceReply> {
        let endpoint = call.endpoint;
        self.calls.lock().unwrap().push(call);

        let hold = self.hold.lock().unwrap().take();
        if let Some(notify) = hold {
            notify.notified().await;
        }

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(result) => result,
            None => self
                .fallback
                .lock()
                .unwrap()
                .get(&endpoint)
                .cloned()
                .unwrap_or_else(|| Ok(DeviceReply::new(200, ""))),
        }
    }
}

#[async_trait]
impl DeviceTransport for FakeTransport {
    fn base_url(&self) -> &str {
        "http://fake-device"
    }

    async fn get(&self, request: DeviceRequest) -> AppResult<DeviceReply> {
        self.respond(DeviceCall {
            endpoint: request.endpoint,
            query: request.query.map(|(_, v)| v),
            file_name: None,
            timeout: request.timeout,
        })
        .await
    }

    async fn get_with_progress(
        &self,
        request: DeviceRequest,
        progress: &dyn ProgressSink,
    ) -> AppResult<DeviceReply> {
        let reply = self.get(request).await?;
        let len = reply.body.len() as u64;
        progress.report(TransferProgress::new(len, Some(len)));
        Ok(reply)
    }

    async fn post_multipart(
        &self,
        upload: MultipartUpload,
        progress: &dyn ProgressSink,
    ) -> AppResult<DeviceReply> {
        let total = upload.data.len() as u64;
        progress.report(TransferProgress::new(total / 2, Some(total)));
        let reply = self
            .respond(DeviceCall {
                endpoint: upload.endpoint,
                query: None,
                file_name: Some(upload.file_name),
                timeout: upload.timeout,
            })
            .await?;
        progress.report(TransferProgress::new(total, Some(total)));
        Ok(reply)
    }
}

/// Wait until `transport` has seen `n` requests.
pub async fn wait_for_calls(transport: &FakeTransport, n: usize) {
    while transport.calls().len() < n {
        tokio::task::yield_now().await;
    }
}
