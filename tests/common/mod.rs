//! Shared test fixtures: a scripted removal-service transport and image helpers
#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use mockproof::{ApiResponse, RemovalServiceConfig, RemovalTransport, Result};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted transport standing in for the removal service.
///
/// Responses are configured up front; per-endpoint call counters let tests
/// assert which wire calls were (not) issued.
pub struct ScriptedTransport {
    pub preflight_status: u16,
    /// Per-call submit statuses; the last one repeats when the queue drains
    submit_statuses: Mutex<VecDeque<u16>>,
    /// Fixed submit body override; when `None`, a `task-N` id is generated
    submit_body: Option<Vec<u8>>,
    pub status_status: u16,
    /// Per-poll task statuses; the last one repeats when the queue drains
    statuses: Mutex<VecDeque<String>>,
    pub result_status: u16,
    result_body: Vec<u8>,

    pub check_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub result_calls: AtomicUsize,
}

impl ScriptedTransport {
    /// A transport that succeeds end to end, completing on the first poll and
    /// returning `result_body` as the cutout payload
    pub fn success(result_body: Vec<u8>) -> Self {
        Self {
            preflight_status: 200,
            submit_statuses: Mutex::new(VecDeque::from([200])),
            submit_body: None,
            status_status: 200,
            statuses: Mutex::new(VecDeque::from(["completed".to_owned()])),
            result_status: 200,
            result_body,
            check_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            result_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_preflight_status(mut self, status: u16) -> Self {
        self.preflight_status = status;
        self
    }

    pub fn with_submit_statuses(self, statuses: &[u16]) -> Self {
        *self.submit_statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn with_submit_body(mut self, body: &[u8]) -> Self {
        self.submit_body = Some(body.to_vec());
        self
    }

    pub fn with_status_status(mut self, status: u16) -> Self {
        self.status_status = status;
        self
    }

    pub fn with_task_statuses(self, statuses: &[&str]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    pub fn with_result_status(mut self, status: u16) -> Self {
        self.result_status = status;
        self
    }

    fn next_from(queue: &Mutex<VecDeque<String>>) -> String {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_else(|| "completed".to_owned())
        }
    }
}

#[async_trait]
impl RemovalTransport for ScriptedTransport {
    async fn check_service(&self, _api_key: &str) -> Result<ApiResponse> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ApiResponse::new(self.preflight_status, b"ok".to_vec()))
    }

    async fn submit_image(
        &self,
        _api_key: &str,
        _bytes: Vec<u8>,
        _filename: &str,
    ) -> Result<ApiResponse> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let status = {
            let mut queue = self.submit_statuses.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().copied().unwrap_or(200)
            }
        };
        let body = match &self.submit_body {
            Some(body) => body.clone(),
            None => format!(r#"{{"task_id":"task-{call}"}}"#).into_bytes(),
        };
        Ok(ApiResponse::new(status, body))
    }

    async fn task_status(&self, _api_key: &str, _task_id: &str) -> Result<ApiResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let status = Self::next_from(&self.statuses);
        Ok(ApiResponse::new(
            self.status_status,
            format!(r#"{{"status":"{status}"}}"#).into_bytes(),
        ))
    }

    async fn fetch_result(&self, _api_key: &str, _task_id: &str) -> Result<ApiResponse> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ApiResponse::new(self.result_status, self.result_body.clone()))
    }
}

/// Encoded PNG of a solid-color image
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Client configuration pointed at a placeholder URL (the scripted transport
/// never dials it)
pub fn test_config() -> RemovalServiceConfig {
    RemovalServiceConfig::builder()
        .service_base_url("https://removal.test")
        .build()
        .unwrap()
}
