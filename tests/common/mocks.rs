#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use flickr_rpc::{Client, Error, Result, Session, Transport};

/// In-memory transport that replays scripted responses in order and records
/// every requested URL
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>>>>,
    request_log: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_body(&self, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.as_bytes().to_vec()));
    }

    pub fn push_error(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<String> {
        self.request_log.lock().unwrap().clone()
    }

    /// Decoded query parameters of the n-th request
    pub fn query(&self, index: usize) -> BTreeMap<String, String> {
        let url = Url::parse(&self.requests()[index]).unwrap();
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.request_log.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {}", url))
    }
}

pub fn client_with(session: Session, transport: &Arc<ScriptedTransport>) -> Client {
    let transport: Arc<dyn Transport> = transport.clone();
    Client::new(session, transport)
}

pub fn ok(payload: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="utf-8" ?><rsp stat="ok">{}</rsp>"#, payload)
}

pub fn fail(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?><rsp stat="fail"><err code="{}" msg="{}" /></rsp>"#,
        code, message
    )
}
