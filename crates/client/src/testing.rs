//! Scripted fetcher for worker tests.

use std::collections::HashMap;
use std::sync::Mutex;

use swcache_core::{Error, StoredResponse};

use crate::fetch::{FetchRequest, Fetcher};

enum Reply {
    Respond(StoredResponse),
    Fail(String),
}

/// Fetcher that answers from a fixed table keyed by URL and records every call.
#[derive(Default)]
pub(crate) struct StubFetcher {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, response: StoredResponse) -> &Self {
        self.routes.lock().unwrap().insert(url.to_string(), Reply::Respond(response));
        self
    }

    pub(crate) fn fail(&self, url: &str, reason: &str) -> &Self {
        self.routes.lock().unwrap().insert(url.to_string(), Reply::Fail(reason.to_string()));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, Error> {
        let url = request.url().to_string();
        self.calls.lock().unwrap().push(url.clone());
        self.requests.lock().unwrap().push(request.clone());
        match self.routes.lock().unwrap().get(&url) {
            Some(Reply::Respond(response)) => Ok(response.clone()),
            Some(Reply::Fail(reason)) => Err(Error::Network(reason.clone())),
            None => Err(Error::Network(format!("no route for {url}"))),
        }
    }
}
