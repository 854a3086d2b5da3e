//! An HTTP client that delivers records to the Ackee server.
use std::{
    sync::{Arc, Condvar, Mutex},
    time::Duration,
};

use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Sends records to the Ackee server, one request per call.
///
/// No timeout is configured by default, so requests may take arbitrarily long. Use
/// [`Transport::timeout`] to bound them.
///
/// # Examples
/// ```no_run
/// # use std::time::Duration;
/// # use ackee_tracker::Transport;
/// # use ackee_tracker::Method;
/// let transport = Transport::new().timeout(Duration::from_secs(10));
/// let pending = transport
///     .send(Method::POST, "https://ackee.example", "u1", "d1", &serde_json::json!({}))
///     .unwrap();
/// println!("{:?}", pending.wait());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transport {
    timeout: Option<Duration>,
}

/// Invoked exactly once with the outcome of a request.
type Callback = Box<dyn FnOnce(Result<Value>) + Send>;

struct OutcomeState {
    result: Option<Result<Value>>,
    callback: Option<Callback>,
}

/// Single-shot slot for the outcome of a request. Only the first outcome is kept.
struct Outcome {
    state: Mutex<OutcomeState>,
    condvar: Condvar,
}

impl Outcome {
    fn new(callback: Option<Callback>) -> Outcome {
        Outcome {
            state: Mutex::new(OutcomeState {
                result: None,
                callback,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Store `result` unless an outcome is already known. Returns whether `result` was stored.
    fn complete(&self, result: Result<Value>) -> bool {
        let callback = {
            let Ok(mut state) = self.state.lock() else {
                return false;
            };
            if state.result.is_some() {
                return false;
            }
            state.result = Some(result.clone());
            self.condvar.notify_all();
            state.callback.take()
        };

        // Called outside of the lock, so the callback may inspect the pending response.
        if let Some(callback) = callback {
            callback(result);
        }
        true
    }
}

/// Handle to a request sent by [`Transport::send`].
///
/// Exactly one outcome is delivered per request: the parsed JSON response, or one of
/// [`Error::Parse`], [`Error::ServerStatus`], [`Error::Transport`], [`Error::Aborted`] or
/// [`Error::Timeout`].
pub struct PendingResponse {
    outcome: Arc<Outcome>,
}

impl PendingResponse {
    /// Block waiting for the outcome of the request.
    pub fn wait(&self) -> Result<Value> {
        let mut lock = self
            .outcome
            .state
            .lock()
            .map_err(|_| Error::BeaconThreadPanicked)?;
        loop {
            match &lock.result {
                Some(result) => return result.clone(),
                None => {
                    lock = self
                        .outcome
                        .condvar
                        .wait(lock)
                        .map_err(|_| Error::BeaconThreadPanicked)?;
                }
            }
        }
    }

    /// Get the outcome if it is already known.
    pub fn try_result(&self) -> Option<Result<Value>> {
        match self.outcome.state.lock() {
            Ok(state) => state.result.clone(),
            Err(_) => Some(Err(Error::BeaconThreadPanicked)),
        }
    }

    /// Whether the outcome of the request is known.
    pub fn is_completed(&self) -> bool {
        self.try_result().is_some()
    }

    /// Abort the request, delivering [`Error::Aborted`] unless an outcome is already known.
    ///
    /// The request itself may still reach the server. Its response is discarded. Returns whether
    /// the request was aborted.
    pub fn abort(&self) -> bool {
        let aborted = self.outcome.complete(Err(Error::Aborted));
        if aborted {
            log::debug!(target: "ackee", "aborted request");
        }
        aborted
    }
}

/// Compose the URL records of `user_id` on `domain_id` are sent to.
///
/// ```
/// # use ackee_tracker::records_url;
/// let url = records_url("https://ackee.example", "u1", "d1").unwrap();
/// assert_eq!(url.as_str(), "https://ackee.example/users/u1/domains/d1/records");
/// ```
pub fn records_url(base_url: &str, user_id: &str, domain_id: &str) -> Result<Url> {
    Url::parse(&format!(
        "{base_url}/users/{user_id}/domains/{domain_id}/records"
    ))
    .map_err(Error::InvalidServerUrl)
}

impl Transport {
    /// Create a transport without a timeout.
    pub fn new() -> Self {
        Transport::default()
    }

    /// Fail requests that take longer than `timeout` with [`Error::Timeout`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send `payload` as JSON to the records endpoint of `user_id` on `domain_id`.
    ///
    /// The request is performed on a background thread. Errors that occur before the request is
    /// started (an invalid URL or an unserializable payload) are returned immediately.
    pub fn send(
        &self,
        method: Method,
        base_url: &str,
        user_id: &str,
        domain_id: &str,
        payload: &impl Serialize,
    ) -> Result<PendingResponse> {
        self.start(method, base_url, user_id, domain_id, payload, None)
    }

    /// Like [`Transport::send`], additionally invoking `callback` with the outcome once it is
    /// known.
    pub fn send_with_callback(
        &self,
        method: Method,
        base_url: &str,
        user_id: &str,
        domain_id: &str,
        payload: &impl Serialize,
        callback: impl FnOnce(Result<Value>) + Send + 'static,
    ) -> Result<PendingResponse> {
        self.start(
            method,
            base_url,
            user_id,
            domain_id,
            payload,
            Some(Box::new(callback)),
        )
    }

    fn start(
        &self,
        method: Method,
        base_url: &str,
        user_id: &str,
        domain_id: &str,
        payload: &impl Serialize,
        callback: Option<Callback>,
    ) -> Result<PendingResponse> {
        let url = records_url(base_url, user_id, domain_id)?;
        let body = serde_json::to_value(payload).map_err(|err| Error::Serialize(Arc::new(err)))?;

        let outcome = Arc::new(Outcome::new(callback));
        let timeout = self.timeout;

        spawn_beacon_thread(Arc::clone(&outcome), move || {
            request(timeout, method, url, &body)
        })?;

        Ok(PendingResponse { outcome })
    }
}

/// Delivers [`Error::BeaconThreadPanicked`] if the beacon thread unwinds before completing the
/// outcome.
struct PanicGuard(Arc<Outcome>);

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.complete(Err(Error::BeaconThreadPanicked));
        }
    }
}

/// Run `job` on a named thread and publish its result to `outcome`.
fn spawn_beacon_thread(
    outcome: Arc<Outcome>,
    job: impl FnOnce() -> Result<Value> + Send + 'static,
) -> Result<()> {
    std::thread::Builder::new()
        .name("ackee-beacon".to_owned())
        .spawn(move || {
            let guard = PanicGuard(outcome);
            let result = job();
            if let Err(err) = &result {
                log::warn!(target: "ackee", "failed to send record: {:?}", err);
            }
            if !guard.0.complete(result) {
                log::debug!(target: "ackee", "discarding response of an aborted request");
            }
        })?;
    Ok(())
}

fn request(timeout: Option<Duration>, method: Method, url: Url, body: &Value) -> Result<Value> {
    // The blocking client owns a runtime, so it must be created and dropped off any async
    // context. It lives on the beacon thread only.
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;

    log::debug!(target: "ackee", method = method.as_str(), url = url.as_str(); "sending record");
    let response = client.request(method, url).json(body).send()?;

    match response.status() {
        StatusCode::OK => {
            let text = response.text()?;
            let json = serde_json::from_str(&text).map_err(|err| Error::Parse(Arc::new(err)))?;
            log::debug!(target: "ackee", "record accepted by server");
            Ok(json)
        }
        status => Err(Error::ServerStatus(status)),
    }
}
