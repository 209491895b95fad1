use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;

use unid_common::mutex_lock_or_recover;

use crate::client::DaemonClient;
use crate::error::ClientError;
use crate::error_codes;

type CallRecord = Vec<(String, Option<Value>)>;

/// A mock [`DaemonClient`] for testing.
///
/// Serves canned responses per method and records every call. Like the
/// real daemon, an unconfigured method name answers with a
/// method-not-found RPC error.
#[derive(Clone, Default)]
pub struct MockClient {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    calls: Arc<Mutex<CallRecord>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the response returned for `method`.
    pub fn set_response(&mut self, method: &str, response: Value) {
        mutex_lock_or_recover(&self.responses).insert(method.to_string(), response);
    }

    /// Number of calls made to `method`.
    pub fn call_count(&self, method: &str) -> usize {
        mutex_lock_or_recover(&self.calls)
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

impl DaemonClient for MockClient {
    fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value, ClientError> {
        mutex_lock_or_recover(&self.calls).push((method.to_string(), params));

        match mutex_lock_or_recover(&self.responses).get(method) {
            Some(response) => Ok(response.clone()),
            None => Err(ClientError::RpcError {
                code: error_codes::METHOD_NOT_FOUND,
                message: format!("Method not found: {}", method),
            }),
        }
    }
}
