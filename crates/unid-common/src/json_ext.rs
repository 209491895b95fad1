use serde_json::Value;

/// Convenience accessors for JSON-RPC result payloads.
pub trait ValueExt {
    /// Returns the string at `key`, if present and a string.
    fn opt_str(&self, key: &str) -> Option<String>;

    /// Returns the string at `key`, or `default` when absent or null.
    fn str_or(&self, key: &str, default: &str) -> String;
}

impl ValueExt for Value {
    fn opt_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn str_or(&self, key: &str, default: &str) -> String {
        self.opt_str(key)
            .unwrap_or_else(|| default.to_string())
    }
}
