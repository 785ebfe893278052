use std::collections::HashMap;

use parking_lot::Mutex;

/// The round harness's key-value slot as the pipeline consumes it: a
/// fixed-key overwrite store, set once per round and read back by the
/// submission step.
pub trait KeyValueStore: Send + Sync {
    fn set(&self, key: &str, value: String);
    fn get(&self, key: &str) -> Option<String>;
}

/// In-process store used when no external harness storage is wired in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&self, key: &str, value: String) {
        self.slots.lock().insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().get(key).cloned()
    }
}
