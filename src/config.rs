//! Driver configuration.

use perch_core::ResourceDir;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Driver settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long to wait after the native layer reports a close before freeing the context.
    #[serde(rename = "finalize_delay_ms", with = "millis")]
    pub finalize_delay: Duration,

    /// Capacity of the event channel. Senders block while it is full.
    pub queue_capacity: usize,

    /// Resource directory.
    pub resources: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            finalize_delay: Duration::from_millis(42),
            queue_capacity: 1024,
            resources: PathBuf::from("resources"),
        }
    }
}

impl Config {
    pub fn with_finalize_delay(mut self, delay: Duration) -> Self {
        self.finalize_delay = delay;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_resources(mut self, resources: impl Into<PathBuf>) -> Self {
        self.resources = resources.into();
        self
    }

    pub fn resource_dir(&self) -> ResourceDir {
        ResourceDir::new(self.resources.clone())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
