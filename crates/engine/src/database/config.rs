//! Process-level configuration: the data root path and the listening
//! port, the only two environment decisions spec §6 documents.

use serde::{Deserialize, Serialize};

const DEFAULT_PORT: u16 = 8001;

/// Where TStore persists its data, and which port `tstore-server`
/// listens on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Filesystem root under which every database's data lives (spec
    /// §6's "Persisted layout").
    pub data_root: String,
    /// TCP port the line-oriented listener binds to.
    pub port: u16,
}

impl Config {
    /// Build a config rooted at `data_root`, listening on the default
    /// port.
    pub fn new(data_root: impl Into<String>) -> Self {
        Config {
            data_root: data_root.into(),
            port: DEFAULT_PORT,
        }
    }

    /// Override the listening port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}
