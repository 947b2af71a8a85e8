//! Configuration for Carbon
//!
//! Centralized configuration with sensible defaults.

use crate::error::{CarbonError, Result};

/// Default largest frame payload for servers and clients (16 MB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Codec behaviour shared by writers and readers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum struct/container nesting depth for serialize, deserialize and skip.
    ///
    /// Exceeding it fails with `DepthExceeded` instead of exhausting the stack.
    pub max_depth: usize,

    /// Reject string fields that are not valid UTF-8.
    ///
    /// When disabled, invalid sequences are replaced with U+FFFD.
    pub strict_utf8: bool,

    /// Emit delta-encoded field ids when the gap to the previous id is 1..=15.
    ///
    /// Readers always accept both forms; this only affects writers.
    pub compact_field_ids: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            strict_utf8: true,
            compact_field_ids: true,
        }
    }
}

impl CodecConfig {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_strict_utf8(mut self, strict: bool) -> Self {
        self.strict_utf8 = strict;
        self
    }

    pub fn with_compact_field_ids(mut self, compact: bool) -> Self {
        self.compact_field_ids = compact;
        self
    }
}

/// Main configuration for a Carbon server instance
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub workers: usize,

    /// Max connections waiting for a free worker
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest accepted frame payload (in bytes)
    pub max_frame_size: usize,

    /// Codec settings used to decode requests and encode replies
    pub codec: CodecConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            workers: 4,
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            codec: CodecConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Check invariants the server relies on
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(CarbonError::Config("workers must be at least 1".to_string()));
        }
        if self.max_connections == 0 {
            return Err(CarbonError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_frame_size == 0 || self.max_frame_size > u32::MAX as usize {
            return Err(CarbonError::Config(format!(
                "max_frame_size must be in 1..={}, got {}",
                u32::MAX,
                self.max_frame_size
            )));
        }
        if self.codec.max_depth == 0 {
            return Err(CarbonError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for ServerConfig
#[derive(Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count;
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum frame payload size (in bytes)
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the codec configuration
    pub fn codec(mut self, codec: CodecConfig) -> Self {
        self.config.codec = codec;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
