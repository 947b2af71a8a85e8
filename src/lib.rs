//! # Carbon
//!
//! The wire codec underneath a memcache-protocol router:
//! - Self-describing tagged binary format for request/reply structs
//! - Field dispatch by numeric id with skip-by-default for unknown fields
//! - Forward and backward compatible as struct schemas evolve
//! - Bounded nesting depth for serialize, deserialize and skip
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Transport (frames over TCP)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Router (RequestHandler dispatch)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │        Message structs (CarbonMessage / CarbonRequest)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Writer    │          │   Reader    │
//!   │  (BufMut)   │          │ (&[u8] cur) │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬────────────┘
//!                       ▼
//!               ┌───────────────┐
//!               │  Field types  │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod hellogoodbye;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CarbonError, Result};
pub use config::{CodecConfig, ServerConfig, DEFAULT_MAX_FRAME_SIZE};
pub use protocol::{
    CarbonMessage, CarbonProtocolReader, CarbonProtocolWriter, CarbonRequest, CarbonType,
    FieldType,
};

#[doc(hidden)]
pub use bytes;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Carbon
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
