//! Network Module
//!
//! TCP transport for Carbon request/reply structs.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Requests decoded and routed through a `RequestHandler`

mod client;
mod connection;
mod frame;
mod router;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use frame::{
    decode_frame, encode_frame, read_frame, write_frame, Frame, FrameKind, FRAME_HEADER_SIZE,
};
pub use router::{dispatch, RequestHandler};
pub use server::Server;
