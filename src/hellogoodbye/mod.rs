//! HelloGoodbye Module
//!
//! A small request/reply schema and the service answering it.
//!
//! ## Schema
//! ```text
//! HelloRequest   (type 1)  { 1: key string, 2: shardId i32 }
//! HelloReply               { 1: result i16 }
//! GoodbyeRequest (type 2)  { 1: key string, 2: shardId i32 }
//! GoodbyeReply             { 1: result i16, 2: message string }
//! ```

mod messages;
mod service;

pub use messages::{GoodbyeReply, GoodbyeRequest, HelloReply, HelloRequest, ResultCode};
pub use service::HelloGoodbyeService;
