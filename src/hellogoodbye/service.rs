//! HelloGoodbye service
//!
//! Answers hello/goodbye requests and remembers who said hello.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::config::CodecConfig;
use crate::error::Result;
use crate::network::{dispatch, Frame, RequestHandler};
use crate::protocol::CarbonRequest;

use super::{GoodbyeReply, GoodbyeRequest, HelloReply, HelloRequest, ResultCode};

/// Request handler for the hellogoodbye schema
pub struct HelloGoodbyeService {
    codec: CodecConfig,

    /// Hellos received per key since its last goodbye
    greetings: Mutex<HashMap<String, u64>>,
}

impl HelloGoodbyeService {
    pub fn new(codec: CodecConfig) -> Self {
        Self {
            codec,
            greetings: Mutex::new(HashMap::new()),
        }
    }

    pub fn hello(&self, request: HelloRequest) -> HelloReply {
        let mut greetings = self.greetings.lock();
        let count = greetings.entry(request.key).or_insert(0);
        *count += 1;
        HelloReply::new(ResultCode::Ok)
    }

    pub fn goodbye(&self, request: GoodbyeRequest) -> GoodbyeReply {
        match self.greetings.lock().remove(&request.key) {
            Some(count) => GoodbyeReply::new(
                ResultCode::Ok,
                format!(
                    "goodbye {} from shard {} after {} hello(s)",
                    request.key, request.shard_id, count
                ),
            ),
            None => GoodbyeReply::new(
                ResultCode::NotFound,
                format!("{} never said hello", request.key),
            ),
        }
    }

    /// Hellos recorded for `key`
    pub fn greeting_count(&self, key: &str) -> u64 {
        self.greetings.lock().get(key).copied().unwrap_or(0)
    }
}

impl Default for HelloGoodbyeService {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl RequestHandler for HelloGoodbyeService {
    fn handle(&self, type_id: u8, payload: &[u8]) -> Result<Frame> {
        if type_id == HelloRequest::TYPE_ID {
            dispatch::<HelloRequest, _>(payload, &self.codec, |r| self.hello(r))
        } else if type_id == GoodbyeRequest::TYPE_ID {
            dispatch::<GoodbyeRequest, _>(payload, &self.codec, |r| self.goodbye(r))
        } else {
            tracing::debug!("Unknown request type {}", type_id);
            Ok(Frame::error(type_id, &format!("Unknown request type: {}", type_id)))
        }
    }
}
