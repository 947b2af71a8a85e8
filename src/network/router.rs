//! Request routing boundary
//!
//! The router decides what to do with a decoded request; the codec only
//! guarantees that it never sees a request that failed to decode.

use crate::config::CodecConfig;
use crate::error::Result;
use crate::protocol::{deserialize_message, CarbonRequest};

use super::Frame;

/// Turns one request frame payload into a reply frame
pub trait RequestHandler: Send + Sync {
    fn handle(&self, type_id: u8, payload: &[u8]) -> Result<Frame>;
}

/// Decode a request of type `R`, run `f` on it, and frame the reply.
///
/// An unparsable request is answered with an `Error` frame and `f` is never
/// called.
pub fn dispatch<R, F>(payload: &[u8], codec: &CodecConfig, f: F) -> Result<Frame>
where
    R: CarbonRequest,
    F: FnOnce(R) -> R::Reply,
{
    let request = match deserialize_message::<R>(payload, codec) {
        Ok(request) => request,
        Err(e) if e.is_decode_error() => {
            tracing::debug!(request = R::NAME, error = %e, "rejecting unparsable request");
            return Ok(Frame::error(R::TYPE_ID, &e.to_string()));
        }
        Err(e) => return Err(e),
    };

    tracing::trace!(request = R::NAME, "dispatching request");
    let reply = f(request);
    Frame::reply(R::TYPE_ID, &reply, codec)
}
