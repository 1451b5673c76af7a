//! Codec seam between typed values and stored text.
//!
//! All values passing through the engine go through a codec. The trait is
//! async so that synchronous and asynchronous codecs are awaited
//! uniformly; the engine's control flow never forks on codec kind.

mod json;
mod traits;

pub use json::JsonCodec;
pub use traits::{Codec, CodecError};
