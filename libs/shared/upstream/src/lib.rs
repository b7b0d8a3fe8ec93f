//! Access to the institutional API.
//!
//! The upstream answers HTTP 200 for almost everything and signals real
//! failures inside the body, and it moves the payload between `data`,
//! `message.<entity>` and the top level depending on the endpoint. This
//! crate turns those envelopes into either a typed value or a typed failure:
//!
//! 1. envelope `status` is interpreted first ([`envelope::interpret_status`]),
//! 2. then the transport status,
//! 3. then an [`ExtractionPlan`] picks the first candidate path whose value
//!    has the expected shape,
//! 4. and the payload is validated with serde. Validation failures do not
//!    fail the call; they come back as [`Normalized::RawFallback`].

pub mod client;
pub mod coerce;
pub mod envelope;
pub mod error;
pub mod messages;
pub mod normalize;

pub use client::UpstreamClient;
pub use envelope::{Candidate, ExtractionPlan, PayloadShape};
pub use error::UpstreamError;
pub use messages::ResourceMessages;
pub use normalize::{normalize, normalize_list, Normalized, NormalizedResponse, UpstreamReply};
