//! Real-time background subtraction for webcam streams.
//!
//! [`vibe`] holds the per-pixel sample-consensus model; the other modules feed
//! it frames from a capture source and send the result to an output sink.

pub mod capture;
pub mod output;
pub mod segmentation;
pub mod vibe;
