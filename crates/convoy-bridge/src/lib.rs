//! # convoy-bridge
//!
//! The conversion bridge: accepts a slide-deck conversion request,
//! invokes the conversion service once, and translates its reply into an
//! HTTP-style result.
//!
//! The bridge is stateless across invocations and performs no retries; it
//! is a single synchronous hop with a single translation step.

pub mod converter;
pub mod handler;
pub mod model;

pub use converter::{ConverterError, ConverterResult, ConverterService, HttpConverter};
pub use handler::{convert, router, BridgeState, CONVERT_FAILED};
pub use model::{ConvertRequest, ConvertResponse, RequestError};
