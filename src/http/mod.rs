//! HTTP request construction and transport

mod client;
mod method;
mod request;

pub use client::{RawResponse, ReqwestTransport, Transport, TransportError, TransportErrorKind};
pub use method::HttpMethod;
pub use request::PreparedRequest;
