//! Network seam: request/response types, the [`Transport`] trait and credentials.
//!
//! ## Contents
//! - [`Transport`] async trait every network call goes through
//! - [`HttpRequest`], [`HttpResponse`], [`Method`] plain request/response model
//! - [`Credentials`] builds the same-origin `Authorization` header (or defers to a [`HeaderHook`])
//! - [`ApiClient`] credentialed JSON GET/POST with status checking
//! - [`HttpTransport`] reqwest-backed implementation (feature `http`)

mod auth;
mod client;
#[cfg(feature = "http")]
mod http;
mod request;

pub use auth::{Credentials, HeaderHook};
pub use client::ApiClient;
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use request::{HttpRequest, HttpResponse, Method, Transport};
