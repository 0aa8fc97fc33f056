//! Rust SDK for the Perplexity API.
//!
//! Covers chat completions (buffered and streamed over Server-Sent Events),
//! asynchronous chat completions and web search. Transient failures
//! (408, 409, 429, 5xx and transport errors) are retried with exponential
//! backoff and jitter; every call accepts a cancellation token.
//!
//! # Example
//!
//! ```ignore
//! use perplexity_sdk::{ChatMessage, Client, CompletionParams};
//!
//! let client = Client::from_env()?;
//! let params = CompletionParams::new("sonar", vec![ChatMessage::user("What is Rust?")]);
//!
//! let mut stream = client.chat().create_stream(params).await?;
//! while let Some(chunk) = stream.next().await? {
//!     print!("{}", chunk.text());
//! }
//! ```

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod sse;
pub mod stream;
pub mod types;

/// SDK version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use backoff::Backoff;
pub use client::Client;
pub use config::ClientConfig;
pub use error::ApiError;
pub use error::ErrorKind;
pub use error::PerplexityError;
pub use error::Result;
pub use stream::ChatStream;
pub use tokio_util::sync::CancellationToken;
pub use types::*;
