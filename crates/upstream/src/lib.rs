pub mod client;
pub mod error;
pub mod retry;
pub mod wire;

pub use client::UpstreamClient;
pub use error::UpstreamError;
pub use retry::{with_backoff, RetryPolicy, Sleeper, TokioSleeper};
pub use wire::{EmployeeRecord, Envelope};
