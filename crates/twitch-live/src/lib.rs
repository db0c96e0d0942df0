//! Live-status checks for Twitch channels.
//!
//! A check runs in two phases, each governed by a [`RetryScheduler`]:
//!
//! 1. [`CredentialFetcher`] scrapes the ephemeral `clientId` from the channel page.
//! 2. [`StreamStatusProber`] queries the GQL endpoint with that id and classifies
//!    the channel as live, offline or unknown.
//!
//! [`LiveChecker`] wires both phases together.

pub mod checker;
pub mod client;
pub mod clock;
pub mod credential;
pub mod error;
pub mod retry;
pub mod status;
pub mod target;

pub use checker::{CheckConfig, LiveChecker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{Credential, CredentialFetcher};
pub use error::{Phase, ProbeError};
pub use retry::{BackoffPolicy, RetryScheduler};
pub use status::{ProbeResult, StatusSource, StreamStatusProber};
pub use target::Target;
