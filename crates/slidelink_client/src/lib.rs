// --- File: crates/slidelink_client/src/lib.rs ---
//! Extension-side pairing client.
//!
//! After the extension registers a device and shows the user a pairing code,
//! this crate polls the exchange endpoint until the dashboard side links the
//! code and a bearer token comes back, the code dies, or the user gives up.

// Declare modules within this crate
pub mod api;
pub mod poller;

pub use api::{ExchangeApi, ExchangeOutcome, HttpExchangeApi};
pub use poller::{cancel_pair, CancelHandle, PairingPoller, PollConfig, PollFailure, PollOutcome, PollState};
