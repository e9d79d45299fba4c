//! `esr-resolve`: turns a [`esr_request::Request`] into a concrete,
//! signable transaction (§4.5), then derives a callback (§4.6) or an
//! identity proof (§4.8) from the result.
//!
//! Everything here is synchronous given an already-fetched ABI map — the
//! only suspending step in the whole protocol (fetching an ABI by account
//! name) happens behind the [`esr_abi::AbiProvider`] trait, one layer down.

pub mod callback;
pub mod context;
pub mod identity_proof;
pub mod resolve;
pub mod resolved_request;

pub use callback::{get_callback, CallbackPayload, ResolvedCallback};
pub use context::{format_timestamp, parse_timestamp, TransactionContext};
pub use identity_proof::IdentityProof;
pub use resolve::{resolve, resolve_actions, resolve_transaction};
pub use resolved_request::{ResolvedAction, ResolvedRequest, ResolvedTransaction};
