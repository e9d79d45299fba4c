//! `esr-request`: the `Request` type — descriptor-driven construction, the
//! mutable surface (info pairs, callback, flags, originator signature),
//! and the binary frame / text carrier codec. Resolving a request into a
//! concrete, signable transaction is `esr-resolve`'s job.

pub mod descriptor;
pub mod frame;
pub mod request;
pub mod uri;

pub use descriptor::{
    ActionDataInput, ActionInput, CallbackSpec, ChainIdSpec, IdentityArgs, InfoValue,
    RequestDescriptor, RequestOptions, TransactionInput,
};
pub use frame::OriginatorSignature;
pub use request::{identity_body_value, Request};
