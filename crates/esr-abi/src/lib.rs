//! `esr-abi`: the ABI-aware action data codec and the built-in identity ABI.
//!
//! This is the one place the signing request protocol's generic [`Value`]
//! tree meets contract-defined, externally-fetched schema — everything
//! else in the workspace is monomorphic over raw bytes.
//!
//! [`Value`]: esr_core::value::Value

pub mod abi;
pub mod codec;
pub mod identity;
pub mod types;

pub use abi::{Abi, AbiMap, AbiProvider, ActionDef};
pub use identity::{built_in_identity_abi_v2, built_in_identity_abi_v3};
pub use types::FieldType;
