//! EIP-712 Struct Engine
//!
//! Schema and encoding machinery for EIP-712 typed structured data.
//!
//! # Architecture
//!
//! This crate provides:
//! - **eip712::structs**: struct type definitions with ordered members
//! - **eip712::resolver**: canonical type signatures and type hashes
//! - **eip712::instance**: value binding, `encodeData` and `hashStruct`
//! - **eip712::types**: the field-type capability and the standard types
//! - **eip712::hasher**: domain separator and the final signable digest
//! - **utils**: Keccak-256, structured logging, codec configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use eip712_structs::{StructInstance, StructType, Uint, StringType};
//!
//! let foo = StructType::builder("Foo")
//!     .field("a", Uint::U256)
//!     .field("b", StringType)
//!     .build()?;
//! let instance = StructInstance::new(&foo, [("a", json!(1)), ("b", json!("x"))])?;
//!
//! let type_hash = foo.type_hash()?;
//! let encoded = instance.encode_data()?;
//! ```

pub mod error;
pub mod eip712;
pub mod utils;

// Re-export key types for convenience
pub use error::{Eip712Error, Eip712Result, ErrorCode};
pub use eip712::{
    encode_type,
    hash_typed_data,
    reference_closure,
    type_hash,
    Address,
    Array,
    Boolean,
    Bytes,
    Eip712Domain,
    Eip712Type,
    FieldType,
    FixedBytes,
    Int,
    Member,
    StringType,
    StructBuilder,
    StructId,
    StructInstance,
    StructType,
    Uint,
};
pub use utils::crypto::keccak256;
pub use utils::codec_config::{CodecSettings, UnknownFieldPolicy};
