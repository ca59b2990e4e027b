//! EIP-712 Struct Schemas
//!
//! Struct type definitions, canonical type signatures and value encoding for
//! EIP-712 typed structured data.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use eip712_structs::eip712::{Address, StringType, StructInstance, StructType};
//!
//! let person = StructType::builder("Person")
//!     .field("name", StringType)
//!     .field("wallet", Address)
//!     .build()?;
//! let mail = StructType::builder("Mail")
//!     .field("from", &person)
//!     .field("to", &person)
//!     .build()?;
//!
//! assert_eq!(
//!     mail.encode_type()?,
//!     "Mail(Person from,Person to)Person(string name,address wallet)"
//! );
//! let message = StructInstance::from_value(&mail, &json)?;
//! let struct_hash = message.hash_struct()?;
//! ```

pub mod types;
pub mod encoder;
pub mod structs;
pub mod resolver;
pub mod instance;
pub mod hasher;

pub use types::*;
pub use encoder::*;
pub use structs::*;
pub use resolver::*;
pub use instance::*;
pub use hasher::*;
