//! EIP-712 Hashing
//!
//! Domain separator and the final digest over a struct instance.

use super::instance::StructInstance;
use super::structs::StructType;
use super::types::{Address, FixedBytes, StringType, Uint};
use crate::error::Eip712Result;
use crate::utils::crypto::keccak256;
use serde_json::Value;

/// Magic prefix for EIP-712 encoding
pub const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// Name of the domain struct type
pub const DOMAIN_TYPE_NAME: &str = "EIP712Domain";

/// The EIP-712 domain separator data
///
/// Only the fields that are set become members of the `EIP712Domain` type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Eip712Domain {
    /// The human-readable name of the signing domain
    pub name: Option<String>,
    /// The current major version of the signing domain
    pub version: Option<String>,
    /// The EIP-155 chain ID (number, decimal or hex string)
    pub chain_id: Option<Value>,
    /// The address of the contract that will verify the signature
    pub verifying_contract: Option<String>,
    /// An optional disambiguating salt (hex)
    pub salt: Option<String>,
}

impl Eip712Domain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<Value>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    pub fn with_verifying_contract(mut self, address: impl Into<String>) -> Self {
        self.verifying_contract = Some(address.into());
        self
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// `EIP712Domain` struct type holding the present fields in canonical order
    pub fn as_struct_type(&self) -> Eip712Result<StructType> {
        let mut builder = StructType::builder(DOMAIN_TYPE_NAME);

        if self.name.is_some() {
            builder = builder.field("name", StringType);
        }
        if self.version.is_some() {
            builder = builder.field("version", StringType);
        }
        if self.chain_id.is_some() {
            builder = builder.field("chainId", Uint::U256);
        }
        if self.verifying_contract.is_some() {
            builder = builder.field("verifyingContract", Address);
        }
        if self.salt.is_some() {
            builder = builder.field("salt", FixedBytes::B32);
        }

        builder.build()
    }

    /// The domain as an instance of its own struct type
    pub fn to_instance(&self) -> Eip712Result<StructInstance> {
        let struct_type = self.as_struct_type()?;

        let values = [
            ("name", self.name.clone().map(Value::String)),
            ("version", self.version.clone().map(Value::String)),
            ("chainId", self.chain_id.clone()),
            ("verifyingContract", self.verifying_contract.clone().map(Value::String)),
            ("salt", self.salt.clone().map(Value::String)),
        ];

        StructInstance::new(
            &struct_type,
            values
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        )
    }

    /// Calculate the domain separator hash
    ///
    /// domainSeparator = hashStruct(eip712Domain)
    pub fn separator(&self) -> Eip712Result<[u8; 32]> {
        self.to_instance()?.hash_struct()
    }
}

/// Bytes that are hashed for signing
///
/// "\x19\x01" || domainSeparator || hashStruct(message)
pub fn signable_bytes(domain: &Eip712Domain, message: &StructInstance) -> Eip712Result<Vec<u8>> {
    Ok(prefixed(&domain.separator()?, &message.hash_struct()?))
}

fn prefixed(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(EIP712_PREFIX.len() + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(domain_separator);
    data.extend_from_slice(struct_hash);
    data
}

/// Calculate the final EIP-712 hash for signing
///
/// hash = keccak256("\x19\x01" || domainSeparator || hashStruct(message))
pub fn hash_typed_data(domain: &Eip712Domain, message: &StructInstance) -> Eip712Result<[u8; 32]> {
    let digest = keccak256(&signable_bytes(domain, message)?);

    crate::log_debug!(
        "eip712::hasher",
        "Computed typed data digest",
        primary_type = message.struct_type().name(),
        digest = format!("0x{}", hex::encode(digest)),
    );

    Ok(digest)
}

/// Get the pre-image components (for external signing)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub final_hash: [u8; 32],
}

/// Calculate the pre-image components for EIP-712
pub fn get_pre_image(domain: &Eip712Domain, message: &StructInstance) -> Eip712Result<Eip712PreImage> {
    let domain_separator = domain.separator()?;
    let struct_hash = message.hash_struct()?;
    let final_hash = keccak256(&prefixed(&domain_separator, &struct_hash));

    Ok(Eip712PreImage {
        domain_separator,
        struct_hash,
        final_hash,
    })
}

#[cfg(test)]
mod hasher_tests {
    use super::*;
    use serde_json::json;

    fn ether_mail_domain() -> Eip712Domain {
        Eip712Domain::new()
            .with_name("Ether Mail")
            .with_version("1")
            .with_chain_id(1)
            .with_verifying_contract("0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC")
    }

    #[test]
    fn test_domain_type_only_has_present_fields() {
        let domain = Eip712Domain::new().with_name("Test").with_chain_id(1);
        assert_eq!(
            domain.as_struct_type().unwrap().encode_type().unwrap(),
            "EIP712Domain(string name,uint256 chainId)"
        );

        let full = ether_mail_domain().with_salt(format!("0x{}", "ab".repeat(32)));
        assert_eq!(
            full.as_struct_type().unwrap().encode_type().unwrap(),
            "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract,bytes32 salt)"
        );
    }

    #[test]
    fn test_domain_separator() {
        let separator = ether_mail_domain().separator().unwrap();
        assert_eq!(
            hex::encode(separator),
            "f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
        );
    }

    #[test]
    fn test_hex_chain_id_matches_numeric() {
        let numeric = Eip712Domain::new().with_name("Test").with_chain_id(137);
        let hex_id = Eip712Domain::new().with_name("Test").with_chain_id("0x89");
        assert_eq!(numeric.separator().unwrap(), hex_id.separator().unwrap());
    }

    #[test]
    fn test_signable_bytes_layout() {
        let message_type = StructType::builder("Message")
            .field("content", StringType)
            .build()
            .unwrap();
        let message =
            StructInstance::new(&message_type, [("content", json!("Hello World"))]).unwrap();
        let domain = Eip712Domain::new().with_name("Test").with_chain_id(1);

        let bytes = signable_bytes(&domain, &message).unwrap();
        assert_eq!(bytes.len(), 66);
        assert_eq!(&bytes[..2], EIP712_PREFIX);
        assert_eq!(&bytes[2..34], &domain.separator().unwrap());
        assert_eq!(&bytes[34..], &message.hash_struct().unwrap());

        let pre_image = get_pre_image(&domain, &message).unwrap();
        assert_eq!(pre_image.final_hash, hash_typed_data(&domain, &message).unwrap());
        assert_eq!(&pre_image.domain_separator[..], &bytes[2..34]);
        assert_eq!(&pre_image.struct_hash[..], &bytes[34..]);
        assert_eq!(pre_image.final_hash, keccak256(&bytes));
    }
}
