//! EIP-712 Field Types
//!
//! The field-type capability every struct member carries, plus the standard
//! atomic, dynamic and array types.

use super::encoder::{
    address_word, encode_int_word, encode_uint_word, parse_address, parse_hex, parse_integer,
    Word,
};
use super::instance::hash_struct_value;
use super::structs::StructType;
use crate::error::{Eip712Error, Eip712Result};
use crate::utils::codec_config::{current_settings, CodecSettings};
use crate::utils::crypto::{keccak256, keccak256_iter};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Capability implemented by every leaf field type
///
/// `encode_value` receives `Value::Null` for a field that was never set and
/// must produce the type's zero/empty encoding for it.
pub trait Eip712Type: fmt::Debug + Send + Sync {
    /// Name as it appears in type signatures (e.g. `uint256`, `Person[]`)
    fn type_name(&self) -> String;

    /// Encode a value into its `encodeData` contribution
    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>>;

    /// [`Eip712Type::encode_value`] under explicit codec settings
    ///
    /// Only types that can contain struct values need to override this.
    fn encode_value_with(&self, value: &Value, _settings: &CodecSettings) -> Eip712Result<Vec<u8>> {
        self.encode_value(value)
    }

    /// Struct type reachable through this field type, if any
    fn struct_reference(&self) -> Option<&StructType> {
        None
    }
}

/// Descriptor attached to a struct member
#[derive(Clone)]
pub enum FieldType {
    /// Atomic, dynamic or array type
    Leaf(Arc<dyn Eip712Type>),
    /// Reference to another struct type
    Struct(StructType),
}

impl FieldType {
    pub fn type_name(&self) -> String {
        match self {
            FieldType::Leaf(leaf) => leaf.type_name(),
            FieldType::Struct(ty) => ty.name().to_string(),
        }
    }

    /// Encode under the global codec settings
    pub fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        self.encode_value_with(value, &current_settings())
    }

    /// Encode under explicit settings; nested struct values inherit them
    pub fn encode_value_with(&self, value: &Value, settings: &CodecSettings) -> Eip712Result<Vec<u8>> {
        match self {
            FieldType::Leaf(leaf) => leaf.encode_value_with(value, settings),
            FieldType::Struct(ty) => Ok(hash_struct_value(ty, value, settings)?.to_vec()),
        }
    }

    pub fn struct_reference(&self) -> Option<&StructType> {
        match self {
            FieldType::Leaf(leaf) => leaf.struct_reference(),
            FieldType::Struct(ty) => Some(ty),
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Struct members are not expanded; schemas may be cyclic
        write!(f, "FieldType({})", self.type_name())
    }
}

impl<T: Eip712Type + 'static> From<T> for FieldType {
    fn from(leaf: T) -> Self {
        FieldType::Leaf(Arc::new(leaf))
    }
}

impl From<StructType> for FieldType {
    fn from(ty: StructType) -> Self {
        FieldType::Struct(ty)
    }
}

impl From<&StructType> for FieldType {
    fn from(ty: &StructType) -> Self {
        FieldType::Struct(ty.clone())
    }
}

/// `address`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address;

impl Eip712Type for Address {
    fn type_name(&self) -> String {
        "address".to_string()
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        match value {
            Value::Null => Ok(vec![0u8; 32]),
            Value::String(s) => Ok(address_word(&parse_address(s)?).to_vec()),
            _ => Err(Eip712Error::invalid_value("address", value)),
        }
    }
}

/// `bool`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boolean;

impl Eip712Type for Boolean {
    fn type_name(&self) -> String {
        "bool".to_string()
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        let flag = match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => return Err(Eip712Error::invalid_value("bool", value)),
        };
        let mut word = [0u8; 32];
        word[31] = u8::from(flag);
        Ok(word.to_vec())
    }
}

/// `uintN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uint {
    bits: u16,
}

impl Uint {
    pub const U8: Uint = Uint { bits: 8 };
    pub const U256: Uint = Uint { bits: 256 };

    pub fn new(bits: u16) -> Eip712Result<Self> {
        check_int_bits("uint", bits)?;
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }
}

impl Eip712Type for Uint {
    fn type_name(&self) -> String {
        format!("uint{}", self.bits)
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        if value.is_null() {
            return Ok(vec![0u8; 32]);
        }
        let type_name = self.type_name();
        let n = parse_integer(&type_name, value)?;
        Ok(encode_uint_word(&type_name, &n, self.bits)?.to_vec())
    }
}

/// `intN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int {
    bits: u16,
}

impl Int {
    pub const I256: Int = Int { bits: 256 };

    pub fn new(bits: u16) -> Eip712Result<Self> {
        check_int_bits("int", bits)?;
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }
}

impl Eip712Type for Int {
    fn type_name(&self) -> String {
        format!("int{}", self.bits)
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        if value.is_null() {
            return Ok(vec![0u8; 32]);
        }
        let type_name = self.type_name();
        let n = parse_integer(&type_name, value)?;
        Ok(encode_int_word(&type_name, &n, self.bits)?.to_vec())
    }
}

fn check_int_bits(prefix: &str, bits: u16) -> Eip712Result<()> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(Eip712Error::InvalidType(format!("{}{}", prefix, bits)));
    }
    Ok(())
}

/// `bytesN` (1..=32), right-padded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBytes {
    size: usize,
}

impl FixedBytes {
    pub const B32: FixedBytes = FixedBytes { size: 32 };

    pub fn new(size: usize) -> Eip712Result<Self> {
        if size == 0 || size > 32 {
            return Err(Eip712Error::InvalidType(format!("bytes{}", size)));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Eip712Type for FixedBytes {
    fn type_name(&self) -> String {
        format!("bytes{}", self.size)
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        let mut word: Word = [0u8; 32];
        match value {
            Value::Null => {}
            Value::String(s) => {
                let bytes = parse_hex(s)?;
                if bytes.len() > self.size {
                    return Err(Eip712Error::invalid_value(
                        self.type_name(),
                        format!("bytes too long: {} > {}", bytes.len(), self.size),
                    ));
                }
                word[..bytes.len()].copy_from_slice(&bytes);
            }
            _ => return Err(Eip712Error::invalid_value(self.type_name(), value)),
        }
        Ok(word.to_vec())
    }
}

/// Dynamic `bytes`, encoded as the hash of its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bytes;

impl Eip712Type for Bytes {
    fn type_name(&self) -> String {
        "bytes".to_string()
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        match value {
            Value::Null => Ok(keccak256(&[]).to_vec()),
            Value::String(s) => Ok(keccak256(&parse_hex(s)?).to_vec()),
            _ => Err(Eip712Error::invalid_value("bytes", value)),
        }
    }
}

/// Dynamic `string`, encoded as the hash of its UTF-8 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringType;

impl Eip712Type for StringType {
    fn type_name(&self) -> String {
        "string".to_string()
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        match value {
            Value::Null => Ok(keccak256(&[]).to_vec()),
            Value::String(s) => Ok(keccak256(s.as_bytes()).to_vec()),
            _ => Err(Eip712Error::invalid_value("string", value)),
        }
    }
}

/// Largest `k` accepted for a fixed-size array `T[k]`
pub const MAX_FIXED_ARRAY_LENGTH: usize = 1 << 20;

/// `T[]` or `T[k]`
///
/// Encoded as the hash of the concatenated element encodings.
#[derive(Debug, Clone)]
pub struct Array {
    element: FieldType,
    length: Option<usize>,
}

impl Array {
    /// Dynamically sized array
    pub fn new(element: impl Into<FieldType>) -> Self {
        Self {
            element: element.into(),
            length: None,
        }
    }

    /// Fixed size array, at most [`MAX_FIXED_ARRAY_LENGTH`] elements
    pub fn fixed(element: impl Into<FieldType>, length: usize) -> Eip712Result<Self> {
        let element = element.into();
        if length > MAX_FIXED_ARRAY_LENGTH {
            return Err(Eip712Error::InvalidType(format!(
                "{}[{}]",
                element.type_name(),
                length
            )));
        }
        Ok(Self {
            element,
            length: Some(length),
        })
    }

    pub fn element(&self) -> &FieldType {
        &self.element
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }
}

impl Eip712Type for Array {
    fn type_name(&self) -> String {
        match self.length {
            Some(len) => format!("{}[{}]", self.element.type_name(), len),
            None => format!("{}[]", self.element.type_name()),
        }
    }

    fn encode_value(&self, value: &Value) -> Eip712Result<Vec<u8>> {
        self.encode_value_with(value, &current_settings())
    }

    fn encode_value_with(&self, value: &Value, settings: &CodecSettings) -> Eip712Result<Vec<u8>> {
        let items = match value {
            Value::Null => {
                // An absent fixed-size array is `length` absent elements
                let Some(len) = self.length else {
                    return Ok(keccak256(&[]).to_vec());
                };
                let absent = self.element.encode_value_with(&Value::Null, settings)?;
                let parts = std::iter::repeat(absent.as_slice()).take(len);
                return Ok(keccak256_iter(parts).to_vec());
            }
            Value::Array(items) => items,
            _ => return Err(Eip712Error::invalid_value(self.type_name(), value)),
        };

        if let Some(len) = self.length {
            if items.len() != len {
                return Err(Eip712Error::invalid_value(
                    self.type_name(),
                    format!("expected {} elements, got {}", len, items.len()),
                ));
            }
        }

        let mut encoded = Vec::with_capacity(items.len() * 32);
        for item in items {
            encoded.extend(self.element.encode_value_with(item, settings)?);
        }

        Ok(keccak256(&encoded).to_vec())
    }

    fn struct_reference(&self) -> Option<&StructType> {
        self.element.struct_reference()
    }
}

/// Build a leaf field type from its EIP-712 name
///
/// Covers atomic and dynamic types and arrays of them (`uint256[]`,
/// `bytes32[2][]`). Struct names are not resolvable from a string; use the
/// struct's handle instead.
pub fn parse_type(type_name: &str) -> Eip712Result<FieldType> {
    if let Some(stripped) = type_name.strip_suffix(']') {
        let bracket_pos = stripped
            .rfind('[')
            .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;
        let element = parse_type(&stripped[..bracket_pos])?;
        let dim = &stripped[bracket_pos + 1..];

        if dim.is_empty() {
            return Ok(Array::new(element).into());
        }
        let length: usize = parse_decimal(dim)
            .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;
        return Ok(Array::fixed(element, length)?.into());
    }

    if !is_atomic_type(type_name) && !is_dynamic_type(type_name) {
        return Err(Eip712Error::InvalidType(type_name.to_string()));
    }

    let field: FieldType = match type_name {
        "address" => Address.into(),
        "bool" => Boolean.into(),
        "bytes" => Bytes.into(),
        "string" => StringType.into(),
        _ => {
            if let Some(bits) = type_name.strip_prefix("uint") {
                Uint::new(parse_width(type_name, bits)?)?.into()
            } else if let Some(bits) = type_name.strip_prefix("int") {
                Int::new(parse_width(type_name, bits)?)?.into()
            } else if let Some(size) = type_name.strip_prefix("bytes") {
                FixedBytes::new(usize::from(parse_width(type_name, size)?))?.into()
            } else {
                return Err(Eip712Error::InvalidType(type_name.to_string()));
            }
        }
    };
    Ok(field)
}

fn parse_width(type_name: &str, digits: &str) -> Eip712Result<u16> {
    parse_decimal(digits).ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))
}

/// Plain decimal: ASCII digits only, no sign, no leading zero
fn parse_decimal<T: std::str::FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok()
}

/// Check if a type is an atomic (fixed-size) type
pub fn is_atomic_type(type_name: &str) -> bool {
    // address
    if type_name == "address" {
        return true;
    }

    // bool
    if type_name == "bool" {
        return true;
    }

    // uintN and intN
    if let Some(bits) = type_name
        .strip_prefix("uint")
        .or_else(|| type_name.strip_prefix("int"))
    {
        return parse_decimal::<u16>(bits).map_or(false, |n| n > 0 && n <= 256 && n % 8 == 0);
    }

    // bytesN (fixed-size bytes)
    if let Some(size) = type_name.strip_prefix("bytes") {
        return parse_decimal::<u16>(size).map_or(false, |n| n > 0 && n <= 32);
    }

    false
}

/// Check if a type is a dynamic type
pub fn is_dynamic_type(type_name: &str) -> bool {
    type_name == "bytes" || type_name == "string"
}

#[cfg(test)]
mod type_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_atomic_types() {
        assert!(is_atomic_type("address"));
        assert!(is_atomic_type("bool"));
        assert!(is_atomic_type("uint256"));
        assert!(is_atomic_type("uint8"));
        assert!(is_atomic_type("int256"));
        assert!(is_atomic_type("bytes32"));
        assert!(is_atomic_type("bytes1"));

        assert!(!is_atomic_type("string"));
        assert!(!is_atomic_type("bytes"));
        assert!(!is_atomic_type("uint"));
        assert!(!is_atomic_type("uint257"));
        assert!(!is_atomic_type("bytes33"));
    }

    #[test]
    fn test_dynamic_types() {
        assert!(is_dynamic_type("bytes"));
        assert!(is_dynamic_type("string"));

        assert!(!is_dynamic_type("bytes32"));
        assert!(!is_dynamic_type("address"));
    }

    #[test]
    fn test_parse_type_names_roundtrip() {
        for name in [
            "address", "bool", "uint8", "uint256", "int128", "bytes1", "bytes32", "bytes",
            "string", "uint256[]", "bytes32[4]", "address[][2]",
        ] {
            assert_eq!(parse_type(name).unwrap().type_name(), name);
        }
    }

    #[test]
    fn test_parse_type_rejects_unknown() {
        assert!(matches!(parse_type("uint7"), Err(Eip712Error::InvalidType(_))));
        assert!(matches!(parse_type("Person"), Err(Eip712Error::InvalidType(_))));
        assert!(matches!(parse_type("uint256[x]"), Err(Eip712Error::InvalidType(_))));
        assert!(matches!(parse_type("uint256]"), Err(Eip712Error::InvalidType(_))));
    }

    #[test]
    fn test_widths_must_be_plain_decimals() {
        for name in ["uint+8", "uint08", "int+256", "bytes01", "bytes+4", "uint256[+2]", "uint256[02]"] {
            assert!(
                matches!(parse_type(name), Err(Eip712Error::InvalidType(_))),
                "{} accepted",
                name
            );
        }
        assert!(!is_atomic_type("uint08"));
        assert!(!is_atomic_type("int+8"));
        assert_eq!(parse_type("uint256[0]").unwrap().type_name(), "uint256[0]");
    }

    #[test]
    fn test_fixed_array_length_is_bounded() {
        assert!(matches!(
            Array::fixed(Uint::U256, usize::MAX),
            Err(Eip712Error::InvalidType(_))
        ));
        assert!(matches!(
            parse_type("uint256[1000000000000]"),
            Err(Eip712Error::InvalidType(_))
        ));
        assert!(Array::fixed(Uint::U256, MAX_FIXED_ARRAY_LENGTH).is_ok());
    }

    #[test]
    fn test_absent_fixed_array_hashes_zero_elements() {
        let fixed = Array::fixed(Uint::U256, 4096).unwrap();
        assert_eq!(
            fixed.encode_value(&Value::Null).unwrap(),
            keccak256(&vec![0u8; 4096 * 32]).to_vec()
        );

        let nested = Array::fixed(Array::fixed(StringType, 3).unwrap(), 2).unwrap();
        let inner = keccak256(&keccak256(&[]).repeat(3));
        assert_eq!(
            nested.encode_value(&Value::Null).unwrap(),
            keccak256(&inner.repeat(2)).to_vec()
        );
    }

    #[test]
    fn test_constructor_bounds() {
        assert!(Uint::new(0).is_err());
        assert!(Uint::new(12).is_err());
        assert!(Int::new(264).is_err());
        assert!(FixedBytes::new(33).is_err());
        assert_eq!(Uint::new(64).unwrap().bits(), 64);
    }

    #[test]
    fn test_absent_values_encode_as_zero() {
        let zero = vec![0u8; 32];
        assert_eq!(Address.encode_value(&Value::Null).unwrap(), zero);
        assert_eq!(Boolean.encode_value(&Value::Null).unwrap(), zero);
        assert_eq!(Uint::U256.encode_value(&Value::Null).unwrap(), zero);
        assert_eq!(Int::I256.encode_value(&Value::Null).unwrap(), zero);
        assert_eq!(FixedBytes::B32.encode_value(&Value::Null).unwrap(), zero);

        let empty_hash = keccak256(&[]).to_vec();
        assert_eq!(Bytes.encode_value(&Value::Null).unwrap(), empty_hash);
        assert_eq!(StringType.encode_value(&Value::Null).unwrap(), empty_hash);
        assert_eq!(Array::new(Uint::U256).encode_value(&Value::Null).unwrap(), empty_hash);
    }

    #[test]
    fn test_atomic_encodings() {
        let encoded = Address
            .encode_value(&json!("0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"))
            .unwrap();
        assert_eq!(
            hex::encode(encoded),
            "000000000000000000000000cd2a3d9f938e13cd947ec05abc7fe734df8dd826"
        );

        let encoded = Boolean.encode_value(&json!(true)).unwrap();
        assert_eq!(encoded[31], 1);

        let encoded = FixedBytes::new(4).unwrap().encode_value(&json!("0xdeadbeef")).unwrap();
        assert_eq!(&encoded[..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(encoded[4..].iter().all(|&b| b == 0));

        assert!(FixedBytes::new(2).unwrap().encode_value(&json!("0xdeadbeef")).is_err());
        assert!(Boolean.encode_value(&json!(1)).is_err());
        assert!(Address.encode_value(&json!(7)).is_err());
    }

    #[test]
    fn test_dynamic_encodings() {
        assert_eq!(
            StringType.encode_value(&json!("Hello, Bob!")).unwrap(),
            keccak256(b"Hello, Bob!").to_vec()
        );
        assert_eq!(
            Bytes.encode_value(&json!("0x0102")).unwrap(),
            keccak256(&[1, 2]).to_vec()
        );
    }

    #[test]
    fn test_array_encoding() {
        let array = Array::new(Uint::U256);
        let encoded = array.encode_value(&json!([1, 2])).unwrap();

        let mut expected = Vec::new();
        expected.extend(Uint::U256.encode_value(&json!(1)).unwrap());
        expected.extend(Uint::U256.encode_value(&json!(2)).unwrap());
        assert_eq!(encoded, keccak256(&expected).to_vec());
        assert_eq!(
            FieldType::from(Array::new(Uint::U256)).encode_value(&json!([1, 2])).unwrap(),
            encoded
        );

        let fixed = Array::fixed(Uint::U256, 3).unwrap();
        assert!(fixed.encode_value(&json!([1, 2])).is_err());
        assert_eq!(
            fixed.encode_value(&Value::Null).unwrap(),
            fixed.encode_value(&json!([0, 0, 0])).unwrap()
        );
        assert!(array.encode_value(&json!("nope")).is_err());
    }

    #[test]
    fn test_leaf_has_no_struct_reference() {
        assert!(parse_type("uint256[]").unwrap().struct_reference().is_none());
        assert!(Address.struct_reference().is_none());
    }
}
