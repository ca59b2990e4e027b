//! EIP-712 Struct Instances
//!
//! A [`StructInstance`] binds values to the members of a [`StructType`] and
//! produces `encodeData` and `hashStruct` for them.

use super::resolver::type_hash_with;
use super::structs::StructType;
use crate::error::{Eip712Error, Eip712Result};
use crate::utils::codec_config::{current_settings, CodecSettings, UnknownFieldPolicy};
use crate::utils::crypto::keccak256_concat;
use serde_json::{Map, Value};
use std::collections::HashMap;

static ABSENT: Value = Value::Null;

/// Values bound to a struct type
///
/// Only declared fields are stored. A field that was never set is absent and
/// encodes as its type's zero/empty value.
#[derive(Debug, Clone)]
pub struct StructInstance {
    struct_type: StructType,
    values: HashMap<String, Value>,
    settings: CodecSettings,
}

impl StructInstance {
    /// Bind named values against the declared fields using the global settings
    pub fn new<I, K>(struct_type: &StructType, values: I) -> Eip712Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::with_settings(struct_type, values, current_settings())
    }

    /// Bind named values with explicit settings
    pub fn with_settings<I, K>(
        struct_type: &StructType,
        values: I,
        settings: CodecSettings,
    ) -> Eip712Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        settings.ensure_usable()?;
        let members = struct_type.members()?;
        let mut bound = HashMap::with_capacity(members.len());

        for (name, value) in values {
            let name = name.into();
            if members.iter().any(|m| m.name() == name) {
                bound.insert(name, value);
                continue;
            }

            match settings.unknown_fields {
                UnknownFieldPolicy::Reject => {
                    return Err(Eip712Error::FieldNotDeclared {
                        struct_name: struct_type.name().to_string(),
                        field: name,
                    });
                }
                UnknownFieldPolicy::Ignore => {
                    if settings.log_unknown_fields {
                        crate::log_debug!(
                            "eip712::instance",
                            "Dropped unknown field",
                            struct_name = struct_type.name(),
                            field = name,
                        );
                    }
                }
            }
        }

        Ok(Self {
            struct_type: struct_type.clone(),
            values: bound,
            settings,
        })
    }

    /// Instance with every field absent
    pub fn empty(struct_type: &StructType) -> Eip712Result<Self> {
        Self::new(struct_type, std::iter::empty::<(String, Value)>())
    }

    /// Bind from a JSON object; `null` yields an instance with every field absent
    pub fn from_value(struct_type: &StructType, value: &Value) -> Eip712Result<Self> {
        Self::from_value_with(struct_type, value, current_settings())
    }

    /// [`StructInstance::from_value`] with explicit settings
    pub fn from_value_with(
        struct_type: &StructType,
        value: &Value,
        settings: CodecSettings,
    ) -> Eip712Result<Self> {
        match value {
            Value::Null => Self::with_settings(struct_type, Map::new(), settings),
            Value::Object(obj) => Self::with_settings(
                struct_type,
                obj.iter().map(|(k, v)| (k.clone(), v.clone())),
                settings,
            ),
            _ => Err(Eip712Error::invalid_value(struct_type.name(), value)),
        }
    }

    pub fn struct_type(&self) -> &StructType {
        &self.struct_type
    }

    /// Current value of a declared field; `None` if absent or undeclared
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Replace the value of a declared field, returning the previous one
    ///
    /// Undeclared names leave the instance untouched and fail.
    pub fn set_value(&mut self, name: &str, value: Value) -> Eip712Result<Option<Value>> {
        self.ensure_declared(name)?;
        Ok(self.values.insert(name.to_string(), value))
    }

    /// Return a declared field to the absent state
    pub fn clear_value(&mut self, name: &str) -> Eip712Result<Option<Value>> {
        self.ensure_declared(name)?;
        Ok(self.values.remove(name))
    }

    /// Set fields in declaration order
    pub fn values(&self) -> Eip712Result<Vec<(&str, &Value)>> {
        Ok(self
            .struct_type
            .members()?
            .iter()
            .filter_map(|m| self.values.get(m.name()).map(|v| (m.name(), v)))
            .collect())
    }

    fn ensure_declared(&self, name: &str) -> Eip712Result<()> {
        if self.struct_type.member(name)?.is_none() {
            return Err(Eip712Error::FieldNotDeclared {
                struct_name: self.struct_type.name().to_string(),
                field: name.to_string(),
            });
        }
        Ok(())
    }

    /// Type hash of the bound struct type
    pub fn type_hash(&self) -> Eip712Result<[u8; 32]> {
        type_hash_with(&self.struct_type, &self.settings)
    }

    /// `encodeData`: each member's encoding, in declaration order
    ///
    /// Nested struct values are bound with this instance's settings.
    pub fn encode_data(&self) -> Eip712Result<Vec<u8>> {
        let members = self.struct_type.members()?;
        let mut encoded = Vec::with_capacity(members.len() * 32);

        for member in members {
            let value = self.values.get(member.name()).unwrap_or(&ABSENT);
            encoded.extend(member.field_type().encode_value_with(value, &self.settings)?);
        }

        Ok(encoded)
    }

    /// Hash a struct according to EIP-712
    ///
    /// hashStruct(s) = keccak256(typeHash || encodeData(s))
    pub fn hash_struct(&self) -> Eip712Result<[u8; 32]> {
        // Type hash first: it rejects cyclic schemas before encoding recurses
        let type_hash = self.type_hash()?;
        let encoded = self.encode_data()?;
        Ok(keccak256_concat(&[type_hash.as_slice(), encoded.as_slice()]))
    }
}

/// Encoding of a struct-typed field: the nested value's `hashStruct`
pub(crate) fn hash_struct_value(
    struct_type: &StructType,
    value: &Value,
    settings: &CodecSettings,
) -> Eip712Result<[u8; 32]> {
    StructInstance::from_value_with(struct_type, value, settings.clone())?.hash_struct()
}
