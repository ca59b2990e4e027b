//! EIP-712 Struct Types
//!
//! A [`StructType`] is a named, ordered list of members. Members are fixed
//! once at definition time; their order is part of the type's identity on
//! the wire (type signature and `encodeData`).
//!
//! Struct types are compared by the [`StructId`] handed out when they are
//! declared, never by shape: two independently defined `Person` types with
//! identical fields are different types.

use super::resolver;
use super::types::{is_atomic_type, is_dynamic_type, FieldType};
use crate::error::{Eip712Error, Eip712Result};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static NEXT_STRUCT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a struct type, assigned at declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructId(u64);

impl StructId {
    fn next() -> Self {
        StructId(NEXT_STRUCT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A field in a struct type definition
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    field_type: FieldType,
}

impl Member {
    /// The name of the field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of the field
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// `type name` fragment used in signatures
    pub fn signature(&self) -> String {
        format!("{} {}", self.field_type.type_name(), self.name)
    }
}

struct StructDef {
    id: StructId,
    name: String,
    members: OnceLock<Vec<Member>>,
}

/// Handle to a struct type definition
///
/// Cheap to clone and safe to share between threads. A type that references
/// itself (only possible through [`StructType::declare`]) keeps itself alive
/// for the rest of the process.
#[derive(Clone)]
pub struct StructType {
    def: Arc<StructDef>,
}

impl StructType {
    /// Start defining a new struct type
    pub fn builder(name: impl Into<String>) -> StructBuilder {
        StructBuilder::new(name)
    }

    /// Declare a struct type whose members are supplied later by [`define`]
    ///
    /// [`define`]: StructType::define
    pub fn declare(name: impl Into<String>) -> Eip712Result<Self> {
        let name = name.into();
        validate_struct_name(&name)?;

        Ok(Self {
            def: Arc::new(StructDef {
                id: StructId::next(),
                name,
                members: OnceLock::new(),
            }),
        })
    }

    /// Supply the members of a declared struct type
    ///
    /// Succeeds at most once per type.
    pub fn define(&self, builder: StructBuilder) -> Eip712Result<()> {
        if builder.name != self.def.name {
            return Err(Eip712Error::InvalidType(format!(
                "builder for {} cannot define {}",
                builder.name, self.def.name
            )));
        }

        let members = builder.into_members()?;
        let field_count = members.len();
        self.def
            .members
            .set(members)
            .map_err(|_| Eip712Error::AlreadyDefined(self.def.name.clone()))?;

        crate::log_debug!(
            "eip712::structs",
            "Defined struct type",
            struct_name = self.def.name,
            field_count = field_count,
        );
        Ok(())
    }

    pub fn id(&self) -> StructId {
        self.def.id
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn is_defined(&self) -> bool {
        self.def.members.get().is_some()
    }

    /// Members in declaration order
    pub fn members(&self) -> Eip712Result<&[Member]> {
        self.def
            .members
            .get()
            .map(Vec::as_slice)
            .ok_or_else(|| Eip712Error::UndefinedStruct(self.def.name.clone()))
    }

    /// Look up a member by name
    pub fn member(&self, name: &str) -> Eip712Result<Option<&Member>> {
        Ok(self.members()?.iter().find(|m| m.name == name))
    }

    /// Canonical type signature, dependencies included
    pub fn encode_type(&self) -> Eip712Result<String> {
        resolver::encode_type(self)
    }

    /// keccak256 of [`encode_type`](StructType::encode_type)
    pub fn type_hash(&self) -> Eip712Result<[u8; 32]> {
        resolver::type_hash(self)
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.def.id == other.def.id
    }
}

impl Eq for StructType {}

impl Hash for StructType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.def.id.hash(state);
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("StructType");
        debug.field("id", &self.def.id.0).field("name", &self.def.name);
        match self.def.members.get() {
            Some(members) => {
                let fields: Vec<String> = members.iter().map(Member::signature).collect();
                debug.field("fields", &fields)
            }
            None => debug.field("fields", &"<undefined>"),
        };
        debug.finish()
    }
}

/// Collects members in declaration order
#[derive(Debug, Clone)]
pub struct StructBuilder {
    name: String,
    fields: Vec<(String, FieldType)>,
}

impl StructBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn field(mut self, name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        self.fields.push((name.into(), field_type.into()));
        self
    }

    /// Declare and define the struct type in one step
    pub fn build(self) -> Eip712Result<StructType> {
        let ty = StructType::declare(self.name.clone())?;
        ty.define(self)?;
        Ok(ty)
    }

    fn into_members(self) -> Eip712Result<Vec<Member>> {
        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(self.fields.len());

        for (name, field_type) in self.fields {
            if !is_identifier(&name) {
                return Err(Eip712Error::InvalidType(format!(
                    "invalid field name '{}' in struct {}",
                    name, self.name
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(Eip712Error::DuplicateField {
                    struct_name: self.name,
                    field: name,
                });
            }
            members.push(Member { name, field_type });
        }

        Ok(members)
    }
}

fn validate_struct_name(name: &str) -> Eip712Result<()> {
    if !is_identifier(name) || is_atomic_type(name) || is_dynamic_type(name) {
        return Err(Eip712Error::InvalidType(format!("invalid struct name '{}'", name)));
    }
    Ok(())
}

/// Solidity identifier: `[A-Za-z_$][A-Za-z0-9_$]*`
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod struct_tests {
    use super::*;
    use crate::eip712::types::{Address, StringType, Uint};

    fn person() -> StructType {
        StructType::builder("Person")
            .field("name", StringType)
            .field("wallet", Address)
            .build()
            .unwrap()
    }

    #[test]
    fn test_members_keep_declaration_order() {
        let ty = StructType::builder("Order")
            .field("zeta", Uint::U256)
            .field("alpha", Address)
            .field("mid", StringType)
            .build()
            .unwrap();

        let names: Vec<&str> = ty.members().unwrap().iter().map(Member::name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(ty.members().unwrap()[1].signature(), "address alpha");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = StructType::builder("Person")
            .field("name", StringType)
            .field("name", Address)
            .build();

        assert_eq!(
            result.unwrap_err(),
            Eip712Error::DuplicateField {
                struct_name: "Person".to_string(),
                field: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(StructType::declare("").is_err());
        assert!(StructType::declare("Mail(").is_err());
        assert!(StructType::declare("1Mail").is_err());
        assert!(StructType::declare("uint256").is_err());
        assert!(StructType::declare("string").is_err());

        let result = StructType::builder("Mail").field("to field", Address).build();
        assert!(matches!(result, Err(Eip712Error::InvalidType(_))));
    }

    #[test]
    fn test_identity_is_by_declaration() {
        let a = person();
        let b = person();
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_declare_then_define_once() {
        let ty = StructType::declare("Node").unwrap();
        assert!(!ty.is_defined());
        assert_eq!(
            ty.members().unwrap_err(),
            Eip712Error::UndefinedStruct("Node".to_string())
        );

        ty.define(StructType::builder("Node").field("value", Uint::U256)).unwrap();
        assert!(ty.is_defined());
        assert_eq!(ty.members().unwrap().len(), 1);

        let again = ty.define(StructType::builder("Node").field("other", Uint::U256));
        assert_eq!(again.unwrap_err(), Eip712Error::AlreadyDefined("Node".to_string()));
        assert_eq!(ty.members().unwrap()[0].name(), "value");
    }

    #[test]
    fn test_define_with_mismatched_builder() {
        let ty = StructType::declare("Node").unwrap();
        let result = ty.define(StructType::builder("Leaf"));
        assert!(matches!(result, Err(Eip712Error::InvalidType(_))));
        assert!(!ty.is_defined());
    }

    #[test]
    fn test_member_lookup() {
        let ty = person();
        assert!(ty.member("wallet").unwrap().is_some());
        assert!(ty.member("missing").unwrap().is_none());
    }

    #[test]
    fn test_debug_does_not_expand_references() {
        let node = StructType::declare("Node").unwrap();
        node.define(StructType::builder("Node").field("next", &node)).unwrap();

        let rendered = format!("{:?}", node);
        assert!(rendered.contains("Node next"));
    }

    #[test]
    fn test_struct_type_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StructType>();
    }
}
