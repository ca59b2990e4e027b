//! EIP-712 Type Signature Resolution
//!
//! `encodeType` for a struct: its own signature, followed by the signature
//! of every struct type it references (transitively), sorted by name.
//!
//! Reference gathering walks the schema depth-first while tracking the
//! current path, so a cyclic schema fails with `CyclicSchema` instead of
//! recursing forever.

use super::structs::{StructId, StructType};
use crate::error::{Eip712Error, Eip712Result};
use crate::utils::codec_config::{current_settings, CodecSettings};
use crate::utils::crypto::keccak256;
use std::collections::HashSet;

/// Encode a type string for a struct type
/// Format: "TypeName(type1 name1,type2 name2,...)" followed by dependencies
pub fn encode_type(ty: &StructType) -> Eip712Result<String> {
    encode_type_with(ty, &current_settings())
}

/// [`encode_type`] with explicit settings
pub fn encode_type_with(ty: &StructType, settings: &CodecSettings) -> Eip712Result<String> {
    let mut result = root_signature(ty)?;

    let mut dependencies = reference_closure_with(ty, settings)?;
    // Same-named distinct types keep definition order
    dependencies.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));

    for dependency in &dependencies {
        result.push_str(&root_signature(dependency)?);
    }

    Ok(result)
}

/// Signature of a single struct, without its dependencies
pub fn root_signature(ty: &StructType) -> Eip712Result<String> {
    let field_strs: Vec<String> = ty.members()?.iter().map(|m| m.signature()).collect();
    Ok(format!("{}({})", ty.name(), field_strs.join(",")))
}

/// Calculate the type hash for a struct type
/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(ty: &StructType) -> Eip712Result<[u8; 32]> {
    type_hash_with(ty, &current_settings())
}

/// [`type_hash`] with explicit settings
pub fn type_hash_with(ty: &StructType, settings: &CodecSettings) -> Eip712Result<[u8; 32]> {
    let encoded = encode_type_with(ty, settings)?;
    Ok(keccak256(encoded.as_bytes()))
}

/// Every distinct struct type reachable from `root`, excluding `root`
///
/// Returned in discovery order.
pub fn reference_closure(root: &StructType) -> Eip712Result<Vec<StructType>> {
    reference_closure_with(root, &current_settings())
}

/// [`reference_closure`] with explicit settings
pub fn reference_closure_with(
    root: &StructType,
    settings: &CodecSettings,
) -> Eip712Result<Vec<StructType>> {
    settings.ensure_usable()?;

    let mut walk = ClosureWalk {
        max_depth: settings.max_reference_depth,
        path: Vec::new(),
        seen: HashSet::new(),
        found: Vec::new(),
    };
    walk.visit(root)?;
    Ok(walk.found)
}

struct ClosureWalk {
    max_depth: usize,
    /// Types currently being visited, root first
    path: Vec<StructType>,
    /// Types fully or partially visited; the root is never added
    seen: HashSet<StructId>,
    found: Vec<StructType>,
}

impl ClosureWalk {
    fn visit(&mut self, ty: &StructType) -> Eip712Result<()> {
        if self.path.len() > self.max_depth {
            return Err(Eip712Error::SchemaTooDeep {
                struct_name: ty.name().to_string(),
                limit: self.max_depth,
            });
        }

        self.path.push(ty.clone());

        for member in ty.members()? {
            let Some(child) = member.field_type().struct_reference() else {
                continue;
            };

            if let Some(pos) = self.path.iter().position(|p| p.id() == child.id()) {
                return Err(self.cycle_error(pos, child));
            }

            if self.seen.insert(child.id()) {
                self.found.push(child.clone());
                self.visit(child)?;
            }
        }

        self.path.pop();
        Ok(())
    }

    fn cycle_error(&self, start: usize, back_to: &StructType) -> Eip712Error {
        let path = self.path[start..]
            .iter()
            .map(StructType::name)
            .chain(std::iter::once(back_to.name()))
            .collect::<Vec<_>>()
            .join(" -> ");

        crate::log_warn!("eip712::resolver", "Rejected cyclic schema", cycle = path);

        Eip712Error::CyclicSchema { path }
    }
}
