/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * WASM-GC Class & Array Type Resolution for the Tern Compiler.
 *
 * Maps semantic value types onto concrete GC heap types in the module under
 * construction. Descriptors are synthesized on demand and cached, so the
 * resolver works while the overall type graph is still incomplete: asking
 * for `Array<Array<Int>>` first materializes the inner `Array<Int>`
 * descriptor, then the outer one.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use crate::types::ValueType;
use crate::wasm_model::{
    CodegenError, WasmFieldType, WasmHeapType, WasmModule, WasmRefType, WasmStorageType, WasmType,
    WasmTypeDef,
};
use std::collections::HashMap;

/// Resolved WASM-level descriptor of a class or array type: its index in the
/// module type list plus the nullable reference type pointing at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcClassInfo {
    pub type_index: u32,
    pub reference: WasmType,
}

/// Synthesizes and caches GC type descriptors per semantic type.
///
/// Class struct layouts are owned by the class emission pass; this registry
/// only declares the heap types the array machinery needs to reference, one
/// entry per distinct semantic type.
#[derive(Debug, Default)]
pub struct GcClassRegistry {
    arrays: HashMap<ValueType, GcClassInfo>,
    structs: HashMap<String, GcClassInfo>,
}

impl GcClassRegistry {
    pub fn new() -> GcClassRegistry {
        GcClassRegistry::default()
    }

    /// The common supertype of every managed reference the backend produces.
    pub fn root_reference_type(&self) -> WasmType {
        WasmType::Ref(WasmRefType {
            nullable: true,
            heap: WasmHeapType::Any,
        })
    }

    /// Resolves the descriptor for "array of `element`", synthesizing it
    /// (and any nested descriptors) on first request.
    pub fn array_info(
        &mut self,
        module: &mut WasmModule,
        element: &ValueType,
    ) -> Result<GcClassInfo, CodegenError> {
        if let Some(info) = self.arrays.get(element) {
            return Ok(*info);
        }
        let storage = self.element_storage(module, element)?;
        let type_index = module.add_type(WasmTypeDef::array(WasmFieldType {
            storage,
            mutable: true,
        }));
        let info = GcClassInfo {
            type_index,
            reference: concrete_ref(type_index),
        };
        self.arrays.insert(element.clone(), info);
        log::trace!("synthesized array type {} for Array<{}>", type_index, element);
        Ok(info)
    }

    fn element_storage(
        &mut self,
        module: &mut WasmModule,
        element: &ValueType,
    ) -> Result<WasmStorageType, CodegenError> {
        match element {
            ValueType::Boolean | ValueType::Byte => Ok(WasmStorageType::I8),
            ValueType::Short | ValueType::Char => Ok(WasmStorageType::I16),
            ValueType::Int => Ok(WasmStorageType::Val(WasmType::I32)),
            ValueType::Long => Ok(WasmStorageType::Val(WasmType::I64)),
            ValueType::Float => Ok(WasmStorageType::Val(WasmType::F32)),
            ValueType::Double => Ok(WasmStorageType::Val(WasmType::F64)),
            ValueType::Object(name) => {
                Ok(WasmStorageType::Val(self.struct_info(module, name).reference))
            }
            ValueType::Array(inner) => {
                Ok(WasmStorageType::Val(self.array_info(module, inner)?.reference))
            }
            ValueType::Unit => Err(CodegenError::UnresolvedType {
                element: element.to_string(),
                reason: "array elements must be sized, non-void values".to_string(),
            }),
        }
    }

    /// Declares (or reuses) the struct heap type standing in for a class.
    /// Fields are filled in by the class emission pass; the array machinery
    /// only needs the type to exist so elements can reference it.
    fn struct_info(&mut self, module: &mut WasmModule, name: &str) -> GcClassInfo {
        if let Some(info) = self.structs.get(name) {
            return *info;
        }
        let type_index = module.add_type(WasmTypeDef::structure(Vec::new()));
        let info = GcClassInfo {
            type_index,
            reference: concrete_ref(type_index),
        };
        self.structs.insert(name.to_string(), info);
        info
    }
}

fn concrete_ref(type_index: u32) -> WasmType {
    WasmType::Ref(WasmRefType {
        nullable: true,
        heap: WasmHeapType::Concrete(type_index),
    })
}
