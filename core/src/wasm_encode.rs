/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * WASM Binary Emission for the Tern Compiler.
 *
 * Lowers the mutable module model (wasm_model) to the binary format via
 * `wasm-encoder`: GC subtypes with their finality and supertype links, the
 * function and code sections, and a custom name section carrying the
 * deterministic function and local names.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use crate::wasm_model::{
    CodegenError, WasmCompositeType, WasmFieldType, WasmFunction, WasmHeapType, WasmModule,
    WasmRefType, WasmStorageType, WasmType, WasmTypeDef,
};
use wasm_encoder::{
    AbstractHeapType, ArrayType, CodeSection, CompositeInnerType, CompositeType, FieldType,
    FuncType, Function, FunctionSection, HeapType, IndirectNameMap, Instruction, Module, NameMap,
    NameSection, RefType, StorageType, StructType, SubType, TypeSection, ValType,
};

// =============================================================================
// Module Emission
// =============================================================================

/// Encodes the finished model to WASM binary bytes.
///
/// Assumes the generation queue has been drained: every function body must be
/// complete, since a declared-but-bodyless function encodes as an empty body
/// that cannot satisfy its declared result type.
pub fn encode_module(module: &WasmModule) -> Vec<u8> {
    let mut out = Module::new();

    let mut types = TypeSection::new();
    for def in &module.types {
        types.ty().subtype(&subtype(def));
    }
    out.section(&types);

    let mut functions = FunctionSection::new();
    for function in &module.functions {
        functions.function(function.type_index);
    }
    out.section(&functions);

    let mut codes = CodeSection::new();
    for function in &module.functions {
        codes.function(&encode_body(module, function));
    }
    out.section(&codes);

    out.section(&name_section(module));
    out.finish()
}

fn encode_body(module: &WasmModule, function: &WasmFunction) -> Function {
    let param_count = module
        .type_def(function.type_index)
        .as_function()
        .map(|signature| signature.params.len())
        .unwrap_or(0);
    let locals: Vec<(u32, ValType)> = function.locals[param_count..]
        .iter()
        .map(|local| (1, val_type(&local.ty)))
        .collect();
    let mut body = Function::new(locals);
    for instruction in &function.body {
        body.instruction(instruction);
    }
    body.instruction(&Instruction::End);
    body
}

fn name_section(module: &WasmModule) -> NameSection {
    let mut names = NameSection::new();

    let mut function_names = NameMap::new();
    for (index, function) in module.functions.iter().enumerate() {
        if !function.name.is_empty() {
            function_names.append(index as u32, &function.name);
        }
    }
    names.functions(&function_names);

    let mut local_names = IndirectNameMap::new();
    for (index, function) in module.functions.iter().enumerate() {
        if function.locals.is_empty() {
            continue;
        }
        let mut map = NameMap::new();
        for (local_index, local) in function.locals.iter().enumerate() {
            map.append(local_index as u32, &local.name);
        }
        local_names.append(index as u32, &map);
    }
    names.locals(&local_names);
    names
}

// =============================================================================
// Type Lowering
// =============================================================================

fn subtype(def: &WasmTypeDef) -> SubType {
    SubType {
        is_final: def.is_final,
        supertype_idx: def.supertypes.first().copied(),
        composite_type: CompositeType {
            shared: false,
            inner: match &def.composite {
                WasmCompositeType::Function(signature) => CompositeInnerType::Func(FuncType::new(
                    signature.params.iter().map(val_type),
                    signature.result.iter().map(val_type),
                )),
                WasmCompositeType::Array(element) => {
                    CompositeInnerType::Array(ArrayType(field_type(element)))
                }
                WasmCompositeType::Struct(fields) => CompositeInnerType::Struct(StructType {
                    fields: fields.iter().map(field_type).collect(),
                }),
            },
        },
    }
}

fn field_type(field: &WasmFieldType) -> FieldType {
    FieldType {
        element_type: match &field.storage {
            WasmStorageType::I8 => StorageType::I8,
            WasmStorageType::I16 => StorageType::I16,
            WasmStorageType::Val(ty) => StorageType::Val(val_type(ty)),
        },
        mutable: field.mutable,
    }
}

fn val_type(ty: &WasmType) -> ValType {
    match ty {
        WasmType::I32 => ValType::I32,
        WasmType::I64 => ValType::I64,
        WasmType::F32 => ValType::F32,
        WasmType::F64 => ValType::F64,
        WasmType::Ref(r) => ValType::Ref(ref_type(r)),
    }
}

fn ref_type(r: &WasmRefType) -> RefType {
    RefType {
        nullable: r.nullable,
        heap_type: heap_type(r.heap),
    }
}

fn heap_type(heap: WasmHeapType) -> HeapType {
    let abstract_heap = |ty| HeapType::Abstract { shared: false, ty };
    match heap {
        WasmHeapType::Any => abstract_heap(AbstractHeapType::Any),
        WasmHeapType::Eq => abstract_heap(AbstractHeapType::Eq),
        WasmHeapType::Array => abstract_heap(AbstractHeapType::Array),
        WasmHeapType::Struct => abstract_heap(AbstractHeapType::Struct),
        WasmHeapType::Func => abstract_heap(AbstractHeapType::Func),
        WasmHeapType::Extern => abstract_heap(AbstractHeapType::Extern),
        WasmHeapType::Concrete(index) => HeapType::Concrete(index),
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates an emitted module with `wasmparser`, GC features enabled.
pub fn validate_module(bytes: &[u8]) -> Result<(), CodegenError> {
    let features = wasmparser::WasmFeatures::default()
        | wasmparser::WasmFeatures::FUNCTION_REFERENCES
        | wasmparser::WasmFeatures::GC;
    let mut validator = wasmparser::Validator::new_with_features(features);
    validator
        .validate_all(bytes)
        .map(|_| ())
        .map_err(|err| CodegenError::Validation(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wasm_model::WasmFunctionType;

    #[test]
    fn test_empty_module_encodes_and_validates() {
        let module = WasmModule::new();
        let bytes = encode_module(&module);
        assert_eq!(&bytes[..4], b"\0asm");
        validate_module(&bytes).unwrap();
    }

    #[test]
    fn test_subtype_lowering_keeps_hierarchy_links() {
        let def = WasmTypeDef {
            composite: WasmCompositeType::Function(WasmFunctionType {
                params: vec![WasmType::I32],
                result: None,
            }),
            is_final: true,
            supertypes: vec![7],
        };
        let lowered = subtype(&def);
        assert!(lowered.is_final);
        assert_eq!(lowered.supertype_idx, Some(7));
    }

    #[test]
    fn test_hand_built_gc_module_validates() {
        // (type $base (sub (func (param i32) (result (ref null any)))))
        // (type $ints (array (mut i32)))
        // (type $ctor (sub final $base (func (param i32) (result (ref null $ints)))))
        // (func $new (type $ctor) ...)
        let mut module = WasmModule::new();
        let root = WasmType::Ref(WasmRefType {
            nullable: true,
            heap: WasmHeapType::Any,
        });
        let mut base = WasmTypeDef::function(vec![WasmType::I32], Some(root));
        base.is_final = false;
        let base_index = module.add_type(base);

        let ints = module.add_type(WasmTypeDef::array(WasmFieldType {
            storage: WasmStorageType::Val(WasmType::I32),
            mutable: true,
        }));
        let array_ref = WasmType::Ref(WasmRefType {
            nullable: true,
            heap: WasmHeapType::Concrete(ints),
        });

        let mut ctor = WasmTypeDef::function(vec![WasmType::I32], Some(array_ref));
        ctor.supertypes.push(base_index);
        let ctor_index = module.add_type(ctor);

        let mut function = WasmFunction::new("Array<Int>@new", ctor_index);
        let length = function.add_local("length", WasmType::I32);
        let result = function.add_local("result", array_ref);
        function.body.push(Instruction::LocalGet(length));
        function.body.push(Instruction::ArrayNewDefault(ints));
        function.body.push(Instruction::LocalSet(result));
        function.body.push(Instruction::LocalGet(result));
        function.body.push(Instruction::Return);
        module.add_function(function);

        let bytes = encode_module(&module);
        validate_module(&bytes).unwrap();
    }
}
