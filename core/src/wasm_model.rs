/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * WASM-GC Module Model for the Tern Compiler.
 *
 * The backend builds modules against this mutable model rather than against
 * `wasm-encoder` sections directly: type definitions stay adjustable after
 * registration (finality, supertypes) and functions exist with an empty body
 * until a deferred generation job fills it in. `wasm_encode` lowers the
 * finished model to the binary format.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use std::fmt;
use thiserror::Error;
use wasm_encoder::Instruction;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("cannot resolve a WASM array type for element type '{element}': {reason}")]
    UnresolvedType { element: String, reason: String },
    #[error(
        "constructor '{function}' result type {result} is not a subtype of \
         the shared base result {base}"
    )]
    HierarchyViolation {
        function: String,
        result: String,
        base: String,
    },
    #[error("emitted module failed WASM validation: {0}")]
    Validation(String),
}

// =============================================================================
// Value and Heap Types
// =============================================================================

/// A WASM value type as used in signatures, locals and struct/array fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasmType {
    I32,
    I64,
    F32,
    F64,
    Ref(WasmRefType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WasmRefType {
    pub nullable: bool,
    pub heap: WasmHeapType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasmHeapType {
    Any,
    Eq,
    Array,
    Struct,
    Func,
    Extern,
    /// Index into the module's type list.
    Concrete(u32),
}

/// Storage type of an array element or struct field. `I8`/`I16` are packed
/// forms that widen to `i32` on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasmStorageType {
    I8,
    I16,
    Val(WasmType),
}

impl WasmType {
    /// Structural subtype check relative to `module`'s type list.
    ///
    /// Numeric types only match themselves. Reference types follow the GC
    /// hierarchy: concrete struct/array types sit below `struct`/`array`,
    /// `eq` and `any`; concrete function types only below `func`; a non-null
    /// reference is usable where a nullable one is expected, not vice versa.
    pub fn is_subtype_of(&self, other: &WasmType, module: &WasmModule) -> bool {
        match (self, other) {
            (a, b) if a == b => true,
            (WasmType::Ref(sub), WasmType::Ref(sup)) => {
                (!sub.nullable || sup.nullable)
                    && heap_is_subtype(sub.heap, sup.heap, module)
            }
            _ => false,
        }
    }
}

fn heap_is_subtype(sub: WasmHeapType, sup: WasmHeapType, module: &WasmModule) -> bool {
    match (sub, sup) {
        (a, b) if a == b => true,
        (WasmHeapType::Eq | WasmHeapType::Array | WasmHeapType::Struct, WasmHeapType::Any) => true,
        (WasmHeapType::Array | WasmHeapType::Struct, WasmHeapType::Eq) => true,
        (WasmHeapType::Concrete(sub_index), WasmHeapType::Concrete(sup_index)) => {
            declared_supertype_chain(sub_index, sup_index, module)
        }
        (WasmHeapType::Concrete(index), abstract_sup) => {
            match &module.type_def(index).composite {
                WasmCompositeType::Array(_) => matches!(
                    abstract_sup,
                    WasmHeapType::Any | WasmHeapType::Eq | WasmHeapType::Array
                ),
                WasmCompositeType::Struct(_) => matches!(
                    abstract_sup,
                    WasmHeapType::Any | WasmHeapType::Eq | WasmHeapType::Struct
                ),
                WasmCompositeType::Function(_) => matches!(abstract_sup, WasmHeapType::Func),
            }
        }
        _ => false,
    }
}

fn declared_supertype_chain(sub_index: u32, sup_index: u32, module: &WasmModule) -> bool {
    let mut current = sub_index;
    loop {
        if current == sup_index {
            return true;
        }
        match module.type_def(current).supertypes.first() {
            Some(&parent) => current = parent,
            None => return false,
        }
    }
}

impl fmt::Display for WasmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WasmType::I32 => write!(f, "i32"),
            WasmType::I64 => write!(f, "i64"),
            WasmType::F32 => write!(f, "f32"),
            WasmType::F64 => write!(f, "f64"),
            WasmType::Ref(r) => {
                if r.nullable {
                    write!(f, "(ref null {})", r.heap)
                } else {
                    write!(f, "(ref {})", r.heap)
                }
            }
        }
    }
}

impl fmt::Display for WasmHeapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WasmHeapType::Any => write!(f, "any"),
            WasmHeapType::Eq => write!(f, "eq"),
            WasmHeapType::Array => write!(f, "array"),
            WasmHeapType::Struct => write!(f, "struct"),
            WasmHeapType::Func => write!(f, "func"),
            WasmHeapType::Extern => write!(f, "extern"),
            WasmHeapType::Concrete(index) => write!(f, "{}", index),
        }
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WasmFieldType {
    pub storage: WasmStorageType,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WasmFunctionType {
    pub params: Vec<WasmType>,
    pub result: Option<WasmType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WasmCompositeType {
    Function(WasmFunctionType),
    Array(WasmFieldType),
    Struct(Vec<WasmFieldType>),
}

/// One entry of the module type list: a composite type plus its place in the
/// subtype hierarchy. Finality and supertypes stay mutable after registration
/// since the hierarchy is wired up while the graph is still being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasmTypeDef {
    pub composite: WasmCompositeType,
    pub is_final: bool,
    pub supertypes: Vec<u32>,
}

impl WasmTypeDef {
    pub fn function(params: Vec<WasmType>, result: Option<WasmType>) -> WasmTypeDef {
        WasmTypeDef {
            composite: WasmCompositeType::Function(WasmFunctionType { params, result }),
            is_final: true,
            supertypes: Vec::new(),
        }
    }

    pub fn array(element: WasmFieldType) -> WasmTypeDef {
        WasmTypeDef {
            composite: WasmCompositeType::Array(element),
            is_final: true,
            supertypes: Vec::new(),
        }
    }

    pub fn structure(fields: Vec<WasmFieldType>) -> WasmTypeDef {
        WasmTypeDef {
            composite: WasmCompositeType::Struct(fields),
            is_final: true,
            supertypes: Vec::new(),
        }
    }

    pub fn as_function(&self) -> Option<&WasmFunctionType> {
        match &self.composite {
            WasmCompositeType::Function(signature) => Some(signature),
            _ => None,
        }
    }
}

// =============================================================================
// Functions & Module
// =============================================================================

#[derive(Debug, Clone)]
pub struct WasmLocal {
    pub name: String,
    pub ty: WasmType,
}

/// A function registered in the module. The identity (name + type index) is
/// valid and referenceable as soon as the function is added; the leading
/// locals are the parameters; the body starts empty and is filled exactly
/// once by a deferred generation job.
#[derive(Debug, Clone, Default)]
pub struct WasmFunction {
    pub name: String,
    pub type_index: u32,
    pub locals: Vec<WasmLocal>,
    pub body: Vec<Instruction<'static>>,
}

impl WasmFunction {
    pub fn new(name: impl Into<String>, type_index: u32) -> WasmFunction {
        WasmFunction {
            name: name.into(),
            type_index,
            locals: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a named local and returns its index.
    pub fn add_local(&mut self, name: impl Into<String>, ty: WasmType) -> u32 {
        let index = self.locals.len() as u32;
        self.locals.push(WasmLocal {
            name: name.into(),
            ty,
        });
        index
    }
}

/// The module under construction. Both lists are append-only; indices handed
/// out by `add_type`/`add_function` stay stable for the whole compilation
/// unit.
#[derive(Debug, Default)]
pub struct WasmModule {
    pub types: Vec<WasmTypeDef>,
    pub functions: Vec<WasmFunction>,
}

impl WasmModule {
    pub fn new() -> WasmModule {
        WasmModule::default()
    }

    pub fn add_type(&mut self, def: WasmTypeDef) -> u32 {
        let index = self.types.len() as u32;
        self.types.push(def);
        index
    }

    pub fn type_def(&self, index: u32) -> &WasmTypeDef {
        &self.types[index as usize]
    }

    pub fn type_def_mut(&mut self, index: u32) -> &mut WasmTypeDef {
        &mut self.types[index as usize]
    }

    pub fn add_function(&mut self, function: WasmFunction) -> u32 {
        let index = self.functions.len() as u32;
        self.functions.push(function);
        index
    }

    pub fn function(&self, index: u32) -> &WasmFunction {
        &self.functions[index as usize]
    }
}

// =============================================================================
// Tests
// =============================================================================
