/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * WASM-GC Array Constructor Generation for the Tern Compiler.
 *
 * One constructor function per element type: `(length: i32) -> Array<T>`.
 * Declaration registers the signature and function identity synchronously
 * and defers body synthesis to the generation queue, so a constructor is
 * referenceable (direct call, table entry) while the type graph it depends
 * on is still being built. All constructor signatures share a lazily-created
 * non-final base signature `(i32) -> (ref null any)`, making every
 * constructor substitutable where the generic signature is expected.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use crate::types::ValueType;
use crate::wasm_classes::GcClassRegistry;
use crate::wasm_gen_util::{TemporaryVariablePool, WasmGenerationUtil};
use crate::wasm_model::{CodegenError, WasmFunction, WasmModule, WasmType, WasmTypeDef};
use crate::wasm_names::WasmNameProvider;
use crate::wasm_types::WasmFunctionTypes;
use std::collections::VecDeque;
use wasm_encoder::Instruction;

/// Mutable view of the compilation unit handed to generators and to queued
/// jobs: the module under construction plus the shared registries and the
/// generation queue itself (jobs may enqueue follow-up jobs).
pub struct GcContext<'a> {
    pub module: &'a mut WasmModule,
    pub function_types: &'a mut WasmFunctionTypes,
    pub classes: &'a mut GcClassRegistry,
    pub names: &'a mut WasmNameProvider,
    pub queue: &'a mut VecDeque<GenerationJob>,
}

/// A unit of deferred generation work. Jobs close over the minimal state
/// needed to finish: the target function's identity and the semantic type
/// driving the synthesis.
#[derive(Debug)]
pub enum GenerationJob {
    NewArrayBody { function: u32, element: ValueType },
}

impl GenerationJob {
    pub fn run(self, cx: &mut GcContext<'_>) -> Result<(), CodegenError> {
        match self {
            GenerationJob::NewArrayBody { function, element } => {
                // Take the function out of the module so body synthesis can
                // borrow the module for type resolution; the identity slot
                // is restored before any error propagates.
                let mut target = std::mem::take(&mut cx.module.functions[function as usize]);
                let outcome = synthesize_new_array_body(&mut target, &element, cx);
                cx.module.functions[function as usize] = target;
                outcome
            }
        }
    }
}

fn synthesize_new_array_body(
    function: &mut WasmFunction,
    element: &ValueType,
    cx: &mut GcContext<'_>,
) -> Result<(), CodegenError> {
    let length = function.add_local("length", WasmType::I32);
    let mut temps = TemporaryVariablePool::new();
    let info = cx.classes.array_info(cx.module, element)?;
    let result = function.add_local("result", info.reference);
    let mut util = WasmGenerationUtil::new(cx.classes, cx.module);
    util.allocate_array(element, length, Some(result), &mut temps, function)?;
    function.body.push(Instruction::LocalGet(result));
    function.body.push(Instruction::Return);
    Ok(())
}

/// Generates the per-element-type `new array` constructor functions and owns
/// the shared base signature they all subtype.
#[derive(Debug, Default)]
pub struct NewArrayFunctionGenerator {
    base_function_type: Option<u32>,
}

impl NewArrayFunctionGenerator {
    pub fn new() -> NewArrayFunctionGenerator {
        NewArrayFunctionGenerator::default()
    }

    /// The singleton `(i32) -> (ref null any)` signature, interned and
    /// marked non-final on first use. Always registered before the first
    /// constructor signature, so subtype references never point forward.
    pub fn base_function_type(&mut self, cx: &mut GcContext<'_>) -> u32 {
        if let Some(index) = self.base_function_type {
            return index;
        }
        let root = cx.classes.root_reference_type();
        let index = cx
            .function_types
            .of(cx.module, vec![WasmType::I32], Some(root));
        cx.module.type_def_mut(index).is_final = false;
        self.base_function_type = Some(index);
        index
    }

    /// Declares the constructor for arrays of `element`: registers its final
    /// signature (sole supertype: the shared base), reserves its identity
    /// under a deterministic name, and enqueues the body-synthesis job.
    ///
    /// Returns the function index synchronously; the body exists once the
    /// queue has been drained. Repeated calls for one element type declare
    /// duplicate constructors; deduplication is the caller's contract.
    pub fn generate(
        &mut self,
        cx: &mut GcContext<'_>,
        element: &ValueType,
    ) -> Result<u32, CodegenError> {
        let base_index = self.base_function_type(cx);
        let info = cx.classes.array_info(cx.module, element)?;
        let name = cx.names.top_level(&format!(
            "Array<{}>@new",
            WasmNameProvider::suggest_for_type(element)
        ));

        let base_result = cx.classes.root_reference_type();
        if !info.reference.is_subtype_of(&base_result, cx.module) {
            return Err(CodegenError::HierarchyViolation {
                function: name,
                result: info.reference.to_string(),
                base: base_result.to_string(),
            });
        }

        let mut signature = WasmTypeDef::function(vec![WasmType::I32], Some(info.reference));
        signature.supertypes.push(base_index);
        let type_index = cx.module.add_type(signature);

        let function_index = cx.module.add_function(WasmFunction::new(name, type_index));
        cx.queue.push_back(GenerationJob::NewArrayBody {
            function: function_index,
            element: element.clone(),
        });
        log::debug!(
            "declared array constructor '{}' (function {}, signature {})",
            cx.module.function(function_index).name,
            function_index,
            type_index
        );
        Ok(function_index)
    }
}
