/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * WASM-GC Backend Driver for the Tern Compiler.
 *
 * Owns the module under construction, the shared registries and the
 * generation queue. Declarations return usable function identities
 * immediately; `run_pending` drains the deferred body-synthesis jobs until
 * the queue is empty (jobs may enqueue more), and `finish` encodes the
 * completed module. Any failure is fatal to the compilation unit: there is
 * no retry and no partial result.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use crate::types::ValueType;
use crate::wasm_array_gen::{GcContext, GenerationJob, NewArrayFunctionGenerator};
use crate::wasm_classes::GcClassRegistry;
use crate::wasm_encode;
use crate::wasm_model::{CodegenError, WasmModule};
use crate::wasm_names::WasmNameProvider;
use crate::wasm_types::WasmFunctionTypes;
use std::collections::{HashMap, VecDeque};

pub struct WasmGcBackend {
    module: WasmModule,
    function_types: WasmFunctionTypes,
    classes: GcClassRegistry,
    names: WasmNameProvider,
    array_generator: NewArrayFunctionGenerator,
    queue: VecDeque<GenerationJob>,
    /// Constructor function per element type. The generator itself declares
    /// a fresh constructor on every call; this map is the single caller
    /// responsible for asking at most once per element type.
    array_constructors: HashMap<ValueType, u32>,
}

impl Default for WasmGcBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmGcBackend {
    pub fn new() -> WasmGcBackend {
        WasmGcBackend {
            module: WasmModule::new(),
            function_types: WasmFunctionTypes::new(),
            classes: GcClassRegistry::new(),
            names: WasmNameProvider::new(),
            array_generator: NewArrayFunctionGenerator::new(),
            queue: VecDeque::new(),
            array_constructors: HashMap::new(),
        }
    }

    pub fn module(&self) -> &WasmModule {
        &self.module
    }

    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// The constructor function for arrays of `element`, declaring it on
    /// first request. The returned index is callable/referenceable
    /// immediately; its body exists once `run_pending` has drained the
    /// queue.
    pub fn array_constructor(&mut self, element: &ValueType) -> Result<u32, CodegenError> {
        if let Some(&index) = self.array_constructors.get(element) {
            return Ok(index);
        }
        let mut cx = GcContext {
            module: &mut self.module,
            function_types: &mut self.function_types,
            classes: &mut self.classes,
            names: &mut self.names,
            queue: &mut self.queue,
        };
        let index = self.array_generator.generate(&mut cx, element)?;
        self.array_constructors.insert(element.clone(), index);
        Ok(index)
    }

    /// Drains the generation queue in FIFO order until it reports empty.
    /// Jobs run here may enqueue follow-up jobs; those are drained in the
    /// same pass. The first failing job aborts the unit.
    pub fn run_pending(&mut self) -> Result<(), CodegenError> {
        let mut drained = 0usize;
        while let Some(job) = self.queue.pop_front() {
            let mut cx = GcContext {
                module: &mut self.module,
                function_types: &mut self.function_types,
                classes: &mut self.classes,
                names: &mut self.names,
                queue: &mut self.queue,
            };
            job.run(&mut cx)?;
            drained += 1;
        }
        if drained > 0 {
            log::debug!("drained {} generation jobs", drained);
        }
        Ok(())
    }

    /// Drains all pending work and encodes the finished module.
    pub fn finish(mut self) -> Result<Vec<u8>, CodegenError> {
        self.run_pending()?;
        Ok(wasm_encode::encode_module(&self.module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_constructor_is_memoized_per_element() {
        let mut backend = WasmGcBackend::new();
        let first = backend.array_constructor(&ValueType::Int).unwrap();
        let functions = backend.module().functions.len();
        let types = backend.module().types.len();
        let jobs = backend.pending_jobs();

        let second = backend.array_constructor(&ValueType::Int).unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.module().functions.len(), functions);
        assert_eq!(backend.module().types.len(), types);
        assert_eq!(backend.pending_jobs(), jobs);
    }

    #[test]
    fn test_identity_is_usable_before_drain_and_bodied_after() {
        let mut backend = WasmGcBackend::new();
        let index = backend.array_constructor(&ValueType::Int).unwrap();
        assert!(backend.module().function(index).body.is_empty());
        assert_eq!(backend.pending_jobs(), 1);

        backend.run_pending().unwrap();
        assert_eq!(backend.pending_jobs(), 0);
        assert!(!backend.module().function(index).body.is_empty());
    }

    #[test]
    fn test_drainage_converges_with_every_body_populated_once() {
        let mut backend = WasmGcBackend::new();
        let elements = [
            ValueType::Int,
            ValueType::Double,
            ValueType::Object("Widget".to_string()),
            ValueType::Int.array_of(),
            ValueType::Object("Widget".to_string()).array_of(),
        ];
        let mut indices = Vec::new();
        for element in &elements {
            indices.push(backend.array_constructor(element).unwrap());
        }
        assert_eq!(backend.pending_jobs(), elements.len());

        backend.run_pending().unwrap();
        assert_eq!(backend.pending_jobs(), 0);
        for index in indices {
            let function = backend.module().function(index);
            assert_eq!(function.locals.len(), 2, "{}", function.name);
            assert!(!function.body.is_empty(), "{}", function.name);
        }
        // A second drain is a no-op.
        backend.run_pending().unwrap();
        assert_eq!(backend.pending_jobs(), 0);
    }

    #[test]
    fn test_finished_int_constructor_module_validates() {
        let mut backend = WasmGcBackend::new();
        backend.array_constructor(&ValueType::Int).unwrap();
        let bytes = backend.finish().unwrap();
        wasm_encode::validate_module(&bytes).unwrap();
    }

    #[test]
    fn test_finished_mixed_constructor_module_validates() {
        let mut backend = WasmGcBackend::new();
        for element in [
            ValueType::Boolean,
            ValueType::Short,
            ValueType::Int,
            ValueType::Long,
            ValueType::Float,
            ValueType::Double,
            ValueType::Object("Widget".to_string()),
            ValueType::Int.array_of(),
            ValueType::Int.array_of().array_of(),
        ] {
            backend.array_constructor(&element).unwrap();
        }
        let bytes = backend.finish().unwrap();
        wasm_encode::validate_module(&bytes).unwrap();
    }

    #[test]
    fn test_resolution_failure_aborts_the_unit() {
        let mut backend = WasmGcBackend::new();
        let err = backend.array_constructor(&ValueType::Unit).unwrap_err();
        assert!(matches!(err, CodegenError::UnresolvedType { .. }));
        // The failed request declared nothing usable.
        assert!(backend.module().functions.is_empty());
    }
}
