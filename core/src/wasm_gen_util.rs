/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * This file is part of the Tern Compiler.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * 1. OPEN SOURCE: You may use this file under the terms of the GNU Affero
 * General Public License v3.0. If you link to this code, your ENTIRE
 * application must be open-sourced under AGPLv3.
 *
 * 2. COMMERCIAL: For proprietary use, you must obtain a Commercial License
 * from Sovereign Systems.
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use crate::types::ValueType;
use crate::wasm_classes::GcClassRegistry;
use crate::wasm_model::{CodegenError, WasmFunction, WasmModule, WasmType};
use std::collections::HashMap;
use wasm_encoder::Instruction;

/// Scoped allocator of scratch locals for one function body under
/// construction. Released locals are reused for later requests of the same
/// type instead of growing the local list; the pool is dropped when body
/// synthesis finishes.
#[derive(Debug, Default)]
pub struct TemporaryVariablePool {
    released: HashMap<WasmType, Vec<u32>>,
}

impl TemporaryVariablePool {
    pub fn new() -> TemporaryVariablePool {
        TemporaryVariablePool::default()
    }

    pub fn acquire(&mut self, function: &mut WasmFunction, ty: WasmType) -> u32 {
        if let Some(index) = self.released.get_mut(&ty).and_then(|free| free.pop()) {
            return index;
        }
        let serial = function.locals.len();
        function.add_local(format!("tmp_{}", serial), ty)
    }

    pub fn release(&mut self, index: u32, ty: WasmType) {
        self.released.entry(ty).or_default().push(index);
    }
}

/// Shared instruction-emission helpers for GC object construction.
pub struct WasmGenerationUtil<'a> {
    classes: &'a mut GcClassRegistry,
    module: &'a mut WasmModule,
}

impl<'a> WasmGenerationUtil<'a> {
    pub fn new(classes: &'a mut GcClassRegistry, module: &'a mut WasmModule) -> Self {
        WasmGenerationUtil { classes, module }
    }

    /// Appends the sequence that allocates a zero-initialized array of
    /// `element` with `length_local` elements and stores it in the target
    /// local, returning the target's index. When no target is given a
    /// temporary is acquired from the pool; the caller owns releasing it.
    ///
    /// Resolving the array descriptor may synthesize further nested types.
    pub fn allocate_array(
        &mut self,
        element: &ValueType,
        length_local: u32,
        target: Option<u32>,
        temps: &mut TemporaryVariablePool,
        function: &mut WasmFunction,
    ) -> Result<u32, CodegenError> {
        let info = self.classes.array_info(self.module, element)?;
        let target = match target {
            Some(local) => local,
            None => temps.acquire(function, info.reference),
        };
        function.body.push(Instruction::LocalGet(length_local));
        function.body.push(Instruction::ArrayNewDefault(info.type_index));
        function.body.push(Instruction::LocalSet(target));
        Ok(target)
    }
}
