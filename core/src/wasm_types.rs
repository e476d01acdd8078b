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

use crate::wasm_model::{WasmModule, WasmType, WasmTypeDef};
use std::collections::HashMap;

type SignatureKey = (Vec<WasmType>, Option<WasmType>);

/// Interns function signatures into the module type list.
///
/// Identical `(params, result)` pairs share one type index, so signatures
/// that must be shared (indirect call targets, subtype hierarchy roots) are
/// registered exactly once. The returned index stays a mutable handle via
/// `WasmModule::type_def_mut`, so callers can wire finality and supertypes
/// after interning.
#[derive(Debug, Default)]
pub struct WasmFunctionTypes {
    interned: HashMap<SignatureKey, u32>,
}

impl WasmFunctionTypes {
    pub fn new() -> WasmFunctionTypes {
        WasmFunctionTypes::default()
    }

    pub fn of(
        &mut self,
        module: &mut WasmModule,
        params: Vec<WasmType>,
        result: Option<WasmType>,
    ) -> u32 {
        if let Some(&index) = self.interned.get(&(params.clone(), result)) {
            return index;
        }
        let index = module.add_type(WasmTypeDef::function(params.clone(), result));
        self.interned.insert((params, result), index);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_signatures_share_one_index() {
        let mut module = WasmModule::new();
        let mut types = WasmFunctionTypes::new();

        let a = types.of(&mut module, vec![WasmType::I32], Some(WasmType::I64));
        let b = types.of(&mut module, vec![WasmType::I32], Some(WasmType::I64));
        assert_eq!(a, b);
        assert_eq!(module.types.len(), 1);
    }

    #[test]
    fn test_distinct_signatures_get_distinct_indices() {
        let mut module = WasmModule::new();
        let mut types = WasmFunctionTypes::new();

        let a = types.of(&mut module, vec![WasmType::I32], Some(WasmType::I64));
        let b = types.of(&mut module, vec![WasmType::I32], None);
        let c = types.of(&mut module, vec![], Some(WasmType::I64));
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(module.types.len(), 3);
    }

    #[test]
    fn test_interned_signature_stays_mutable_through_module() {
        let mut module = WasmModule::new();
        let mut types = WasmFunctionTypes::new();

        let index = types.of(&mut module, vec![WasmType::I32], None);
        module.type_def_mut(index).is_final = false;
        assert!(!module.type_def(index).is_final);
        // Re-interning returns the same, now non-final, definition.
        let again = types.of(&mut module, vec![WasmType::I32], None);
        assert_eq!(index, again);
        assert!(!module.type_def(again).is_final);
    }
}
