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
use std::collections::HashMap;

/// Hands out deterministic, collision-free top-level identifiers for
/// generated module entries. Identical requests in identical order always
/// produce the same names, so repeated compilations of one unit are
/// byte-for-byte reproducible.
#[derive(Debug, Default)]
pub struct WasmNameProvider {
    occupied: HashMap<String, u32>,
}

impl WasmNameProvider {
    pub fn new() -> WasmNameProvider {
        WasmNameProvider::default()
    }

    /// Returns `desired` if it is still free, otherwise the first free
    /// `desired_N` variant.
    pub fn top_level(&mut self, desired: &str) -> String {
        let serial = self.occupied.entry(desired.to_string()).or_insert(0);
        *serial += 1;
        if *serial == 1 {
            desired.to_string()
        } else {
            let suffixed = format!("{}_{}", desired, *serial - 1);
            self.top_level(&suffixed)
        }
    }

    /// Display form of a value type, used to compose generated identifiers.
    pub fn suggest_for_type(ty: &ValueType) -> String {
        ty.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_deterministic() {
        let mut a = WasmNameProvider::new();
        let mut b = WasmNameProvider::new();
        for desired in ["Array<Int>@new", "Widget@init", "Array<Int>@new"] {
            assert_eq!(a.top_level(desired), b.top_level(desired));
        }
    }

    #[test]
    fn test_collisions_get_serial_suffixes() {
        let mut names = WasmNameProvider::new();
        assert_eq!(names.top_level("f"), "f");
        assert_eq!(names.top_level("f"), "f_1");
        assert_eq!(names.top_level("f"), "f_2");
        // A literal request for an already-issued suffixed name moves on.
        assert_eq!(names.top_level("f_1"), "f_1_1");
    }

    #[test]
    fn test_suggested_type_names_use_display_form() {
        assert_eq!(WasmNameProvider::suggest_for_type(&ValueType::Int), "Int");
        assert_eq!(
            WasmNameProvider::suggest_for_type(&ValueType::Object("Widget".to_string())),
            "Widget"
        );
        assert_eq!(
            WasmNameProvider::suggest_for_type(&ValueType::Double.array_of()),
            "Array<Double>"
        );
    }
}
