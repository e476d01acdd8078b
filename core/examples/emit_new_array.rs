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

use tern_core::types::ValueType;
use tern_core::wasm_encode;
use tern_core::WasmGcBackend;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut backend = WasmGcBackend::new();
    backend.array_constructor(&ValueType::Int)?;
    backend.array_constructor(&ValueType::Object("Widget".to_string()))?;
    backend.array_constructor(&ValueType::Int.array_of())?;

    let bytes = backend.finish()?;
    wasm_encode::validate_module(&bytes)?;
    std::fs::write("new_array.wasm", &bytes)?;
    println!(
        "Tern: wrote new_array.wasm ({} bytes, 3 array constructors)",
        bytes.len()
    );
    Ok(())
}
