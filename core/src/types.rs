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

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type descriptor of a Tern bytecode value.
///
/// These are the element types the WASM-GC backend works from: primitives,
/// named reference types, and arrays of either. `Unit` marks the absence of
/// a value (a function with no result) and is never a valid array element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum ValueType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    /// Named reference type (a user-defined class).
    Object(String),
    Array(Box<ValueType>),
    Unit,
}

impl ValueType {
    /// The array type whose elements are `self`.
    pub fn array_of(self) -> ValueType {
        ValueType::Array(Box::new(self))
    }

    /// True for types represented as heap references in the WASM module.
    pub fn is_reference(&self) -> bool {
        matches!(self, ValueType::Object(_) | ValueType::Array(_))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, ValueType::Unit)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Boolean => write!(f, "Bool"),
            ValueType::Byte => write!(f, "Byte"),
            ValueType::Short => write!(f, "Short"),
            ValueType::Char => write!(f, "Char"),
            ValueType::Int => write!(f, "Int"),
            ValueType::Long => write!(f, "Long"),
            ValueType::Float => write!(f, "Float"),
            ValueType::Double => write!(f, "Double"),
            ValueType::Object(name) => write!(f, "{}", name),
            ValueType::Array(inner) => write!(f, "Array<{}>", inner),
            ValueType::Unit => write!(f, "Unit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display_format() {
        assert_eq!(format!("{}", ValueType::Int), "Int");
        assert_eq!(format!("{}", ValueType::Boolean), "Bool");
        assert_eq!(
            format!("{}", ValueType::Object("Widget".to_string())),
            "Widget"
        );
        assert_eq!(format!("{}", ValueType::Int.array_of()), "Array<Int>");
        assert_eq!(
            format!("{}", ValueType::Int.array_of().array_of()),
            "Array<Array<Int>>"
        );
    }

    #[test]
    fn test_reference_classification() {
        assert!(ValueType::Object("Widget".to_string()).is_reference());
        assert!(ValueType::Long.array_of().is_reference());
        assert!(!ValueType::Long.is_reference());
        assert!(!ValueType::Unit.is_reference());
        assert!(ValueType::Unit.is_unit());
    }
}
