//! Closed catalog of the operations every number type is addressed through.
//!
//! The tags are plain data: they name a native implementation on a concrete
//! type, label the derived formulas of the facade, and can be stored in
//! configuration (serde, snake_case) or parsed back from their display names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named basis and identity elements a number type must be able to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardConstant {
    Zero,
    RealOne,
    SpecialOne,
    UnitsOne,
    NonRealUnitsOne,
    CombinedOne,
    AllOne,
}

impl StandardConstant {
    pub const ALL: [StandardConstant; 7] = [
        StandardConstant::Zero,
        StandardConstant::RealOne,
        StandardConstant::SpecialOne,
        StandardConstant::UnitsOne,
        StandardConstant::NonRealUnitsOne,
        StandardConstant::CombinedOne,
        StandardConstant::AllOne,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StandardConstant::Zero => "zero",
            StandardConstant::RealOne => "real_one",
            StandardConstant::SpecialOne => "special_one",
            StandardConstant::UnitsOne => "units_one",
            StandardConstant::NonRealUnitsOne => "non_real_units_one",
            StandardConstant::CombinedOne => "combined_one",
            StandardConstant::AllOne => "all_one",
        }
    }
}

impl fmt::Display for StandardConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Single-argument operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryKind {
    Negate,
    Inverse,
    Conjugate,
    Modulus,
    Double,
    Half,
    Square,
    SquareRoot,
    Exp,
    Log,
    Sin,
    Asin,
    Cos,
    Acos,
    Tan,
    Atan,
    Sinh,
    Asinh,
    Cosh,
    Acosh,
    Tanh,
    Atanh,
}

impl UnaryKind {
    pub const ALL: [UnaryKind; 22] = [
        UnaryKind::Negate,
        UnaryKind::Inverse,
        UnaryKind::Conjugate,
        UnaryKind::Modulus,
        UnaryKind::Double,
        UnaryKind::Half,
        UnaryKind::Square,
        UnaryKind::SquareRoot,
        UnaryKind::Exp,
        UnaryKind::Log,
        UnaryKind::Sin,
        UnaryKind::Asin,
        UnaryKind::Cos,
        UnaryKind::Acos,
        UnaryKind::Tan,
        UnaryKind::Atan,
        UnaryKind::Sinh,
        UnaryKind::Asinh,
        UnaryKind::Cosh,
        UnaryKind::Acosh,
        UnaryKind::Tanh,
        UnaryKind::Atanh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UnaryKind::Negate => "negate",
            UnaryKind::Inverse => "inverse",
            UnaryKind::Conjugate => "conjugate",
            UnaryKind::Modulus => "modulus",
            UnaryKind::Double => "double",
            UnaryKind::Half => "half",
            UnaryKind::Square => "square",
            UnaryKind::SquareRoot => "sqrt",
            UnaryKind::Exp => "exp",
            UnaryKind::Log => "log",
            UnaryKind::Sin => "sin",
            UnaryKind::Asin => "asin",
            UnaryKind::Cos => "cos",
            UnaryKind::Acos => "acos",
            UnaryKind::Tan => "tan",
            UnaryKind::Atan => "atan",
            UnaryKind::Sinh => "sinh",
            UnaryKind::Asinh => "asinh",
            UnaryKind::Cosh => "cosh",
            UnaryKind::Acosh => "acosh",
            UnaryKind::Tanh => "tanh",
            UnaryKind::Atanh => "atanh",
        }
    }

    /// Bit used by the capability table.
    pub(crate) fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for UnaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnaryKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "neg" | "-" => UnaryKind::Negate,
            "inv" | "recip" => UnaryKind::Inverse,
            "conj" => UnaryKind::Conjugate,
            "abs" | "mod" => UnaryKind::Modulus,
            "square_root" => UnaryKind::SquareRoot,
            "ln" => UnaryKind::Log,
            other => UnaryKind::ALL
                .iter()
                .copied()
                .find(|kind| kind.name() == other)
                .ok_or_else(|| UnknownKind(other.to_string()))?,
        };
        Ok(kind)
    }
}

/// Two-argument operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Atan2,
}

impl BinaryKind {
    pub const ALL: [BinaryKind; 6] = [
        BinaryKind::Add,
        BinaryKind::Subtract,
        BinaryKind::Multiply,
        BinaryKind::Divide,
        BinaryKind::Power,
        BinaryKind::Atan2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BinaryKind::Add => "add",
            BinaryKind::Subtract => "sub",
            BinaryKind::Multiply => "mul",
            BinaryKind::Divide => "div",
            BinaryKind::Power => "pow",
            BinaryKind::Atan2 => "atan2",
        }
    }

    pub(crate) fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinaryKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "+" | "plus" => BinaryKind::Add,
            "-" | "subtract" | "minus" => BinaryKind::Subtract,
            "*" | "multiply" | "times" => BinaryKind::Multiply,
            "/" | "divide" => BinaryKind::Divide,
            "^" | "power" => BinaryKind::Power,
            other => BinaryKind::ALL
                .iter()
                .copied()
                .find(|kind| kind.name() == other)
                .ok_or_else(|| UnknownKind(other.to_string()))?,
        };
        Ok(kind)
    }
}

/// Zero-argument operations: the standard constants plus the two
/// transcendental constants derived per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullaryKind {
    Constant(StandardConstant),
    Pi,
    E,
}

impl fmt::Display for NullaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullaryKind::Constant(c) => write!(f, "{c}"),
            NullaryKind::Pi => f.write_str("pi"),
            NullaryKind::E => f.write_str("e"),
        }
    }
}

impl FromStr for NullaryKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pi" | "PI" => Ok(NullaryKind::Pi),
            "e" | "E" => Ok(NullaryKind::E),
            other => StandardConstant::ALL
                .iter()
                .copied()
                .find(|c| c.name() == other)
                .map(NullaryKind::Constant)
                .ok_or_else(|| UnknownKind(other.to_string())),
        }
    }
}

/// The four primitive components exposed by the component extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Real,
    OtherUnits,
    SomeCombined,
    AllCombined,
}

impl ComponentKind {
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Real => "real",
            ComponentKind::OtherUnits => "other_units",
            ComponentKind::SomeCombined => "some_combined",
            ComponentKind::AllCombined => "all_combined",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation kind `{0}`")]
pub struct UnknownKind(pub String);
