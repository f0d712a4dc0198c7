//! Operation kinds understood by the kernel layer
//!
//! Every operation a state vector can execute belongs to one of six families:
//! plain gates, generators, raw matrices, and the controlled variant of each.
//! The kernel dispatch tables are keyed by these enums.

use crate::error::{GateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! operation_kind {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl $name {
            /// Every member of this family, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical name of the operation
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Look an operation up by its canonical name
            pub fn from_name(name: &str) -> Result<Self> {
                match name {
                    $($label => Ok($name::$variant),)+
                    _ => Err(GateError::UnknownGate {
                        name: name.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

operation_kind! {
    /// Named gates with a fixed matrix (up to parameters)
    GateOperation {
        Identity => "Identity",
        PauliX => "PauliX",
        PauliY => "PauliY",
        PauliZ => "PauliZ",
        Hadamard => "Hadamard",
        S => "S",
        T => "T",
        SX => "SX",
        RX => "RX",
        RY => "RY",
        RZ => "RZ",
        PhaseShift => "PhaseShift",
        Rot => "Rot",
        CNOT => "CNOT",
        CY => "CY",
        CZ => "CZ",
        SWAP => "SWAP",
        ControlledPhaseShift => "ControlledPhaseShift",
        CRX => "CRX",
        CRY => "CRY",
        CRZ => "CRZ",
        CRot => "CRot",
        IsingXX => "IsingXX",
        IsingYY => "IsingYY",
        IsingZZ => "IsingZZ",
        Toffoli => "Toffoli",
        CSWAP => "CSWAP",
        MultiRZ => "MultiRZ",
    }
}

operation_kind! {
    /// Generators of parametric gates, used by gradient methods
    GeneratorOperation {
        RX => "RX",
        RY => "RY",
        RZ => "RZ",
        PhaseShift => "PhaseShift",
        CRX => "CRX",
        CRY => "CRY",
        CRZ => "CRZ",
        ControlledPhaseShift => "ControlledPhaseShift",
        IsingXX => "IsingXX",
        IsingYY => "IsingYY",
        IsingZZ => "IsingZZ",
        MultiRZ => "MultiRZ",
    }
}

operation_kind! {
    /// Raw matrix application, keyed by the number of target wires
    MatrixOperation {
        SingleQubitOp => "SingleQubitOp",
        TwoQubitOp => "TwoQubitOp",
        MultiQubitOp => "MultiQubitOp",
    }
}

operation_kind! {
    /// Gates applied under an arbitrary set of control wires and values
    ControlledGateOperation {
        PauliX => "PauliX",
        PauliY => "PauliY",
        PauliZ => "PauliZ",
        Hadamard => "Hadamard",
        S => "S",
        T => "T",
        SX => "SX",
        RX => "RX",
        RY => "RY",
        RZ => "RZ",
        PhaseShift => "PhaseShift",
        Rot => "Rot",
        SWAP => "SWAP",
        IsingXX => "IsingXX",
        IsingYY => "IsingYY",
        IsingZZ => "IsingZZ",
        MultiRZ => "MultiRZ",
    }
}

operation_kind! {
    /// Generators applied under an arbitrary set of control wires and values
    ControlledGeneratorOperation {
        RX => "RX",
        RY => "RY",
        RZ => "RZ",
        PhaseShift => "PhaseShift",
        IsingXX => "IsingXX",
        IsingYY => "IsingYY",
        IsingZZ => "IsingZZ",
        MultiRZ => "MultiRZ",
    }
}

operation_kind! {
    /// Raw matrix application under control wires
    ControlledMatrixOperation {
        NCSingleQubitOp => "NCSingleQubitOp",
        NCTwoQubitOp => "NCTwoQubitOp",
        NCMultiQubitOp => "NCMultiQubitOp",
    }
}

impl GeneratorOperation {
    /// Parse a generator name, accepting an optional `Generator` prefix
    pub fn parse(name: &str) -> Result<Self> {
        let bare = name.strip_prefix("Generator").unwrap_or(name);
        Self::from_name(bare).map_err(|_| GateError::UnknownGate {
            name: name.to_string(),
        })
    }

    /// The gate this generator belongs to
    pub const fn gate(self) -> GateOperation {
        match self {
            GeneratorOperation::RX => GateOperation::RX,
            GeneratorOperation::RY => GateOperation::RY,
            GeneratorOperation::RZ => GateOperation::RZ,
            GeneratorOperation::PhaseShift => GateOperation::PhaseShift,
            GeneratorOperation::CRX => GateOperation::CRX,
            GeneratorOperation::CRY => GateOperation::CRY,
            GeneratorOperation::CRZ => GateOperation::CRZ,
            GeneratorOperation::ControlledPhaseShift => GateOperation::ControlledPhaseShift,
            GeneratorOperation::IsingXX => GateOperation::IsingXX,
            GeneratorOperation::IsingYY => GateOperation::IsingYY,
            GeneratorOperation::IsingZZ => GateOperation::IsingZZ,
            GeneratorOperation::MultiRZ => GateOperation::MultiRZ,
        }
    }
}

impl ControlledGateOperation {
    /// The uncontrolled gate applied to the target wires
    pub const fn base(self) -> GateOperation {
        match self {
            ControlledGateOperation::PauliX => GateOperation::PauliX,
            ControlledGateOperation::PauliY => GateOperation::PauliY,
            ControlledGateOperation::PauliZ => GateOperation::PauliZ,
            ControlledGateOperation::Hadamard => GateOperation::Hadamard,
            ControlledGateOperation::S => GateOperation::S,
            ControlledGateOperation::T => GateOperation::T,
            ControlledGateOperation::SX => GateOperation::SX,
            ControlledGateOperation::RX => GateOperation::RX,
            ControlledGateOperation::RY => GateOperation::RY,
            ControlledGateOperation::RZ => GateOperation::RZ,
            ControlledGateOperation::PhaseShift => GateOperation::PhaseShift,
            ControlledGateOperation::Rot => GateOperation::Rot,
            ControlledGateOperation::SWAP => GateOperation::SWAP,
            ControlledGateOperation::IsingXX => GateOperation::IsingXX,
            ControlledGateOperation::IsingYY => GateOperation::IsingYY,
            ControlledGateOperation::IsingZZ => GateOperation::IsingZZ,
            ControlledGateOperation::MultiRZ => GateOperation::MultiRZ,
        }
    }
}

impl ControlledGeneratorOperation {
    /// The uncontrolled generator applied to the target wires
    pub const fn base(self) -> GeneratorOperation {
        match self {
            ControlledGeneratorOperation::RX => GeneratorOperation::RX,
            ControlledGeneratorOperation::RY => GeneratorOperation::RY,
            ControlledGeneratorOperation::RZ => GeneratorOperation::RZ,
            ControlledGeneratorOperation::PhaseShift => GeneratorOperation::PhaseShift,
            ControlledGeneratorOperation::IsingXX => GeneratorOperation::IsingXX,
            ControlledGeneratorOperation::IsingYY => GeneratorOperation::IsingYY,
            ControlledGeneratorOperation::IsingZZ => GeneratorOperation::IsingZZ,
            ControlledGeneratorOperation::MultiRZ => GeneratorOperation::MultiRZ,
        }
    }
}

impl MatrixOperation {
    /// Matrix kernel family for a given number of target wires
    pub const fn for_wires(num_wires: usize) -> Self {
        match num_wires {
            1 => MatrixOperation::SingleQubitOp,
            2 => MatrixOperation::TwoQubitOp,
            _ => MatrixOperation::MultiQubitOp,
        }
    }
}

impl ControlledMatrixOperation {
    /// Controlled matrix kernel family for a given number of target wires
    pub const fn for_wires(num_wires: usize) -> Self {
        match num_wires {
            1 => ControlledMatrixOperation::NCSingleQubitOp,
            2 => ControlledMatrixOperation::NCTwoQubitOp,
            _ => ControlledMatrixOperation::NCMultiQubitOp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for &op in GateOperation::ALL {
            assert_eq!(GateOperation::from_name(op.name()).unwrap(), op);
        }
        for &op in ControlledGeneratorOperation::ALL {
            assert_eq!(ControlledGeneratorOperation::from_name(op.name()).unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = GateOperation::from_name("NotAGate").unwrap_err();
        assert_eq!(
            err,
            GateError::UnknownGate {
                name: "NotAGate".to_string()
            }
        );
    }

    #[test]
    fn test_generator_prefix() {
        assert_eq!(
            GeneratorOperation::parse("GeneratorIsingXX").unwrap(),
            GeneratorOperation::IsingXX
        );
        assert_eq!(GeneratorOperation::parse("RY").unwrap(), GeneratorOperation::RY);
        assert!(GeneratorOperation::parse("GeneratorHadamard").is_err());
    }

    #[test]
    fn test_matrix_op_for_wires() {
        assert_eq!(MatrixOperation::for_wires(1), MatrixOperation::SingleQubitOp);
        assert_eq!(MatrixOperation::for_wires(2), MatrixOperation::TwoQubitOp);
        assert_eq!(MatrixOperation::for_wires(5), MatrixOperation::MultiQubitOp);
        assert_eq!(
            ControlledMatrixOperation::for_wires(3),
            ControlledMatrixOperation::NCMultiQubitOp
        );
    }
}
