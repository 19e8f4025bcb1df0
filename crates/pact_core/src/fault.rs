//! Faults raised by the runtime core.
//!
//! Nothing is retried inside the core: every fault aborts the current
//! evaluation and reaches the host unchanged. Whether a would-be fault is
//! raised at all is decided by the caller from the context mode.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Fault>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// A value is incompatible with the contract it is bound to.
    #[error("contract binding failed: expected {expected}, got {actual}")]
    ContractBinding { expected: String, actual: String },

    #[error("slot not found: {0}")]
    SlotNotFound(String),

    #[error("unsupported operation: {left} {operation} {right}")]
    UnsupportedOperation {
        operation: String,
        left: String,
        right: String,
    },

    #[error("arguments mismatch for {function}: {detail}")]
    FunctionArgumentsMismatch { function: String, detail: String },

    #[error("constant cannot be changed: {0}")]
    ConstantCannotBeChanged(String),

    #[error("slot read before assignment: {0}")]
    UnassignedSlotReading(String),

    #[error("division by zero")]
    DivideByZero,

    #[error("arithmetic overflow in {operation}")]
    Overflow { operation: String },

    #[error("end of collection")]
    EndOfCollection,

    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    #[error("identifier expected, found {0}")]
    IdentifierExpected(String),

    #[error("contract expected, found {0}")]
    ContractExpected(String),

    #[error("value of kind {0} cannot be serialized")]
    NotSerializable(String),
}

/// Tag for matching on a fault without destructuring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    ContractBinding,
    SlotNotFound,
    UnsupportedOperation,
    FunctionArgumentsMismatch,
    ConstantCannotBeChanged,
    UnassignedSlotReading,
    DivideByZero,
    Overflow,
    EndOfCollection,
    IndexOutOfRange,
    IdentifierExpected,
    ContractExpected,
    NotSerializable,
}

impl Fault {
    pub fn kind(&self) -> FaultKind {
        match self {
            Fault::ContractBinding { .. } => FaultKind::ContractBinding,
            Fault::SlotNotFound(_) => FaultKind::SlotNotFound,
            Fault::UnsupportedOperation { .. } => FaultKind::UnsupportedOperation,
            Fault::FunctionArgumentsMismatch { .. } => FaultKind::FunctionArgumentsMismatch,
            Fault::ConstantCannotBeChanged(_) => FaultKind::ConstantCannotBeChanged,
            Fault::UnassignedSlotReading(_) => FaultKind::UnassignedSlotReading,
            Fault::DivideByZero => FaultKind::DivideByZero,
            Fault::Overflow { .. } => FaultKind::Overflow,
            Fault::EndOfCollection => FaultKind::EndOfCollection,
            Fault::IndexOutOfRange { .. } => FaultKind::IndexOutOfRange,
            Fault::IdentifierExpected(_) => FaultKind::IdentifierExpected,
            Fault::ContractExpected(_) => FaultKind::ContractExpected,
            Fault::NotSerializable(_) => FaultKind::NotSerializable,
        }
    }

    pub fn binding(expected: impl ToString, actual: impl ToString) -> Self {
        Fault::ContractBinding {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn unsupported(
        operation: impl ToString,
        left: impl ToString,
        right: impl ToString,
    ) -> Self {
        Fault::UnsupportedOperation {
            operation: operation.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn mismatch(function: impl ToString, detail: impl ToString) -> Self {
        Fault::FunctionArgumentsMismatch {
            function: function.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn overflow(operation: impl ToString) -> Self {
        Fault::Overflow {
            operation: operation.to_string(),
        }
    }
}
