use alloc::vec::Vec;

use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleErrorKind {
    #[error("Slot `{name}` isn't declared in the module")]
    UnknownSlot { name: &'static str },
    #[error("Slot `{name}` isn't required by the module, it's already bound")]
    NotRequired { name: &'static str },
    #[error("Bindings for required slots are missing: {names:?}")]
    MissingBindings { names: Vec<&'static str> },
    #[error("Binding for slot `{name}` provides `{actual}`, but the slot holds `{expected}`")]
    IncorrectType {
        name: &'static str,
        expected: TypeInfo,
        actual: TypeInfo,
    },
    #[error("Creator `{creator}` takes {expected} injected parameters, but {actual} slots were registered")]
    ArityMismatch { creator: TypeInfo, expected: usize, actual: usize },
}
