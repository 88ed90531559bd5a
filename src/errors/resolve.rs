use alloc::boxed::Box;

use super::instantiate::InstantiateErrorKind;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding found for token `{description}`")]
    NoBinding { description: &'static str },
    #[error("Missing required 'injected' registration of '{creator}'")]
    MissingInjected { creator: TypeInfo },
    #[error("Incorrect provided type. Actual: {actual}, expected: {expected}")]
    IncorrectType { expected: TypeInfo, actual: TypeInfo },
    #[error("Cyclic dependency detected on token `{description}`")]
    CyclicDependency { description: &'static str },
    #[error("Failed to resolve injected dependency of '{creator}': {source}")]
    Dependency {
        creator: TypeInfo,
        source: Box<ResolveErrorKind>,
    },
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
}
