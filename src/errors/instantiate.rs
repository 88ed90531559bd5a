use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Injected argument #{index} is missing")]
    MissingArgument { index: usize },
    #[error("Injected argument #{index} has incorrect type, expected: {expected}")]
    IncorrectArgument { index: usize, expected: TypeInfo },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
