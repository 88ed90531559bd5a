mod instantiate;
mod module;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use module::ModuleErrorKind;
pub use resolve::ResolveErrorKind;
