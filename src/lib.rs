#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod binding;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency_module;
pub(crate) mod errors;
pub(crate) mod injector;
pub(crate) mod instantiator;
pub mod meet;
pub(crate) mod module;
pub(crate) mod scope;
pub(crate) mod syntax;
pub(crate) mod token;

pub use any::TypeInfo;
pub use binding::{assign, Binding, Bindings};
pub use config::Config;
pub use container::Container;
pub use dependency_module::{DependencyModule, UseSyntax};
pub use errors::{InstantiateErrorKind, ModuleErrorKind, ResolveErrorKind};
pub use injector::Injector;
pub use instantiator::{Arguments, Creator};
pub use meet::{Meet, Required};
pub use module::{declare, FinalizedModule, Module};
pub use scope::Scope;
pub use syntax::{Directive, ScopeSyntax, ScopedBinding, TypeSyntax};
pub use token::{AnyToken, Token, TokenId, TokenSet};
