use crate::syntax::{Directive, ScopeSyntax, ScopedBinding};

/// Lifecycle policy of a bound slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Scope {
    /// One instance per container
    #[default]
    Container,
    /// One instance per top-level resolution, shared by everything that resolution builds
    Resolution,
    /// New instance on every request
    Transient,
    /// One instance per binding for the whole process
    Singleton,
}

impl Scope {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Scope::Container => "container",
            Scope::Resolution => "resolution",
            Scope::Transient => "transient",
            Scope::Singleton => "singleton",
        }
    }

    #[inline]
    #[must_use]
    pub const fn all() -> [Self; 4] {
        use Scope::{Container, Resolution, Singleton, Transient};

        [Container, Resolution, Transient, Singleton]
    }
}

/// Dispatches a scope to the matching lifecycle directive of the syntax
#[inline]
#[must_use]
pub(crate) fn resolve_scope(syntax: ScopeSyntax, scope: Scope) -> ScopedBinding {
    match scope {
        Scope::Container => syntax.in_container_scope(),
        Scope::Resolution => syntax.in_resolution_scope(),
        Scope::Transient => syntax.in_transient_scope(),
        Scope::Singleton => syntax.in_singleton_scope(),
    }
}

/// Turns the result of a binding function into a scoped binding.
/// A bare syntax gets `default_scope`, an explicit pair gets its own scope, and an unbound result yields nothing.
#[must_use]
pub(crate) fn apply_scope(directive: Directive, default_scope: Scope) -> Option<ScopedBinding> {
    match directive {
        Directive::Unbound => None,
        Directive::Scoped(syntax) => Some(resolve_scope(syntax, default_scope)),
        Directive::ScopedWith(syntax, scope) => Some(resolve_scope(syntax, scope)),
    }
}
