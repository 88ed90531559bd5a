use alloc::sync::Arc;
use core::{
    fmt::{self, Debug, Formatter},
    sync::atomic::{AtomicU64, Ordering},
};
use parking_lot::Mutex;

use crate::{
    errors::InstantiateErrorKind,
    instantiator::{Creator, Instance, Provider},
    scope::Scope,
    token::{AnyToken, Token},
};

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct BindingId(u64);

/// Start of a binding for a token: chooses how the slot's value is produced
pub struct TypeSyntax<T> {
    token: Token<T>,
}

impl<T: Send + Sync + 'static> TypeSyntax<T> {
    #[inline]
    #[must_use]
    pub fn new(token: Token<T>) -> Self {
        Self { token }
    }

    #[inline]
    #[must_use]
    pub fn token(&self) -> Token<T> {
        self.token
    }

    /// Binds the slot to a value created outside the container.
    /// The value is shared whatever scope is chosen.
    #[inline]
    #[must_use]
    pub fn to_constant(self, value: T) -> ScopeSyntax {
        self.syntax(Provider::constant(value))
    }

    #[inline]
    #[must_use]
    pub fn to_instance<F>(self, instance: F) -> ScopeSyntax
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.syntax(Provider::factory(move || Ok(instance())))
    }

    #[inline]
    #[must_use]
    pub fn to_factory<F>(self, factory: F) -> ScopeSyntax
    where
        F: Fn() -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.syntax(Provider::factory(factory))
    }

    /// Binds the slot to a [`Creator`] whose parameters are injected by the container
    #[inline]
    #[must_use]
    pub fn to_creator<C: Creator<Provides = T>>(self) -> ScopeSyntax {
        self.syntax(Provider::creator::<C>())
    }

    #[inline]
    fn syntax(self, provider: Provider) -> ScopeSyntax {
        ScopeSyntax {
            token: self.token.erase(),
            provider,
        }
    }
}

/// Binding waiting for a lifecycle directive
pub struct ScopeSyntax {
    token: AnyToken,
    provider: Provider,
}

impl ScopeSyntax {
    #[inline]
    #[must_use]
    pub fn in_container_scope(self) -> ScopedBinding {
        self.in_scope(Scope::Container)
    }

    #[inline]
    #[must_use]
    pub fn in_resolution_scope(self) -> ScopedBinding {
        self.in_scope(Scope::Resolution)
    }

    #[inline]
    #[must_use]
    pub fn in_transient_scope(self) -> ScopedBinding {
        self.in_scope(Scope::Transient)
    }

    #[inline]
    #[must_use]
    pub fn in_singleton_scope(self) -> ScopedBinding {
        self.in_scope(Scope::Singleton)
    }

    fn in_scope(self, scope: Scope) -> ScopedBinding {
        ScopedBinding {
            id: BindingId(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed)),
            token: self.token,
            provider: self.provider,
            scope,
            singleton: Arc::new(Mutex::new(None)),
        }
    }
}

/// Complete binding of one token. Clones are the same binding and share the singleton instance.
#[derive(Clone)]
pub struct ScopedBinding {
    pub(crate) id: BindingId,
    pub(crate) token: AnyToken,
    pub(crate) provider: Provider,
    pub(crate) scope: Scope,
    pub(crate) singleton: Arc<Mutex<Option<Instance>>>,
}

impl ScopedBinding {
    #[inline]
    #[must_use]
    pub fn token(&self) -> AnyToken {
        self.token
    }

    #[inline]
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }
}

impl Debug for ScopedBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedBinding")
            .field("id", &self.id)
            .field("token", &self.token)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// What a binding function returned for its slot
pub enum Directive {
    /// Nothing is bound, the slot stays without binding
    Unbound,
    /// Bound in the module's default scope
    Scoped(ScopeSyntax),
    /// Bound in an explicitly chosen scope
    ScopedWith(ScopeSyntax, Scope),
}

impl From<()> for Directive {
    fn from((): ()) -> Self {
        Self::Unbound
    }
}

impl From<ScopeSyntax> for Directive {
    fn from(syntax: ScopeSyntax) -> Self {
        Self::Scoped(syntax)
    }
}

impl From<(ScopeSyntax, Scope)> for Directive {
    fn from((syntax, scope): (ScopeSyntax, Scope)) -> Self {
        Self::ScopedWith(syntax, scope)
    }
}

impl From<Option<ScopeSyntax>> for Directive {
    fn from(syntax: Option<ScopeSyntax>) -> Self {
        syntax.map_or(Self::Unbound, Self::Scoped)
    }
}

#[cfg(test)]
mod tests {
    use super::{Directive, ScopeSyntax, TypeSyntax};
    use crate::{scope::Scope, token::Token};

    #[test]
    fn test_scope_directives() {
        let token = Token::<u8>::new("number");

        assert_eq!(TypeSyntax::new(token).to_constant(1).in_container_scope().scope(), Scope::Container);
        assert_eq!(TypeSyntax::new(token).to_constant(1).in_resolution_scope().scope(), Scope::Resolution);
        assert_eq!(TypeSyntax::new(token).to_constant(1).in_transient_scope().scope(), Scope::Transient);
        assert_eq!(TypeSyntax::new(token).to_constant(1).in_singleton_scope().scope(), Scope::Singleton);
    }

    #[test]
    fn test_binding_identity() {
        let token = Token::<u8>::new("number");

        let first = TypeSyntax::new(token).to_instance(|| 1).in_container_scope();
        let second = TypeSyntax::new(token).to_instance(|| 1).in_container_scope();

        assert_eq!(first.token(), token.erase());
        assert_eq!(first.clone().id, first.id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_directive_from() {
        let token = Token::<u8>::new("number");

        assert!(matches!(Directive::from(()), Directive::Unbound));
        assert!(matches!(Directive::from(None::<ScopeSyntax>), Directive::Unbound));
        assert!(matches!(
            Directive::from(TypeSyntax::new(token).to_constant(1)),
            Directive::Scoped(_)
        ));
        assert!(matches!(
            Directive::from((TypeSyntax::new(token).to_constant(1), Scope::Singleton)),
            Directive::ScopedWith(_, Scope::Singleton)
        ));
    }
}
