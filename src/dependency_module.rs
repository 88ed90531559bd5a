use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use tracing::debug;

use crate::{
    any::TypeInfo,
    syntax::ScopedBinding,
    token::{AnyToken, TokenId},
};

#[derive(Clone)]
pub(crate) enum Source {
    Bound(ScopedBinding),
    Module(Arc<DependencyModule>),
}

/// Bindings of a group of tokens, either owned or sourced from other modules,
/// together with the injection declarations of the creators they use.
#[derive(Clone, Default)]
pub struct DependencyModule {
    pub(crate) entries: BTreeMap<TokenId, Source>,
    injections: BTreeMap<TypeInfo, Vec<AnyToken>>,
}

impl DependencyModule {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a token owned by this module, replacing its previous source
    pub fn insert(&mut self, binding: ScopedBinding) {
        debug!(token = binding.token.description(), scope = binding.scope.name(), "Bound");
        self.entries.insert(binding.token.id(), Source::Bound(binding));
    }

    /// Starts declaring that a token is sourced from another module
    #[inline]
    #[must_use]
    pub fn use_token(&mut self, token: impl Into<AnyToken>) -> UseSyntax<'_> {
        UseSyntax {
            module: self,
            token: token.into(),
        }
    }

    /// Declares the tokens injected into the parameters of `creator`, in parameter order
    pub fn injected(&mut self, creator: TypeInfo, tokens: Vec<AnyToken>) {
        debug!(creator = creator.name, count = tokens.len(), "Injection declared");
        self.injections.insert(creator, tokens);
    }

    #[inline]
    #[must_use]
    pub fn injection(&self, creator: &TypeInfo) -> Option<&[AnyToken]> {
        self.injections.get(creator).map(Vec::as_slice)
    }

    /// Copies injection declarations of `other`, overriding the ones declared for the same creators
    pub(crate) fn extend_injections(&mut self, other: &DependencyModule) {
        self.injections
            .extend(other.injections.iter().map(|(creator, tokens)| (*creator, tokens.clone())));
    }

    /// Whether the token leads to a binding, directly or through the modules it's sourced from
    #[inline]
    #[must_use]
    pub fn is_bound(&self, token: impl Into<AnyToken>) -> bool {
        self.lookup(token.into().id()).is_some()
    }

    /// Finds the binding of a token and the module that owns it
    pub(crate) fn lookup(&self, id: TokenId) -> Option<(&ScopedBinding, &DependencyModule)> {
        match self.entries.get(&id)? {
            Source::Bound(binding) => Some((binding, self)),
            Source::Module(module) => module.lookup(id),
        }
    }
}

pub struct UseSyntax<'a> {
    module: &'a mut DependencyModule,
    token: AnyToken,
}

impl UseSyntax<'_> {
    pub fn from(self, module: impl Into<Arc<DependencyModule>>) {
        debug!(token = self.token.description(), "Sourced from module");
        self.module.entries.insert(self.token.id(), Source::Module(module.into()));
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::DependencyModule;
    use crate::{any::TypeInfo, token::Token, TypeSyntax};

    use std::{sync::Arc, vec};
    use std::{format, string::{String, ToString}};
    use tracing_test::traced_test;

    struct Creator;

    #[test]
    #[traced_test]
    fn test_lookup_through_sources() {
        let number = Token::<u8>::new("number");
        let text = Token::<&'static str>::new("text");

        let mut inner = DependencyModule::new();
        inner.insert(TypeSyntax::new(number).to_constant(1).in_container_scope());
        let inner = Arc::new(inner);

        let mut outer = DependencyModule::new();
        outer.use_token(number).from(inner.clone());
        outer.use_token(text).from(inner.clone());

        assert!(outer.is_bound(number));
        assert!(!outer.is_bound(text));

        let (binding, owner) = outer.lookup(number.id()).unwrap();
        assert_eq!(binding.token(), number.erase());
        assert!(owner.injection(&TypeInfo::of::<Creator>()).is_none());
        assert!(core::ptr::eq(owner, &*inner));
    }

    #[test]
    fn test_injections_override() {
        let first = Token::<u8>::new("first");
        let second = Token::<u8>::new("second");
        let creator = TypeInfo::of::<Creator>();

        let mut module = DependencyModule::new();
        module.injected(creator, vec![first.erase()]);

        let mut other = DependencyModule::new();
        other.injected(creator, vec![second.erase(), first.erase()]);

        module.extend_injections(&other);
        assert_eq!(module.injection(&creator), Some(&[second.erase(), first.erase()][..]));
    }
}
