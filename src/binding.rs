use alloc::{collections::BTreeMap, sync::Arc};
use core::fmt::{self, Debug, Formatter};
use tracing::debug;

use crate::{
    any::TypeInfo,
    config::Config,
    dependency_module::DependencyModule,
    errors::ModuleErrorKind,
    module::FinalizedModule,
    scope::apply_scope,
    syntax::{Directive, TypeSyntax},
    token::{AnyToken, TokenSet},
};

type BoxedBind = Arc<dyn Fn(AnyToken) -> Option<Directive> + Send + Sync>;

/// Binding function of one slot.
///
/// It receives a [`TypeSyntax`] for the slot's token and returns anything convertible into a [`Directive`]:
/// a bare [`crate::ScopeSyntax`] (bound in the default scope), a `(ScopeSyntax, Scope)` pair, or `()` to leave the slot unbound.
/// The function isn't called until the module is made.
#[derive(Clone)]
pub struct Binding {
    provides: TypeInfo,
    bind: BoxedBind,
}

impl Binding {
    #[must_use]
    pub fn new<T, F, R>(binding: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(TypeSyntax<T>) -> R + Send + Sync + 'static,
        R: Into<Directive>,
    {
        Self {
            provides: TypeInfo::of::<T>(),
            bind: Arc::new(move |token: AnyToken| token.downcast::<T>().map(|token| binding(TypeSyntax::new(token)).into())),
        }
    }

    /// Shortcut for a binding to a constant value
    #[inline]
    #[must_use]
    pub fn constant<T: Clone + Send + Sync + 'static>(value: T) -> Self {
        Self::new(move |syntax: TypeSyntax<T>| syntax.to_constant(value.clone()))
    }

    #[inline]
    #[must_use]
    pub fn provides(&self) -> TypeInfo {
        self.provides
    }

    /// Checks that the binding can be applied to the token of slot `name`
    pub(crate) fn check(&self, name: &'static str, token: &AnyToken) -> Result<(), ModuleErrorKind> {
        if self.provides == token.type_info() {
            Ok(())
        } else {
            Err(ModuleErrorKind::IncorrectType {
                name,
                expected: token.type_info(),
                actual: self.provides,
            })
        }
    }

    pub(crate) fn directive(&self, name: &'static str, token: AnyToken) -> Result<Directive, ModuleErrorKind> {
        self.check(name, &token)?;
        (self.bind)(token).ok_or(ModuleErrorKind::IncorrectType {
            name,
            expected: token.type_info(),
            actual: self.provides,
        })
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("provides", &self.provides).finish_non_exhaustive()
    }
}

/// Binding functions by slot name
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: BTreeMap<&'static str, Binding>,
}

impl Bindings {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, name: &'static str, binding: Binding) -> Self {
        self.insert(name, binding);
        self
    }

    #[inline]
    pub fn insert(&mut self, name: &'static str, binding: Binding) -> Option<Binding> {
        self.entries.insert(name, binding)
    }

    /// Inserts the binding only if the slot has no binding yet
    #[inline]
    pub(crate) fn or_insert(&mut self, name: &'static str, binding: Binding) {
        self.entries.entry(name).or_insert(binding);
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bindings of the slots in `tokens` only
    #[must_use]
    pub(crate) fn restrict(&self, tokens: &TokenSet) -> Self {
        self.entries
            .iter()
            .filter(|(name, _)| tokens.contains(name))
            .map(|(name, binding)| (*name, binding.clone()))
            .collect()
    }
}

impl FromIterator<(&'static str, Binding)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (&'static str, Binding)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Applies the bindings to the slots of `tokens` that have one.
///
/// Bindings for names outside `tokens` are ignored, slots without a binding stay unbound.
///
/// # Errors
/// - Returns [`ModuleErrorKind::IncorrectType`] if a binding provides another type than its slot holds
pub fn assign(tokens: &TokenSet, bindings: &Bindings, config: &Config) -> Result<FinalizedModule, ModuleErrorKind> {
    let mut module = DependencyModule::new();

    for (name, token) in tokens.iter() {
        let Some(binding) = bindings.get(name) else {
            continue;
        };
        match apply_scope(binding.directive(name, *token)?, config.default_scope) {
            Some(scoped) => module.insert(scoped),
            None => debug!(slot = name, "Binding function left slot unbound"),
        }
    }

    for name in bindings.names().filter(|name| !tokens.contains(name)) {
        debug!(slot = name, "Binding for undeclared slot ignored");
    }

    Ok(FinalizedModule::new(tokens.clone(), module))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{assign, Binding, Bindings};
    use crate::{config::Config, errors::ModuleErrorKind, scope::Scope, token::TokenSet, Container, Token, TypeSyntax};

    use std::{format, string::{String, ToString}};
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_assign_intersection() {
        let text = Token::<&'static str>::new("text");
        let number = Token::<u8>::new("number");
        let tokens = TokenSet::new().with("text", text).with("number", number);

        let bindings = Bindings::new()
            .with("text", Binding::constant("a"))
            .with("undeclared", Binding::constant(1u8));
        let module = assign(&tokens, &bindings, &Config::default()).unwrap();

        assert_eq!(module.tokens(), &tokens);
        assert!(module.is_bound(text));
        assert!(!module.is_bound(number));
        assert!(logs_contain("Binding for undeclared slot ignored"));
    }

    #[test]
    #[traced_test]
    fn test_assign_scopes() {
        let default = Token::<u8>::new("default");
        let explicit = Token::<u8>::new("explicit");
        let unbound = Token::<u8>::new("unbound");
        let tokens = TokenSet::new()
            .with("default", default)
            .with("explicit", explicit)
            .with("unbound", unbound);

        let bindings = Bindings::new()
            .with("default", Binding::new(|syntax: TypeSyntax<u8>| syntax.to_instance(|| 1)))
            .with(
                "explicit",
                Binding::new(|syntax: TypeSyntax<u8>| (syntax.to_instance(|| 2), Scope::Singleton)),
            )
            .with("unbound", Binding::new(|_: TypeSyntax<u8>| ()));

        let config = Config {
            default_scope: Scope::Transient,
        };
        let module = assign(&tokens, &bindings, &config).unwrap();

        let scope_of = |token: Token<u8>| module.dependency_module().lookup(token.id()).map(|(binding, _)| binding.scope());
        assert_eq!(scope_of(default), Some(Scope::Transient));
        assert_eq!(scope_of(explicit), Some(Scope::Singleton));
        assert_eq!(scope_of(unbound), None);

        let mut container = Container::new();
        container.use_token(default).from(&module);
        container.use_token(explicit).from(&module);
        assert_eq!(*container.get(&default).unwrap(), 1);
        assert_eq!(*container.get(&explicit).unwrap(), 2);
    }

    #[test]
    fn test_assign_incorrect_type() {
        let number = Token::<u8>::new("number");
        let tokens = TokenSet::new().with("number", number);

        let bindings = Bindings::new().with("number", Binding::constant("not a number"));
        assert!(matches!(
            assign(&tokens, &bindings, &Config::default()),
            Err(ModuleErrorKind::IncorrectType { name: "number", .. })
        ));
    }

    #[test]
    fn test_restrict() {
        let number = Token::<u8>::new("number");
        let tokens = TokenSet::new().with("number", number);

        let bindings = Bindings::new()
            .with("number", Binding::constant(1u8))
            .with("other", Binding::constant(2u8));
        let restricted = bindings.restrict(&tokens);

        assert_eq!(restricted.len(), 1);
        assert!(restricted.contains("number"));
    }
}
