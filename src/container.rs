use alloc::{boxed::Box, sync::Arc, vec::Vec};
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    cache::{Cache, Resolution},
    dependency_module::{DependencyModule, Source, UseSyntax},
    errors::ResolveErrorKind,
    instantiator::{Arguments, Instance, Provider},
    scope::Scope,
    syntax::ScopedBinding,
    token::{AnyToken, Token},
};

/// Resolves tokens to instances, honoring the scope of their bindings.
///
/// Tokens become resolvable by sourcing them from modules with [`Container::use_token`]
/// or by binding them directly with [`Container::bind`].
pub struct Container {
    vault: DependencyModule,
    cache: Mutex<Cache>,
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

struct Located<'a> {
    binding: &'a ScopedBinding,
    owner: &'a DependencyModule,
    /// Module the dependencies of the binding are resolved from first
    scope: &'a DependencyModule,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            vault: DependencyModule::new(),
            cache: Mutex::new(Cache::new()),
        }
    }

    /// Starts declaring that a token is sourced from a module
    #[inline]
    #[must_use]
    pub fn use_token(&mut self, token: impl Into<AnyToken>) -> UseSyntax<'_> {
        self.vault.use_token(token)
    }

    #[inline]
    pub fn bind(&mut self, binding: ScopedBinding) {
        self.vault.insert(binding);
    }

    /// Gets a dependency from the container
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoBinding`] if the token, or one of the tokens injected into its creator, isn't bound
    /// - Returns [`ResolveErrorKind::MissingInjected`] if a creator with parameters has no injection declaration
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if the token depends on itself
    pub fn get<T: Send + Sync + 'static>(&self, token: &Token<T>) -> Result<Arc<T>, ResolveErrorKind> {
        let span = info_span!("get", token = token.description());
        let _guard = span.enter();

        let mut resolution = Resolution::new();
        let instance = self.resolve(token.erase(), None, &mut resolution)?;

        instance.downcast().map_err(|_| {
            let err = ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual: token.erase().type_info(),
            };
            error!("{}", err);
            err
        })
    }

    fn locate<'a>(&'a self, token: AnyToken, scope: Option<&'a DependencyModule>) -> Option<Located<'a>> {
        if let Some(scope) = scope {
            if let Some((binding, owner)) = scope.lookup(token.id()) {
                return Some(Located { binding, owner, scope });
            }
        }

        match self.vault.entries.get(&token.id())? {
            Source::Bound(binding) => Some(Located {
                binding,
                owner: &self.vault,
                scope: &self.vault,
            }),
            Source::Module(module) => module.lookup(token.id()).map(|(binding, owner)| Located {
                binding,
                owner,
                scope: module,
            }),
        }
    }

    fn resolve(
        &self,
        token: AnyToken,
        scope: Option<&DependencyModule>,
        resolution: &mut Resolution,
    ) -> Result<Instance, ResolveErrorKind> {
        let Some(located) = self.locate(token, scope) else {
            let err = ResolveErrorKind::NoBinding {
                description: token.description(),
            };
            error!("{}", err);
            return Err(err);
        };

        if !resolution.enter(token.id()) {
            let err = ResolveErrorKind::CyclicDependency {
                description: token.description(),
            };
            error!("{}", err);
            return Err(err);
        }
        let result = self.scoped(&located, resolution);
        resolution.exit(token.id());

        result
    }

    fn scoped(&self, located: &Located<'_>, resolution: &mut Resolution) -> Result<Instance, ResolveErrorKind> {
        let binding = located.binding;

        if let Provider::Constant(value) = &binding.provider {
            return Ok(value.clone());
        }

        match binding.scope {
            Scope::Transient => self.instantiate(located, resolution),
            Scope::Resolution => {
                if let Some(instance) = resolution.cache.get(&binding.id) {
                    debug!("Found in resolution cache");
                    return Ok(instance);
                }
                let instance = self.instantiate(located, resolution)?;
                Ok(resolution.cache.insert(binding.id, instance))
            }
            Scope::Container => {
                if let Some(instance) = self.cache.lock().get(&binding.id) {
                    debug!("Found in container cache");
                    return Ok(instance);
                }
                let instance = self.instantiate(located, resolution)?;
                Ok(self.cache.lock().insert(binding.id, instance))
            }
            Scope::Singleton => {
                if let Some(instance) = binding.singleton.lock().clone() {
                    debug!("Found singleton");
                    return Ok(instance);
                }
                let instance = self.instantiate(located, resolution)?;
                Ok(binding.singleton.lock().get_or_insert(instance).clone())
            }
        }
    }

    fn instantiate(&self, located: &Located<'_>, resolution: &mut Resolution) -> Result<Instance, ResolveErrorKind> {
        match &located.binding.provider {
            Provider::Constant(value) => Ok(value.clone()),
            Provider::Factory(factory) => factory().map_err(|err| {
                error!("{}", err);
                err.into()
            }),
            Provider::Creator {
                creator,
                parameters,
                create,
            } => {
                let injected = located
                    .scope
                    .injection(creator)
                    .or_else(|| located.owner.injection(creator))
                    .or_else(|| self.vault.injection(creator));

                let arguments = match injected {
                    Some(tokens) => {
                        let mut values = Vec::with_capacity(tokens.len());
                        for token in tokens {
                            let value = self
                                .resolve(*token, Some(located.scope), resolution)
                                .map_err(|err| ResolveErrorKind::Dependency {
                                    creator: *creator,
                                    source: Box::new(err),
                                })?;
                            values.push(value);
                        }
                        Arguments::new(values)
                    }
                    None if *parameters == 0 => Arguments::new([]),
                    None => {
                        let err = ResolveErrorKind::MissingInjected { creator: *creator };
                        error!("{}", err);
                        return Err(err);
                    }
                };

                create(arguments).map_err(|err| {
                    error!("{}", err);
                    err.into()
                })
            }
        }
    }
}
