use alloc::{sync::Arc, vec::Vec};
use core::fmt::{self, Debug, Formatter};
use tracing::{debug, error, info_span};

use crate::{
    binding::{assign, Binding, Bindings},
    config::Config,
    dependency_module::DependencyModule,
    errors::ModuleErrorKind,
    injector::Injector,
    meet::{meet, Required},
    token::{AnyToken, Token, TokenSet},
};

type Recipe = Arc<dyn Fn(&Bindings) -> Result<FinalizedModule, ModuleErrorKind> + Send + Sync>;

/// Partially applied recipe of a [`FinalizedModule`] over a fixed set of slots.
///
/// A module tracks which of its slots still require a binding. [`Module::bind`] and [`Module::combine`]
/// derive new modules without running any binding function, [`Module::make`] supplies the bindings
/// that are still required and runs the whole recipe.
///
/// # Examples
/// ```rust
/// use dimodule::{Binding, Bindings, Container, Module, Token, TokenSet};
///
/// let name = Token::<&'static str>::new("name");
/// let port = Token::<u16>::new("port");
///
/// let module = Module::declare(TokenSet::new().with("name", name).with("port", port))
///     .bind("name", Binding::constant("server"))
///     .unwrap();
/// assert_eq!(module.required().iter().copied().collect::<Vec<_>>(), ["port"]);
///
/// let finalized = module.make(Bindings::new().with("port", Binding::constant(8080u16))).unwrap();
///
/// let mut container = Container::new();
/// container.use_token(name).from(&finalized);
/// container.use_token(port).from(&finalized);
/// assert_eq!(*container.get(&name).unwrap(), "server");
/// assert_eq!(*container.get(&port).unwrap(), 8080);
/// ```
#[derive(Clone)]
pub struct Module {
    tokens: TokenSet,
    required: Required,
    config: Config,
    injector: Injector,
    recipe: Recipe,
}

/// Declares a module over `tokens` that requires all of them
#[inline]
#[must_use]
pub fn declare(tokens: TokenSet) -> Module {
    Module::declare(tokens)
}

impl Module {
    #[inline]
    #[must_use]
    pub fn declare(tokens: TokenSet) -> Self {
        Self::declare_with_config(tokens, Config::default())
    }

    #[must_use]
    pub fn declare_with_config(tokens: TokenSet, config: Config) -> Self {
        let injector = Injector::new(tokens.clone());
        let recipe: Recipe = {
            let tokens = tokens.clone();
            let injector = injector.clone();
            Arc::new(move |bindings: &Bindings| Ok(assign(&tokens, bindings, &config)?.flush(&injector)))
        };

        Self {
            required: tokens.names(),
            tokens,
            config,
            injector,
            recipe,
        }
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    /// Slots that [`Module::make`] still needs a binding for
    #[inline]
    #[must_use]
    pub fn required(&self) -> &Required {
        &self.required
    }

    #[inline]
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Injection wiring declared for this module, flushed into every module it's made into.
    ///
    /// Unlike the rest of the module, the injector is shared: modules derived with [`Module::bind`]
    /// use the same registry as the module they were derived from, so registering through one of them
    /// changes what all of them flush. [`Module::combine`] starts a new registry.
    #[inline]
    #[must_use]
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Supplies the binding of a required slot.
    /// The binding function isn't called until the module is made.
    ///
    /// # Errors
    /// - Returns [`ModuleErrorKind::UnknownSlot`] if the module has no such slot
    /// - Returns [`ModuleErrorKind::NotRequired`] if the slot is already bound
    /// - Returns [`ModuleErrorKind::IncorrectType`] if the binding provides another type than the slot holds
    pub fn bind(&self, name: &'static str, binding: Binding) -> Result<Module, ModuleErrorKind> {
        let Some(token) = self.tokens.get(name) else {
            return Err(ModuleErrorKind::UnknownSlot { name });
        };
        if !self.required.contains(name) {
            return Err(ModuleErrorKind::NotRequired { name });
        }
        binding.check(name, token)?;

        let mut required = self.required.clone();
        required.remove(name);
        debug!(slot = name, required = ?required, "Slot bound");

        let parent = self.recipe.clone();
        let recipe: Recipe = Arc::new(move |bindings: &Bindings| {
            let mut bindings = bindings.clone();
            bindings.or_insert(name, binding.clone());
            parent(&bindings)
        });

        Ok(Module {
            tokens: self.tokens.clone(),
            required,
            config: self.config,
            injector: self.injector.clone(),
            recipe,
        })
    }

    /// Merges two modules into one over the union of their slots.
    ///
    /// See [`crate::meet`] for which slots the merged module requires.
    /// Neither module is made until the merged one is.
    /// A slot bound by both modules takes the binding of `other`, a binding supplied to [`Module::make`]
    /// replaces both.
    ///
    /// The merged module takes the [`Config`] of `self`. It applies to the bindings supplied to
    /// [`Module::make`] of the merged module, while each side keeps its own config for the slots it binds.
    #[must_use]
    pub fn combine(&self, other: &Module) -> Module {
        let (kind, required) = meet((&self.tokens, &self.required), (&other.tokens, &other.required));
        debug!(meet = kind.name(), required = ?required, "Modules combined");

        let tokens = self.tokens.union(&other.tokens);
        let injector = Injector::new(tokens.clone());
        let config = self.config;

        let recipe: Recipe = {
            let first = self.recipe.clone();
            let second = other.recipe.clone();
            let tokens = tokens.clone();
            let injector = injector.clone();

            Arc::new(move |bindings: &Bindings| {
                let first = first(bindings)?;
                let second = second(bindings)?;

                let leftover = assign(&tokens, bindings, &config)?;

                // Later sources replace earlier ones: the second side overrides the first,
                // bindings supplied to `make` override both
                let mut module = DependencyModule::new();
                for finalized in [&first, &second, &leftover] {
                    for token in finalized.all_tokens() {
                        if finalized.is_bound(*token) {
                            module.use_token(*token).from(finalized);
                        }
                    }
                    module.extend_injections(finalized.dependency_module());
                }

                Ok(FinalizedModule::new(tokens.clone(), module).flush(&injector))
            })
        };

        Module {
            tokens,
            required,
            config,
            injector,
            recipe,
        }
    }

    /// Supplies the bindings of the slots that are still required and builds the module.
    ///
    /// Bindings for names the module doesn't declare are ignored.
    /// A binding for an already bound slot replaces the earlier one.
    ///
    /// # Errors
    /// - Returns [`ModuleErrorKind::MissingBindings`] if a required slot has no binding
    /// - Returns [`ModuleErrorKind::IncorrectType`] if a binding provides another type than its slot holds
    pub fn make(&self, bindings: Bindings) -> Result<FinalizedModule, ModuleErrorKind> {
        let span = info_span!("make", required = ?self.required);
        let _guard = span.enter();

        let missing: Vec<_> = self
            .required
            .iter()
            .copied()
            .filter(|name| !bindings.contains(name))
            .collect();
        if !missing.is_empty() {
            let err = ModuleErrorKind::MissingBindings { names: missing };
            error!("{}", err);
            return Err(err);
        }

        let module = (self.recipe)(&bindings)?;
        debug!(tokens = module.all_tokens().len(), "Made");
        Ok(module)
    }
}

impl Debug for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("tokens", &self.tokens)
            .field("required", &self.required)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Result of [`Module::make`]: every slot bound by the recipe and every injection declaration flushed.
/// Tokens are sourced from it with [`crate::Container::use_token`].
#[derive(Clone)]
pub struct FinalizedModule {
    tokens: TokenSet,
    all_tokens: Vec<AnyToken>,
    inner: Arc<DependencyModule>,
}

impl FinalizedModule {
    #[must_use]
    pub(crate) fn new(tokens: TokenSet, module: DependencyModule) -> Self {
        Self {
            all_tokens: tokens.values().copied().collect(),
            tokens,
            inner: Arc::new(module),
        }
    }

    #[must_use]
    pub(crate) fn flush(mut self, injector: &Injector) -> Self {
        injector.flush(Arc::make_mut(&mut self.inner), &self.tokens);
        self
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    /// Tokens of every slot, in slot order
    #[inline]
    #[must_use]
    pub fn all_tokens(&self) -> &[AnyToken] {
        &self.all_tokens
    }

    #[inline]
    #[must_use]
    pub fn token<T: 'static>(&self, name: &str) -> Option<Token<T>> {
        self.tokens.token(name)
    }

    #[inline]
    #[must_use]
    pub fn is_bound(&self, token: impl Into<AnyToken>) -> bool {
        self.inner.is_bound(token)
    }

    #[inline]
    #[must_use]
    pub fn dependency_module(&self) -> &Arc<DependencyModule> {
        &self.inner
    }
}

impl Debug for FinalizedModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizedModule")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl From<&FinalizedModule> for Arc<DependencyModule> {
    fn from(module: &FinalizedModule) -> Self {
        module.inner.clone()
    }
}

impl From<FinalizedModule> for Arc<DependencyModule> {
    fn from(module: FinalizedModule) -> Self {
        module.inner
    }
}
