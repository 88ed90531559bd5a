use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    any::TypeInfo, dependency_module::DependencyModule, errors::ModuleErrorKind, instantiator::Creator, token::TokenSet,
};

/// Deferred injection wiring of a module.
///
/// Records which slots feed the parameters of a [`Creator`] before any of those slots is bound.
/// The slot names are resolved to tokens only when the module is made, against the finalized module.
/// Modules derived with [`crate::Module::bind`] share the injector of the module they were derived from.
#[derive(Clone)]
pub struct Injector {
    tokens: TokenSet,
    registry: Arc<Mutex<BTreeMap<TypeInfo, Vec<&'static str>>>>,
}

impl Injector {
    #[inline]
    #[must_use]
    pub(crate) fn new(tokens: TokenSet) -> Self {
        Self {
            tokens,
            registry: Arc::default(),
        }
    }

    /// Declares that the parameters of `C` are injected from the slots `names`, in this order.
    /// Registering the same creator again replaces its slots.
    ///
    /// # Errors
    /// - Returns [`ModuleErrorKind::UnknownSlot`] if a name isn't a slot of the module
    /// - Returns [`ModuleErrorKind::ArityMismatch`] if the count of names differs from [`Creator::PARAMETERS`]
    pub fn register<C: Creator>(&self, names: &[&'static str]) -> Result<(), ModuleErrorKind> {
        if let Some(name) = names.iter().copied().find(|name| !self.tokens.contains(name)) {
            return Err(ModuleErrorKind::UnknownSlot { name });
        }

        let creator = TypeInfo::of::<C>();
        if names.len() != C::PARAMETERS {
            return Err(ModuleErrorKind::ArityMismatch {
                creator,
                expected: C::PARAMETERS,
                actual: names.len(),
            });
        }

        debug!(creator = creator.name, slots = ?names, "Injector registered");
        self.registry.lock().insert(creator, names.to_vec());
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    /// Declares every registered entry on `module`, resolving slot names against `tokens`.
    /// Entries stay registered, so the same module can be made again.
    pub(crate) fn flush(&self, module: &mut DependencyModule, tokens: &TokenSet) {
        for (creator, names) in self.registry.lock().iter() {
            let injected = names.iter().filter_map(|name| tokens.get(name).copied()).collect();
            module.injected(*creator, injected);
        }
    }
}
