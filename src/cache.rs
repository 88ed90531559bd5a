use alloc::collections::{BTreeMap, BTreeSet};

use crate::{instantiator::Instance, syntax::BindingId, token::TokenId};

#[derive(Default, Clone)]
pub(crate) struct Cache {
    instances: BTreeMap<BindingId, Instance>,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, id: &BindingId) -> Option<Instance> {
        self.instances.get(id).cloned()
    }

    /// Keeps an already cached instance, so that every caller observes the first one
    #[inline]
    pub(crate) fn insert(&mut self, id: BindingId, instance: Instance) -> Instance {
        self.instances.entry(id).or_insert(instance).clone()
    }
}

/// State of one top-level resolution: instances in resolution scope and tokens being resolved
#[derive(Default)]
pub(crate) struct Resolution {
    pub(crate) cache: Cache,
    resolving: BTreeSet<TokenId>,
}

impl Resolution {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the token is already being resolved
    #[inline]
    pub(crate) fn enter(&mut self, id: TokenId) -> bool {
        self.resolving.insert(id)
    }

    #[inline]
    pub(crate) fn exit(&mut self, id: TokenId) {
        self.resolving.remove(&id);
    }
}
