use alloc::{collections::BTreeSet, vec::Vec};
use core::{
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::any::TypeInfo;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(u64);

impl TokenId {
    #[inline]
    fn next() -> Self {
        Self(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity marker for one dependency slot holding a value of type `T`.
///
/// Two tokens are equal only if one is a copy of the other, even when both
/// have the same description and value type.
pub struct Token<T> {
    id: TokenId,
    description: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Token<T> {
    #[inline]
    #[must_use]
    pub fn new(description: &'static str) -> Self {
        Self {
            id: TokenId::next(),
            description,
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> TokenId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

impl<T: 'static> Token<T> {
    #[inline]
    #[must_use]
    pub fn erase(&self) -> AnyToken {
        AnyToken {
            id: self.id,
            description: self.description,
            type_info: TypeInfo::of::<T>(),
        }
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Token<T> {}

impl<T> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Token<T> {}

impl<T> Debug for Token<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

/// Type-erased [`Token`]
#[derive(Debug, Clone, Copy)]
pub struct AnyToken {
    id: TokenId,
    description: &'static str,
    type_info: TypeInfo,
}

impl AnyToken {
    #[inline]
    #[must_use]
    pub const fn id(&self) -> TokenId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Restores the typed token, if `T` is the value type it was created with
    #[must_use]
    pub fn downcast<T: 'static>(&self) -> Option<Token<T>> {
        if self.type_info != TypeInfo::of::<T>() {
            return None;
        }
        Some(Token {
            id: self.id,
            description: self.description,
            _marker: PhantomData,
        })
    }
}

impl PartialEq for AnyToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnyToken {}

impl<T: 'static> From<Token<T>> for AnyToken {
    fn from(token: Token<T>) -> Self {
        token.erase()
    }
}

impl<T: 'static> From<&Token<T>> for AnyToken {
    fn from(token: &Token<T>) -> Self {
        token.erase()
    }
}

/// Named dependency slots of a module.
///
/// Keys are unique. Iteration follows insertion order, which is the order of the module's `all_tokens`,
/// while equality ignores it.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    entries: Vec<(&'static str, AnyToken)>,
}

impl TokenSet {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, name: &'static str, token: impl Into<AnyToken>) -> Self {
        self.insert(name, token.into());
        self
    }

    /// Inserts a slot. Replacing an existing key keeps its position.
    pub fn insert(&mut self, name: &'static str, token: AnyToken) -> Option<AnyToken> {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, old)) => Some(core::mem::replace(old, token)),
            None => {
                self.entries.push((name, token));
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AnyToken> {
        self.entries.iter().find(|(key, _)| *key == name).map(|(_, token)| token)
    }

    #[must_use]
    pub fn token<T: 'static>(&self, name: &str) -> Option<Token<T>> {
        self.get(name).and_then(AnyToken::downcast)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    #[inline]
    #[must_use]
    pub fn names(&self) -> BTreeSet<&'static str> {
        self.keys().collect()
    }

    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &AnyToken> + '_ {
        self.entries.iter().map(|(_, token)| token)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AnyToken)> + '_ {
        self.entries.iter().map(|(key, token)| (*key, token))
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

    /// Keys of `self` in their order, followed by the keys only `other` has.
    /// On a shared key the token of `self` is kept.
    #[must_use]
    pub fn union(&self, other: &TokenSet) -> TokenSet {
        let mut union = self.clone();
        for (name, token) in other.iter() {
            if !union.contains(name) {
                union.entries.push((name, *token));
            }
        }
        union
    }

    /// Slots of `self` whose names are in `names`, in the order of `self`
    #[must_use]
    pub fn restrict<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> TokenSet {
        let names: BTreeSet<&str> = names.into_iter().collect();
        self.iter()
            .filter(|(name, _)| names.contains(name))
            .map(|(name, token)| (name, *token))
            .collect()
    }
}

impl PartialEq for TokenSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(name, token)| other.get(name) == Some(token))
    }
}

impl Eq for TokenSet {}

impl FromIterator<(&'static str, AnyToken)> for TokenSet {
    fn from_iter<I: IntoIterator<Item = (&'static str, AnyToken)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, token) in iter {
            set.insert(name, token);
        }
        set
    }
}
