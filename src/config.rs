use crate::scope::Scope;

/// Config for a module
/// ## Fields
/// - `default_scope`:
///   Scope applied when a binding function returns a bare [`crate::ScopeSyntax`] without choosing one.
///
///   It does **not** override a scope chosen explicitly with a `(syntax, scope)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub default_scope: Scope,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_scope: Scope::Container,
        }
    }
}
