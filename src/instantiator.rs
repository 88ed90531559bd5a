use alloc::{collections::VecDeque, sync::Arc};
use core::any::Any;
use tracing::debug;

use crate::{any::TypeInfo, errors::InstantiateErrorKind};

pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

type BoxedFactory = Arc<dyn Fn() -> Result<Instance, InstantiateErrorKind> + Send + Sync>;
type BoxedCreate = Arc<dyn Fn(Arguments) -> Result<Instance, InstantiateErrorKind> + Send + Sync>;

/// A constructor whose parameters are injected from slots of a module.
///
/// Which slots feed the parameters, and in which order, is declared separately with
/// [`crate::Injector::register`]. A creator with `PARAMETERS > 0` can't be resolved without such declaration.
///
/// # Examples
/// ```rust
/// use dimodule::{Arguments, Creator, InstantiateErrorKind};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// struct Server { config: Arc<Config> }
///
/// impl Creator for Server {
///     type Provides = Server;
///     const PARAMETERS: usize = 1;
///
///     fn create(mut arguments: Arguments) -> Result<Self::Provides, InstantiateErrorKind> {
///         Ok(Server { config: arguments.next()? })
///     }
/// }
/// ```
pub trait Creator: 'static {
    type Provides: Send + Sync + 'static;

    const PARAMETERS: usize;

    fn create(arguments: Arguments) -> Result<Self::Provides, InstantiateErrorKind>;
}

/// Resolved injected parameters of a [`Creator`], in declaration order
pub struct Arguments {
    values: VecDeque<Instance>,
    index: usize,
}

impl Arguments {
    #[inline]
    #[must_use]
    pub(crate) fn new(values: impl IntoIterator<Item = Instance>) -> Self {
        Self {
            values: values.into_iter().collect(),
            index: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Takes the next argument
    /// # Errors
    /// - Returns [`InstantiateErrorKind::MissingArgument`] if all arguments were taken
    /// - Returns [`InstantiateErrorKind::IncorrectArgument`] if the argument isn't a `T`
    pub fn next<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>, InstantiateErrorKind> {
        let index = self.index;
        let value = self
            .values
            .pop_front()
            .ok_or(InstantiateErrorKind::MissingArgument { index })?;
        self.index += 1;

        value.downcast().map_err(|_| InstantiateErrorKind::IncorrectArgument {
            index,
            expected: TypeInfo::of::<T>(),
        })
    }
}

#[derive(Clone)]
pub(crate) enum Provider {
    Constant(Instance),
    Factory(BoxedFactory),
    Creator {
        creator: TypeInfo,
        parameters: usize,
        create: BoxedCreate,
    },
}

impl Provider {
    #[inline]
    #[must_use]
    pub(crate) fn constant<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Constant(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub(crate) fn factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(move || {
            let value = factory()?;
            debug!("Instantiated");
            Ok(Arc::new(value) as Instance)
        }))
    }

    #[inline]
    #[must_use]
    pub(crate) fn creator<C: Creator>() -> Self {
        Self::Creator {
            creator: TypeInfo::of::<C>(),
            parameters: C::PARAMETERS,
            create: Arc::new(|arguments| {
                let value = C::create(arguments)?;
                debug!("Created");
                Ok(Arc::new(value) as Instance)
            }),
        }
    }
}
