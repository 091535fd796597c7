//! Factory for creating arrays and strings bound to one strategy.
//!
//! `ArrayFactory` bundles an allocation strategy with a capacity policy and
//! stamps out fresh instances on demand. Nothing is pooled or reused: every
//! instance owns its block and releases it when dropped.
//!
//! # Examples
//!
//! ```
//! use darray::factory::ArrayFactory;
//!
//! let factory = ArrayFactory::new();
//! let mut ids = factory.array::<u32>(0)?;
//! ids.push(7)?;
//!
//! let exact = ArrayFactory::new().exact();
//! let row = exact.array::<f64>(16)?;
//! assert_eq!(row.capacity(), 16);
//! # Ok::<(), darray::Error>(())
//! ```
//!
//! # Shared strategies
//!
//! A stateful strategy is shared by putting it behind `Rc` (or a reference):
//! each instance clones the handle into its own header.
//!
//! ```ignore
//! let counter = Rc::new(CountingAlloc::default());
//! let factory = ArrayFactory::with_strategy(Rc::clone(&counter));
//! let a = factory.array::<u8>(0)?;
//! let b = factory.string_from("hello")?;
//! ```

use bytemuck::Pod;

use crate::alloc::{Global, RawAlloc};
use crate::error::Result;
use crate::raw::DArray;
#[cfg(feature = "text")]
use crate::string::DString;

/// How a factory sizes new arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// Default growth slack.
    #[default]
    Grow,
    /// Capacity equal to the requested length.
    Exact,
}

/// Creates arrays and strings that all use the same strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayFactory<A: RawAlloc + Clone = Global> {
    strategy: A,
    policy: CapacityPolicy,
}

impl ArrayFactory<Global> {
    /// A factory on the platform allocator with default growth.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strategy: Global,
            policy: CapacityPolicy::Grow,
        }
    }
}

impl<A: RawAlloc + Clone> ArrayFactory<A> {
    /// A factory on `strategy` with default growth.
    #[must_use]
    pub const fn with_strategy(strategy: A) -> Self {
        Self {
            strategy,
            policy: CapacityPolicy::Grow,
        }
    }

    /// The same factory, creating arrays with no growth slack.
    #[must_use]
    pub fn exact(self) -> Self {
        Self {
            policy: CapacityPolicy::Exact,
            ..self
        }
    }

    /// The strategy every instance from this factory is bound to.
    #[must_use]
    pub fn strategy(&self) -> &A {
        &self.strategy
    }

    /// How new arrays are sized.
    #[must_use]
    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Creates an array of `count` zeroed elements.
    pub fn array<T: Pod>(&self, count: usize) -> Result<DArray<T, A>> {
        let strategy = self.strategy.clone();
        match self.policy {
            CapacityPolicy::Grow => DArray::create_in(count, strategy),
            CapacityPolicy::Exact => DArray::create_exact_in(count, strategy),
        }
    }

    /// Creates an array holding a copy of `src`.
    pub fn array_from<T: Pod>(&self, src: &[T]) -> Result<DArray<T, A>> {
        let mut array = self.array(0)?;
        array.concat(src)?;
        Ok(array)
    }

    /// Creates an empty string.
    #[cfg(feature = "text")]
    pub fn string(&self) -> Result<DString<A>> {
        DString::new_in(self.strategy.clone())
    }

    /// Creates a string holding `src` up to its first zero byte.
    #[cfg(feature = "text")]
    pub fn string_from(&self, src: impl AsRef<[u8]>) -> Result<DString<A>> {
        DString::from_cstr_in(src, self.strategy.clone())
    }

    /// Creates a string from format arguments.
    #[cfg(feature = "text")]
    pub fn string_fmt(&self, args: std::fmt::Arguments<'_>) -> Result<DString<A>> {
        DString::from_fmt_in(args, self.strategy.clone())
    }
}
