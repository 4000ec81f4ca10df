//! Provides the executable side of pattern-driven string generation: a tree
//! of generators that, given a random source, produce strings.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use regen_runtime::*;
//!
//! // approximate to `id-[0-9]{4}`
//! let executor: Arc<dyn Executor> = Arc::new(SequentialExecutor);
//! let digit = Generator::class("[0-9]", RangeSet::new([('0', '9')]));
//! let generator = Generator::concat(
//!     "id-[0-9]{4}",
//!     vec![
//!         Generator::literal("id-", "id-"),
//!         Generator::repeat("[0-9]{4}", 4..=4, digit, executor.clone()),
//!     ],
//!     executor,
//! );
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut ctx = Context::new(&mut rng);
//! let sample = generator.generate(&mut ctx);
//!
//! assert!(sample.starts_with("id-"));
//! assert_eq!(7, sample.len());
//! ```

use std::fmt::{Debug, Display};
use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::{Rng, RngCore};

mod executor;
pub mod range_set;

pub use executor::{Executor, ParallelExecutor, SequentialExecutor};
pub use range_set::RangeSet;

/// Per-invocation state threaded through every generator. The only mutation
/// it sees is the advancement of its random source.
pub struct Context<'a> {
    rng: &'a mut dyn RngCore,
}

impl<'a> Context<'a> {
    pub fn new(rng: &'a mut dyn RngCore) -> Self {
        Self { rng }
    }

    /// The random source all draws are taken from.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }
}

impl Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

/// A compiled, immutable unit that produces one string per invocation.
///
/// Generators form a tree where composite nodes own their children. The
/// `name` is the pattern text the node was compiled from and exists for
/// diagnostics only.
#[derive(Debug, Clone)]
pub struct Generator {
    name: String,
    kind: GeneratorKind,
}

/// The closed set of generation rules a [`Generator`] can carry.
#[derive(Debug, Clone)]
pub enum GeneratorKind {
    /// Always produces the empty string.
    Empty,
    /// Produces its text verbatim.
    Literal(String),
    /// Produces one character drawn uniformly from the set.
    Class(RangeSet),
    Repeat(Repeat),
    Concat(Concat),
    /// Produces the output of one uniformly chosen alternative.
    Alternate(Vec<Generator>),
}

/// Invokes a single generator a uniformly drawn number of times within
/// `bounds`.
#[derive(Debug, Clone)]
pub struct Repeat {
    bounds: RangeInclusive<u32>,
    generator: Box<Generator>,
    executor: Arc<dyn Executor>,
}

impl Repeat {
    pub fn bounds(&self) -> &RangeInclusive<u32> {
        &self.bounds
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }
}

/// Invokes every child generator, joining output in child order.
#[derive(Debug, Clone)]
pub struct Concat {
    generators: Vec<Generator>,
    executor: Arc<dyn Executor>,
}

impl Concat {
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }
}

impl Generator {
    pub fn new<S: Into<String>>(name: S, kind: GeneratorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn empty<S: Into<String>>(name: S) -> Self {
        Self::new(name, GeneratorKind::Empty)
    }

    pub fn literal<S: Into<String>, T: Into<String>>(name: S, text: T) -> Self {
        Self::new(name, GeneratorKind::Literal(text.into()))
    }

    pub fn class<S: Into<String>>(name: S, set: RangeSet) -> Self {
        Self::new(name, GeneratorKind::Class(set))
    }

    /// # Panics
    ///
    /// Panics if `bounds` is empty.
    pub fn repeat<S: Into<String>>(
        name: S,
        bounds: RangeInclusive<u32>,
        generator: Generator,
        executor: Arc<dyn Executor>,
    ) -> Self {
        assert!(!bounds.is_empty(), "repeat bounds must not be empty");

        Self::new(
            name,
            GeneratorKind::Repeat(Repeat {
                bounds,
                generator: Box::new(generator),
                executor,
            }),
        )
    }

    pub fn concat<S: Into<String>>(
        name: S,
        generators: Vec<Generator>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self::new(
            name,
            GeneratorKind::Concat(Concat {
                generators,
                executor,
            }),
        )
    }

    /// # Panics
    ///
    /// Panics if `generators` is empty.
    pub fn alternate<S: Into<String>>(name: S, generators: Vec<Generator>) -> Self {
        assert!(
            !generators.is_empty(),
            "alternation requires at least one alternative"
        );

        Self::new(name, GeneratorKind::Alternate(generators))
    }

    /// The pattern text this generator was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &GeneratorKind {
        &self.kind
    }

    /// Produces one string, drawing all randomness from `ctx`.
    pub fn generate(&self, ctx: &mut Context<'_>) -> String {
        match &self.kind {
            GeneratorKind::Empty => String::new(),
            GeneratorKind::Literal(text) => text.clone(),
            GeneratorKind::Class(set) => {
                let idx = ctx.rng().random_range(0..set.len());
                set.get(idx).to_string()
            }
            GeneratorKind::Repeat(Repeat {
                bounds,
                generator,
                executor,
            }) => {
                let cnt = ctx.rng().random_range(bounds.clone());
                let generators = vec![generator.as_ref(); cnt as usize];

                executor.execute(ctx, &generators)
            }
            GeneratorKind::Concat(Concat {
                generators,
                executor,
            }) => {
                let generators: Vec<&Generator> = generators.iter().collect();

                executor.execute(ctx, &generators)
            }
            GeneratorKind::Alternate(generators) => {
                let idx = ctx.rng().random_range(0..generators.len());
                generators[idx].generate(ctx)
            }
        }
    }
}

impl Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
