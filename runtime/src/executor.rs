//! Strategies for invoking a sequence of generators and joining their output.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::{Context, Generator};

/// Decides how an ordered sequence of generators is invoked and how their
/// outputs are combined. Every implementation must return the outputs
/// concatenated in the order the generators were supplied.
pub trait Executor: std::fmt::Debug + Send + Sync {
    fn execute(&self, ctx: &mut Context<'_>, generators: &[&Generator]) -> String;
}

/// Invokes each generator in order against the shared random source.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use regen_runtime::*;
///
/// let generators = [Generator::literal("a", "a"), Generator::literal("b", "b")];
/// let refs: Vec<&Generator> = generators.iter().collect();
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let mut ctx = Context::new(&mut rng);
///
/// assert_eq!("ab", SequentialExecutor.execute(&mut ctx, &refs));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn execute(&self, ctx: &mut Context<'_>, generators: &[&Generator]) -> String {
        generators.iter().fold(String::new(), |mut acc, generator| {
            acc.push_str(&generator.generate(ctx));
            acc
        })
    }
}

/// Invokes generators concurrently on the rayon thread pool.
///
/// Draws do not interleave with a sequential run. Instead one `u64` seed is
/// drawn from the shared source per generator, in order, and each generator
/// runs against its own [`StdRng`] seeded with that value. Output is joined
/// by position, so a fixed seed always yields the same string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelExecutor {
    min_len: usize,
}

impl ParallelExecutor {
    /// Sequences shorter than this are run in place on the calling thread.
    pub const DEFAULT_MIN_LEN: usize = 2;

    #[must_use]
    pub fn new() -> Self {
        Self {
            min_len: Self::DEFAULT_MIN_LEN,
        }
    }

    #[must_use]
    pub fn with_min_len(self, min_len: usize) -> Self {
        Self {
            min_len: min_len.max(1),
        }
    }
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ParallelExecutor {
    fn execute(&self, ctx: &mut Context<'_>, generators: &[&Generator]) -> String {
        let seeds: Vec<u64> = generators.iter().map(|_| ctx.rng().next_u64()).collect();

        let run = |(generator, seed): (&&Generator, &u64)| {
            let mut rng = StdRng::seed_from_u64(*seed);
            let mut child_ctx = Context::new(&mut rng);
            generator.generate(&mut child_ctx)
        };

        if generators.len() < self.min_len {
            tracing::trace!(children = generators.len(), "running below parallel threshold");
            return generators.iter().zip(seeds.iter()).map(run).collect();
        }

        generators
            .par_iter()
            .zip(seeds.par_iter())
            .map(run)
            .collect::<Vec<String>>()
            .concat()
    }
}
