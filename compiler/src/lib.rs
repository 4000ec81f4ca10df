//! Provides for the parsing and compilation of a regex pattern into a
//! generator that produces strings the pattern matches.
//!
//! # Example
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use regen_compiler::{compile_pattern, Config};
//! use regen_runtime::Context;
//!
//! // A pattern is parsed, simplified and compiled into a generator tree.
//! let generator = compile_pattern("id-[0-9]{4}", &Config::default())
//!     .expect("failed to parse or compile");
//!
//! // The random source is supplied per invocation so one compiled tree
//! // serves any number of seeded runs.
//! let mut rng = StdRng::seed_from_u64(42);
//! let sample = generator.generate(&mut Context::new(&mut rng));
//!
//! assert!(sample.starts_with("id-"));
//! assert!(sample[3..].chars().all(|c| c.is_ascii_digit()));
//! ```

pub mod compiler;
pub mod parser;
mod simplify;
pub mod syntax;

pub use compiler::{compile, CompileError, Config};
pub use parser::{parse, ParseErr};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseErr),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Parses and compiles `pattern` in one step.
pub fn compile_pattern(
    pattern: &str,
    config: &Config,
) -> Result<regen_runtime::Generator, Error> {
    let regexp = parse(pattern)?;
    let generator = compile(&regexp, config)?;

    Ok(generator)
}
