use std::sync::Arc;

use regen_runtime::{Executor, Generator, RangeSet, SequentialExecutor};

use crate::syntax::{Op, Regexp, MAX_REPEAT};

/// Options applied to every node of a compiled tree.
#[derive(Debug, Clone)]
pub struct Config {
    executor: Arc<dyn Executor>,
    max_unbounded_repeat: u32,
}

impl Config {
    /// The repetition count substituted for an open upper bound.
    pub const DEFAULT_MAX_UNBOUNDED_REPEAT: u32 = 4096;

    #[must_use]
    pub fn new() -> Self {
        Self {
            executor: Arc::new(SequentialExecutor),
            max_unbounded_repeat: Self::DEFAULT_MAX_UNBOUNDED_REPEAT,
        }
    }

    /// Sets the strategy concatenations and repetitions invoke their
    /// children with.
    #[must_use]
    pub fn with_executor<E: Executor + 'static>(self, executor: E) -> Self {
        Self {
            executor: Arc::new(executor),
            ..self
        }
    }

    /// Sets the upper bound used for `*`, `+` and `{n,}`. A repetition whose
    /// minimum exceeds it is fixed at its minimum.
    #[must_use]
    pub fn with_max_unbounded_repeat(self, max_unbounded_repeat: u32) -> Self {
        Self {
            max_unbounded_repeat,
            ..self
        }
    }

    pub fn executor(&self) -> Arc<dyn Executor> {
        self.executor.clone()
    }

    pub fn max_unbounded_repeat(&self) -> u32 {
        self.max_unbounded_repeat
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The simplified tree contains an operator with no generation rule.
    #[error("invalid generator pattern: /{original}/ as /{simplified}/\n{dump}")]
    UnsupportedPattern {
        original: String,
        simplified: String,
        dump: String,
    },
    #[error("malformed {op} node in /{pattern}/: {reason}")]
    MalformedPattern {
        op: Op,
        reason: String,
        pattern: String,
    },
    #[error("in /{pattern}/: {source}")]
    Subexpression {
        pattern: String,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Returns the innermost error, unwrapping any subexpression context.
    pub fn root_cause(&self) -> &CompileError {
        match self {
            CompileError::Subexpression { source, .. } => source.root_cause(),
            other => other,
        }
    }

    fn subexpression(pattern: &str, source: CompileError) -> Self {
        CompileError::Subexpression {
            pattern: pattern.to_string(),
            source: Box::new(source),
        }
    }
}

/// Compiles a syntax tree into a generator.
///
/// The tree is simplified first, so the result depends only on the
/// simplified form. Each generator is named after the pattern text of the
/// node it was built from.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use regen_compiler::syntax::Regexp;
/// use regen_compiler::{compile, Config};
/// use regen_runtime::Context;
///
/// let regexp = Regexp::concat(vec![
///     Regexp::literal("a"),
///     Regexp::alternate(vec![Regexp::literal("b"), Regexp::literal("c")]),
/// ]);
/// let generator = compile(&regexp, &Config::default()).unwrap();
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let sample = generator.generate(&mut Context::new(&mut rng));
///
/// assert!(sample == "ab" || sample == "ac");
/// ```
pub fn compile(regexp: &Regexp, config: &Config) -> Result<Generator, CompileError> {
    compile_node(regexp, &regexp.simplify(), config)
}

/// Compiles an already simplified node. `original` is only used for
/// diagnostics.
fn compile_node(
    original: &Regexp,
    regexp: &Regexp,
    config: &Config,
) -> Result<Generator, CompileError> {
    let name = regexp.to_string();
    tracing::debug!(op = %regexp.op, pattern = %name, "compiling node");

    match regexp.op {
        // assertions constrain position only and produce nothing.
        Op::EmptyMatch
        | Op::BeginLine
        | Op::EndLine
        | Op::BeginText
        | Op::EndText
        | Op::WordBoundary
        | Op::NoWordBoundary => Ok(Generator::empty(name)),

        Op::Literal => {
            let text: String = regexp.runes.iter().collect();
            Ok(Generator::literal(name, text))
        }

        Op::AnyChar => Ok(Generator::class(name, RangeSet::any())),
        Op::AnyCharNotNL => Ok(Generator::class(name, RangeSet::any_except_newline())),
        Op::CharClass => {
            let set = RangeSet::new(regexp.ranges.iter().copied());
            if set.is_empty() {
                return Err(unsupported(original, regexp));
            }

            Ok(Generator::class(name, set))
        }

        Op::Capture => {
            let sub = single_sub(regexp)?;
            compile_node(sub, sub, config).map_err(|err| CompileError::subexpression(&name, err))
        }

        Op::Star => repeat(regexp, name, 0, -1, config),
        Op::Plus => repeat(regexp, name, 1, -1, config),
        Op::Quest => repeat(regexp, name, 0, 1, config),
        Op::Repeat => repeat(regexp, name, regexp.min, regexp.max, config),

        Op::Concat => {
            let generators = compile_subs(regexp, &name, config)?;
            Ok(Generator::concat(name, generators, config.executor()))
        }
        Op::Alternate => {
            if regexp.sub.is_empty() {
                return Err(malformed(regexp, "alternation has no alternatives"));
            }

            let generators = compile_subs(regexp, &name, config)?;
            Ok(Generator::alternate(name, generators))
        }

        Op::NoMatch | Op::Backreference | Op::PreviousMatchEnd | Op::UnicodeClass => {
            Err(unsupported(original, regexp))
        }
    }
}

fn compile_subs(
    regexp: &Regexp,
    name: &str,
    config: &Config,
) -> Result<Vec<Generator>, CompileError> {
    regexp
        .sub
        .iter()
        .map(|sub| {
            compile_node(sub, sub, config).map_err(|err| CompileError::subexpression(name, err))
        })
        .collect()
}

fn repeat(
    regexp: &Regexp,
    name: String,
    min: i32,
    max: i32,
    config: &Config,
) -> Result<Generator, CompileError> {
    let sub = single_sub(regexp)?;

    if min > MAX_REPEAT || max > MAX_REPEAT {
        return Err(malformed(
            regexp,
            &format!("repetition count exceeds the maximum of {}", MAX_REPEAT),
        ));
    }

    let min = u32::try_from(min).map_err(|_| {
        malformed(
            regexp,
            &format!("minimum repetition count {} is negative", min),
        )
    })?;
    let max = match u32::try_from(max) {
        // an open upper bound.
        Err(_) => config.max_unbounded_repeat().max(min),
        Ok(max) if max < min => {
            return Err(malformed(
                regexp,
                &format!("maximum repetition count {} is below minimum {}", max, min),
            ));
        }
        Ok(max) => max,
    };

    let generator =
        compile_node(sub, sub, config).map_err(|err| CompileError::subexpression(&name, err))?;

    tracing::trace!(pattern = %name, min, max, "bounded repetition");
    Ok(Generator::repeat(name, min..=max, generator, config.executor()))
}

fn single_sub(regexp: &Regexp) -> Result<&Regexp, CompileError> {
    match regexp.sub.as_slice() {
        [sub] => Ok(sub),
        subs => Err(malformed(
            regexp,
            &format!("expected 1 sub-expression, found {}", subs.len()),
        )),
    }
}

fn malformed(regexp: &Regexp, reason: &str) -> CompileError {
    CompileError::MalformedPattern {
        op: regexp.op,
        reason: reason.to_string(),
        pattern: regexp.to_string(),
    }
}

fn unsupported(original: &Regexp, simplified: &Regexp) -> CompileError {
    CompileError::UnsupportedPattern {
        original: original.to_string(),
        simplified: simplified.to_string(),
        dump: simplified.inspect(),
    }
}
