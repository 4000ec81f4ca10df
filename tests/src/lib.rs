//! Properties of generators compiled from patterns, exercised across the
//! compiler and runtime crates.

#[cfg(test)]
mod error_reporting;
#[cfg(test)]
mod generation;

#[cfg(test)]
pub(crate) fn samples(
    pattern: &str,
    config: &regen_compiler::Config,
    seed: u64,
    cnt: usize,
) -> Vec<String> {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let generator = regen_compiler::compile_pattern(pattern, config)
        .unwrap_or_else(|e| panic!("failed to compile /{}/: {}", pattern, e));
    let mut rng = StdRng::seed_from_u64(seed);

    (0..cnt)
        .map(|_| generator.generate(&mut regen_runtime::Context::new(&mut rng)))
        .collect()
}
