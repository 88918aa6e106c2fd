//! Offline proposer for running the demo without a model API key.
//!
//! Serves a fixed rotation of patches against the `fib` task: partial
//! fixes, full implementations, a repair for the partial fix, and a
//! malformed reply. Patches that do not fit the sampled parent are
//! filtered by the controller like any other no-op.

use maple_evolve_engine::ScriptedProposer;

pub const FIB_TASK: &str = "Implement fib(n) so that it returns the n-th Fibonacci number, \
with fib(1) = 1, fib(2) = 1 and fib(n) = fib(n - 1) + fib(n - 2).";

pub const FIB_SEED: &str = "def fib(n):\n    pass\n";

const CATALOG: &[&str] = &[
    "<<<<<<< SEARCH\n    pass\n=======\n    return 1\n>>>>>>> REPLACE",
    "<<<<<<< SEARCH\n    pass\n=======\n    a, b = 0, 1\n    for _ in range(n):\n        a, b = b, a + b\n    return a\n>>>>>>> REPLACE",
    "<<<<<<< SEARCH\n    return 1\n=======\n    return 1 if n < 3 else fib(n - 1) + fib(n - 2)\n>>>>>>> REPLACE",
    "I would rewrite the whole function using memoization.",
    "<<<<<<< SEARCH\n    pass\n=======\n    if n < 2:\n        return n\n    return fib(n - 1) + fib(n - 2)\n>>>>>>> REPLACE",
];

pub fn catalog_proposer() -> ScriptedProposer {
    ScriptedProposer::from_fn(|call, _parent, _inspirations| Ok(CATALOG[call % CATALOG.len()].to_string()))
}
