use crate::error::SandboxError;
use crate::sandbox::CaseOutput;

/// Prefix of the single stdout line that carries case results.
pub const RESULT_MARKER: &str = "__EVOLVE_RESULT__";

/// Turns candidate code into a runnable script for a [`SubprocessSandbox`].
///
/// The rendered script reads a JSON array of argument lists from stdin and
/// prints one line `RESULT_MARKER` + JSON array of [`CaseOutput`].
///
/// [`SubprocessSandbox`]: crate::SubprocessSandbox
pub trait ScriptHarness: Send + Sync {
    /// Interpreter to launch.
    fn program(&self) -> &str;

    /// Arguments placed before the script path.
    fn args(&self) -> Vec<String> {
        Vec::new()
    }

    fn file_name(&self) -> &str;

    fn render(&self, code: &str, entrypoint: &str) -> String;

    /// Extract case results from the script's stdout.
    fn parse_output(&self, stdout: &str) -> Result<Vec<CaseOutput>, SandboxError> {
        let line = stdout
            .lines()
            .rev()
            .find_map(|l| l.trim_end().strip_prefix(RESULT_MARKER))
            .ok_or(SandboxError::MissingResult)?;
        serde_json::from_str(line).map_err(|e| SandboxError::BadResult(e.to_string()))
    }
}

const PYTHON_DRIVER: &str = r#"

import json as __evolve_json
import sys as __evolve_sys
import time as __evolve_time


def __evolve_run():
    cases = __evolve_json.loads(__evolve_sys.stdin.read() or "[]")
    entry = globals().get("__ENTRYPOINT__")
    results = []
    for args in cases:
        start = __evolve_time.perf_counter()
        try:
            if entry is None:
                raise NameError("name '__ENTRYPOINT__' is not defined")
            output = entry(*args)
            results.append({"output": output, "error": None,
                            "elapsed": __evolve_time.perf_counter() - start})
        except Exception as exc:
            results.append({"output": None, "error": "%s: %s" % (type(exc).__name__, exc),
                            "elapsed": __evolve_time.perf_counter() - start})
    __evolve_sys.stdout.write("__MARKER__" + __evolve_json.dumps(results, default=repr) + "\n")
    __evolve_sys.stdout.flush()


__evolve_run()
"#;

/// Harness for Python candidates, run with an isolated interpreter.
#[derive(Clone, Debug)]
pub struct PythonHarness {
    interpreter: String,
}

impl PythonHarness {
    pub fn new() -> Self {
        Self {
            interpreter: "python3".to_string(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }
}

impl Default for PythonHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHarness for PythonHarness {
    fn program(&self) -> &str {
        &self.interpreter
    }

    fn args(&self) -> Vec<String> {
        // -I: ignore environment variables and user site-packages
        vec!["-I".to_string()]
    }

    fn file_name(&self) -> &str {
        "candidate.py"
    }

    fn render(&self, code: &str, entrypoint: &str) -> String {
        let driver = PYTHON_DRIVER
            .replace("__ENTRYPOINT__", entrypoint)
            .replace("__MARKER__", RESULT_MARKER);
        format!("{}\n{}", code.trim_end(), driver)
    }
}
