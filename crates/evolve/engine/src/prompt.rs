use maple_evolve_patch::{REPLACE_MARKER, SEARCH_MARKER, SEPARATOR};
use maple_evolve_types::{ProgramRecord, ScoreMap};
use std::fmt::Write;

const PREAMBLE: &str = "You are an expert programmer evolving code to solve a problem.\n\
Suggest a modification to the current program that improves its evaluation scores.\n\
Treat the inspiration programs as a source of ideas, not as code to copy.\n";

/// Renders the proposal prompt for a parent and its inspirations.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    language: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            language: "python".to_string(),
        }
    }

    /// Language tag used for code fences and the syntax instruction.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn build(
        &self,
        task: Option<&str>,
        parent: &ProgramRecord,
        inspirations: &[ProgramRecord],
    ) -> String {
        let mut prompt = String::from(PREAMBLE);
        if let Some(task) = task.map(str::trim).filter(|t| !t.is_empty()) {
            let _ = writeln!(prompt, "\nTask:\n{}", task);
        }

        let _ = writeln!(prompt, "\nCurrent program:");
        self.push_program(&mut prompt, &parent.code);
        let _ = writeln!(prompt, "Current program's evaluation scores:");
        push_scores(&mut prompt, &parent.score);

        if !inspirations.is_empty() {
            let _ = writeln!(prompt, "\nInspiration programs:");
            for (i, inspiration) in inspirations.iter().enumerate() {
                let _ = writeln!(prompt, "\nInspiration {}:", i + 1);
                self.push_program(&mut prompt, &inspiration.code);
                let _ = writeln!(prompt, "Scores:");
                push_scores(&mut prompt, &inspiration.score);
            }
        }

        self.push_instructions(&mut prompt);
        prompt
    }

    fn push_program(&self, prompt: &mut String, code: &str) {
        let _ = writeln!(prompt, "```{}\n{}\n```", self.language, code.trim_end());
    }

    fn push_instructions(&self, prompt: &mut String) {
        let _ = writeln!(
            prompt,
            "\nReply with exactly one change in this format:\n\
             {SEARCH_MARKER}\n\
             <lines copied verbatim from the current program>\n\
             {SEPARATOR}\n\
             <the lines that replace them>\n\
             {REPLACE_MARKER}\n"
        );
        let _ = writeln!(
            prompt,
            "The SEARCH block must match the current program exactly. To insert code, \
             search for an adjacent line and repeat it in the REPLACE block. To delete \
             code, leave the REPLACE block empty. The result must be valid {} code. \
             Reply with the change block only, without commentary or code fences.\n",
            self.language
        );
        let _ = writeln!(
            prompt,
            "Example: to change `return x * 2` to `return x * 3` in\n\
             ```{lang}\ndef my_func(x):\n    return x * 2\n```\n\
             reply with\n\
             {SEARCH_MARKER}\n    return x * 2\n{SEPARATOR}\n    return x * 3\n{REPLACE_MARKER}",
            lang = self.language
        );
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn push_scores(prompt: &mut String, score: &ScoreMap) {
    if score.is_empty() {
        let _ = writeln!(prompt, "- (not evaluated)");
    }
    for (name, value) in score.iter() {
        let _ = writeln!(prompt, "- {}: {}", name, value);
    }
    if let Some(logs) = score.logs.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        let _ = writeln!(prompt, "Evaluation logs:\n{}", logs);
    }
}
