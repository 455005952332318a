//! The program's own source, bundled at compile time.
//!
//! A compiled binary cannot read itself back as source, so every file that
//! makes up the program is embedded here and shipped inside the prompt.

/// One bundled source file.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile {
    /// Path relative to the crate root
    pub path: &'static str,
    pub text: &'static str,
}

macro_rules! bundle {
    ($($path:literal => $file:literal),* $(,)?) => {
        &[$(SourceFile { path: $path, text: include_str!($file) }),*]
    };
}

pub const PROGRAM_SOURCE: &[SourceFile] = bundle![
    "Cargo.toml" => "../../Cargo.toml",
    "src/main.rs" => "../main.rs",
    "src/lib.rs" => "../lib.rs",
    "src/config.rs" => "../config.rs",
    "src/error.rs" => "../error.rs",
    "src/llm/mod.rs" => "../llm/mod.rs",
    "src/llm/types.rs" => "../llm/types.rs",
    "src/llm/anthropic.rs" => "../llm/anthropic.rs",
    "src/tools/mod.rs" => "../tools/mod.rs",
    "src/tools/ruby_eval.rs" => "../tools/ruby_eval.rs",
    "src/agent/mod.rs" => "mod.rs",
    "src/agent/prompt.rs" => "prompt.rs",
    "src/agent/runner.rs" => "runner.rs",
    "src/agent/source.rs" => "source.rs",
];

/// Render every bundled file as a path heading followed by a fenced block.
pub fn render_program_source() -> String {
    PROGRAM_SOURCE
        .iter()
        .map(|file| {
            let lang = if file.path.ends_with(".toml") { "toml" } else { "rust" };
            let newline = if file.text.ends_with('\n') { "" } else { "\n" };
            format!("### {}\n\n```{}\n{}{}```", file.path, lang, file.text, newline)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
