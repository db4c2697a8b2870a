//! Language-specific compilation and execution commands

use crate::{
    constants::{container_images, languages},
    error::{AppError, AppResult},
};

/// Language handler for compilation and execution
#[derive(Debug, Clone)]
pub struct LanguageHandler {
    image: &'static str,
    source_extension: &'static str,
    compile_command: Option<&'static str>,
    run_command: &'static str,
}

impl LanguageHandler {
    /// Get handler for a specific language
    pub fn for_language(language: &str) -> AppResult<Self> {
        match language {
            languages::C => Ok(Self {
                image: container_images::C,
                source_extension: "c",
                compile_command: Some("gcc -O2 -o /workspace/solution /workspace/solution.c"),
                run_command: "/workspace/solution",
            }),
            languages::CPP => Ok(Self {
                image: container_images::CPP,
                source_extension: "cpp",
                compile_command: Some(
                    "g++ -O2 -std=c++20 -o /workspace/solution /workspace/solution.cpp",
                ),
                run_command: "/workspace/solution",
            }),
            languages::RUST => Ok(Self {
                image: container_images::RUST,
                source_extension: "rs",
                compile_command: Some("rustc -O -o /workspace/solution /workspace/solution.rs"),
                run_command: "/workspace/solution",
            }),
            languages::PYTHON => Ok(Self {
                image: container_images::PYTHON,
                source_extension: "py",
                compile_command: None,
                run_command: "python3 /workspace/solution.py",
            }),
            _ => Err(AppError::Validation(format!(
                "Unsupported language: {language}"
            ))),
        }
    }

    /// Docker image to run this language in
    pub fn image(&self) -> &'static str {
        self.image
    }

    /// Source file name inside the container workspace
    pub fn source_file(&self) -> String {
        format!("solution.{}", self.source_extension)
    }

    /// Compile command, if the language needs one
    pub fn compile_command(&self) -> Option<&'static str> {
        self.compile_command
    }

    /// Run command
    pub fn run_command(&self) -> &'static str {
        self.run_command
    }
}
