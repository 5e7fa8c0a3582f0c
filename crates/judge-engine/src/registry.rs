//! The read-only language profile table. Unknown tags are a lookup miss,
//! not a panic; `JobExecutor` turns that into `UnsupportedLanguage`.

use std::collections::HashMap;
use std::path::Path;

use judge_core::model::LanguageProfile;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read language profile file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse language profile file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    languages: HashMap<String, LanguageProfile>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    profiles: HashMap<String, LanguageProfile>,
}

impl Registry {
    pub fn get(&self, language: &str) -> Option<&LanguageProfile> {
        self.profiles.get(language)
    }

    /// Merges a TOML override file on top of the built-in defaults; entries
    /// in the file replace same-named built-ins, new tags are added.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let parsed: ProfileFile = toml::from_str(&contents).map_err(|source| RegistryError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        registry.profiles.extend(parsed.languages);
        Ok(registry)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut profiles = HashMap::new();

        profiles.insert(
            "python".to_string(),
            LanguageProfile {
                image: "python:3.12-slim".to_string(),
                file_extension: "py".to_string(),
                solution_filename: "solution.py".to_string(),
                test_filename: "test.py".to_string(),
                compile_argv: None,
                run_argv: vec!["python3".to_string()],
                run_target: "test.py".to_string(),
                memory_limit_mi_b: 256,
                cpu_limit_cores: 1.0,
                timeout_millis: 5_000,
            },
        );

        profiles.insert(
            "javascript".to_string(),
            LanguageProfile {
                image: "node:20-slim".to_string(),
                file_extension: "js".to_string(),
                solution_filename: "solution.js".to_string(),
                test_filename: "test.js".to_string(),
                compile_argv: None,
                run_argv: vec!["node".to_string()],
                run_target: "test.js".to_string(),
                memory_limit_mi_b: 256,
                cpu_limit_cores: 1.0,
                timeout_millis: 5_000,
            },
        );

        profiles.insert(
            "java".to_string(),
            LanguageProfile {
                image: "eclipse-temurin:21-jdk".to_string(),
                file_extension: "java".to_string(),
                solution_filename: "Solution.java".to_string(),
                test_filename: "TestRunner.java".to_string(),
                compile_argv: Some(vec![
                    "javac".to_string(),
                    "Solution.java".to_string(),
                    "TestRunner.java".to_string(),
                ]),
                run_argv: vec!["java".to_string()],
                run_target: "TestRunner".to_string(),
                memory_limit_mi_b: 512,
                cpu_limit_cores: 1.0,
                timeout_millis: 10_000,
            },
        );

        profiles.insert(
            "cpp".to_string(),
            LanguageProfile {
                image: "gcc:13".to_string(),
                file_extension: "cpp".to_string(),
                solution_filename: "solution.cpp".to_string(),
                test_filename: "test.cpp".to_string(),
                compile_argv: Some(vec![
                    "g++".to_string(),
                    "-O2".to_string(),
                    "-o".to_string(),
                    "test".to_string(),
                    "test.cpp".to_string(),
                ]),
                run_argv: vec![],
                run_target: "./test".to_string(),
                memory_limit_mi_b: 256,
                cpu_limit_cores: 1.0,
                timeout_millis: 5_000,
            },
        );

        profiles.insert(
            "go".to_string(),
            LanguageProfile {
                image: "golang:1.22".to_string(),
                file_extension: "go".to_string(),
                solution_filename: "solution.go".to_string(),
                test_filename: "test.go".to_string(),
                compile_argv: Some(vec![
                    "go".to_string(),
                    "build".to_string(),
                    "-o".to_string(),
                    "test_bin".to_string(),
                    "test.go".to_string(),
                    "solution.go".to_string(),
                ]),
                run_argv: vec![],
                run_target: "./test_bin".to_string(),
                memory_limit_mi_b: 256,
                cpu_limit_cores: 1.0,
                timeout_millis: 5_000,
            },
        );

        Self { profiles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[yare::parameterized(
        python = { "python", "python:3.12-slim" },
        javascript = { "javascript", "node:20-slim" },
        java = { "java", "eclipse-temurin:21-jdk" },
        cpp = { "cpp", "gcc:13" },
        go = { "go", "golang:1.22" },
    )]
    fn default_registry_has_expected_image(language: &str, expected_image: &str) {
        let registry = Registry::default();
        let profile = registry.get(language).unwrap_or_else(|| panic!("missing {language}"));
        assert_eq!(profile.image, expected_image);
    }

    #[test]
    fn unknown_language_is_a_lookup_miss() {
        let registry = Registry::default();
        assert!(registry.get("ruby").is_none());
    }
}
