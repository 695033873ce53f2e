//! Toolchain recipes keyed by language tag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A command line with `{placeholder}` substitution.
///
/// The first element is the program; the rest are its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandTemplate(Vec<String>);

impl CommandTemplate {
    #[must_use]
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.first().is_none_or(|p| p.trim().is_empty())
    }

    /// Substitute placeholders and split into program and arguments.
    ///
    /// Returns `None` for an empty template.
    #[must_use]
    pub fn render(&self, vars: &TemplateVars) -> Option<(String, Vec<String>)> {
        let mut parts = self.0.iter().map(|part| vars.substitute(part));
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

/// Values substituted into [`CommandTemplate`] placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    /// `{source}`: path of the solution file.
    pub source: String,
    /// `{dir}`: directory containing the solution.
    pub dir: String,
    /// `{stem}`: solution file name without extension.
    pub stem: String,
    /// `{build}`: private scratch directory for this invocation.
    pub build: String,
    /// `{artifact}`: `{build}/{stem}`, the conventional compiled binary path.
    pub artifact: String,
}

impl TemplateVars {
    #[must_use]
    pub fn new(source: &Path, build: &Path) -> Self {
        let dir = source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source: source.display().to_string(),
            dir: dir.display().to_string(),
            artifact: build.join(&stem).display().to_string(),
            build: build.display().to_string(),
            stem,
        }
    }

    fn substitute(&self, part: &str) -> String {
        part.replace("{source}", &self.source)
            .replace("{dir}", &self.dir)
            .replace("{stem}", &self.stem)
            .replace("{build}", &self.build)
            .replace("{artifact}", &self.artifact)
    }
}

/// Compile and run steps for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageRuntime {
    /// Optional compile step; interpreted languages have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<CommandTemplate>,
    pub run: CommandTemplate,
    /// File extensions (without dot) used to infer this language.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

impl LanguageRuntime {
    fn interpreted(run: &[&str], extensions: &[&str]) -> Self {
        Self {
            compile: None,
            run: CommandTemplate::new(run.iter().copied()),
            extensions: extensions.iter().map(ToString::to_string).collect(),
        }
    }

    fn compiled(compile: &[&str], run: &[&str], extensions: &[&str]) -> Self {
        Self {
            compile: Some(CommandTemplate::new(compile.iter().copied())),
            ..Self::interpreted(run, extensions)
        }
    }
}

const ALIASES: &[(&str, &str)] = &[
    ("c++", "cpp"),
    ("cxx", "cpp"),
    ("cc", "cpp"),
    ("py", "python"),
    ("python3", "python"),
    ("js", "javascript"),
    ("node", "javascript"),
    ("nodejs", "javascript"),
    ("rs", "rust"),
    ("sh", "shell"),
    ("bash", "shell"),
];

/// Table of language recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchains {
    runtimes: BTreeMap<String, LanguageRuntime>,
}

impl Default for Toolchains {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Toolchains {
    /// The built-in recipe table.
    #[must_use]
    pub fn builtin() -> Self {
        let runtimes = [
            (
                "cpp",
                LanguageRuntime::compiled(
                    &["g++", "-O2", "-std=c++17", "-o", "{artifact}", "{source}"],
                    &["{artifact}"],
                    &["cpp", "cc", "cxx"],
                ),
            ),
            (
                "c",
                LanguageRuntime::compiled(
                    &["gcc", "-O2", "-o", "{artifact}", "{source}", "-lm"],
                    &["{artifact}"],
                    &["c"],
                ),
            ),
            (
                "java",
                LanguageRuntime::compiled(
                    &["javac", "-d", "{build}", "{source}"],
                    &["java", "-cp", "{build}", "{stem}"],
                    &["java"],
                ),
            ),
            (
                "rust",
                LanguageRuntime::compiled(
                    &["rustc", "-O", "-o", "{artifact}", "{source}"],
                    &["{artifact}"],
                    &["rs"],
                ),
            ),
            (
                "python",
                LanguageRuntime::interpreted(&["python3", "{source}"], &["py"]),
            ),
            (
                "javascript",
                LanguageRuntime::interpreted(&["node", "{source}"], &["js", "mjs", "cjs"]),
            ),
            (
                "shell",
                LanguageRuntime::interpreted(&["sh", "{source}"], &["sh"]),
            ),
        ];
        Self {
            runtimes: runtimes
                .into_iter()
                .map(|(tag, runtime)| (tag.to_string(), runtime))
                .collect(),
        }
    }

    /// Add or replace recipes. Keys are canonicalized, so `py` replaces `python`.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, LanguageRuntime>) -> Self {
        for (tag, runtime) in overrides {
            let tag = canonical_tag(tag);
            tracing::debug!(language = %tag, "using configured toolchain recipe");
            self.runtimes.insert(tag, runtime.clone());
        }
        self
    }

    /// Look up a recipe by tag or alias, case-insensitively.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<(&str, &LanguageRuntime)> {
        self.runtimes
            .get_key_value(&canonical_tag(tag))
            .map(|(tag, runtime)| (tag.as_str(), runtime))
    }

    /// Infer a language tag from a file extension.
    #[must_use]
    pub fn tag_for_path(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        self.runtimes
            .iter()
            .find(|(_, runtime)| runtime.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
            .map(|(tag, _)| tag.as_str())
    }

    /// Canonical tags with a recipe, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.runtimes.keys().map(String::as_str)
    }
}

/// Lowercase a tag and resolve known aliases.
#[must_use]
pub fn canonical_tag(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map_or(lower, |(_, canonical)| (*canonical).to_string())
}
