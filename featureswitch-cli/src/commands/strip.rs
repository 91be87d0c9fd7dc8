//! Strip command
//!
//! Removes the blocks of disabled features from files and directory trees.

use super::load_raw;
use crate::error::{CliError, CliResult};
use colored::Colorize;
use featureswitch_config::load_strip_options;
use featureswitch_core::as_features;
use featureswitch_strip::{Dialect, StripOptions, Stripper};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extensions processed when walking directories unless `--ext` is given.
pub fn default_extensions() -> Vec<String> {
    [
        "js", "jsx", "mjs", "cjs", "ts", "tsx", "css", "scss", "less", "html", "htm", "vue",
        "svelte", "rs",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Resolved strip arguments
pub struct StripCommand {
    pub features: PathBuf,
    pub options: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub out_dir: Option<PathBuf>,
    pub in_place: bool,
    pub disable: Vec<Dialect>,
    pub replace: Option<String>,
    pub env_prefix: Option<String>,
    pub paths: Vec<PathBuf>,
    pub quiet: bool,
}

/// A file to process and its path relative to the output root
#[derive(Debug, PartialEq)]
struct SourceFile {
    path: PathBuf,
    relative: PathBuf,
}

enum Output<'a> {
    Stdout,
    InPlace,
    Directory(&'a Path),
}

pub fn run(command: StripCommand) -> CliResult<()> {
    let features = as_features(&load_raw(&command.features, command.env_prefix.as_deref())?);
    let options = resolve_options(&command)?;
    let stripper = Stripper::new(&features, &options)?;

    let sources = collect_sources(&command.paths, &command.extensions)?;
    let output = match (&command.out_dir, command.in_place) {
        (Some(dir), _) => {
            check_distinct_targets(&sources)?;
            Output::Directory(dir)
        }
        (None, true) => Output::InPlace,
        (None, false) => {
            if sources.len() != 1 || command.paths.iter().any(|p| p.is_dir()) {
                return Err(CliError::InvalidArgument(
                    "--out-dir or --in-place is required when stripping directories or multiple files"
                        .to_string(),
                ));
            }
            Output::Stdout
        }
    };

    let mut changed = 0;
    for source in &sources {
        let content = fs::read_to_string(&source.path)?;
        let stripped = stripper.strip(&content);
        if stripped != content {
            changed += 1;
            info!(path = %source.path.display(), "stripped disabled features");
        }

        match output {
            Output::Stdout => {
                io::stdout().write_all(stripped.as_bytes())?;
            }
            Output::InPlace => {
                if stripped != content {
                    fs::write(&source.path, stripped)?;
                }
            }
            Output::Directory(dir) => {
                let target = dir.join(&source.relative);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, stripped)?;
                debug!(target = %target.display(), "wrote output");
            }
        }
    }

    if !command.quiet && !matches!(output, Output::Stdout) {
        println!(
            "  {} Processed {} file(s), {} changed",
            "✓".green().bold(),
            sources.len(),
            changed
        );
    }

    Ok(())
}

fn resolve_options(command: &StripCommand) -> CliResult<StripOptions> {
    let mut options = match &command.options {
        Some(path) => load_strip_options(path)?,
        None => StripOptions::default(),
    };

    if let Some(template) = &command.replace {
        options = options.replace_all(template.clone());
    }
    for dialect in &command.disable {
        options = options.disable(*dialect);
    }

    Ok(options)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Expand `paths` into files. Explicit files are always included; directory
/// entries are filtered by extension.
fn collect_sources(paths: &[PathBuf], extensions: &[String]) -> CliResult<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(path)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                sources.push(SourceFile {
                    path: entry.path().to_path_buf(),
                    relative,
                });
            }
        } else if path.is_file() {
            let relative = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.clone());
            sources.push(SourceFile {
                path: path.clone(),
                relative,
            });
        } else {
            return Err(CliError::InvalidArgument(format!(
                "No such file or directory: {}",
                path.display()
            )));
        }
    }

    Ok(sources)
}

/// Fail if two inputs would be written to the same file under `--out-dir`.
fn check_distinct_targets(sources: &[SourceFile]) -> CliResult<()> {
    let mut targets: HashMap<&Path, &Path> = HashMap::new();

    for source in sources {
        if let Some(previous) = targets.insert(&source.relative, &source.path) {
            return Err(CliError::InvalidArgument(format!(
                "{} and {} would both be written to {}",
                previous.display(),
                source.path.display(),
                source.relative.display()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_has_extension() {
        let extensions = vec!["js".to_string(), "css".to_string()];

        assert!(has_extension(Path::new("app.js"), &extensions));
        assert!(has_extension(Path::new("style.CSS"), &extensions));
        assert!(!has_extension(Path::new("index.html"), &extensions));
        assert!(!has_extension(Path::new("Makefile"), &extensions));
    }

    #[test]
    fn test_collect_sources_filters_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("app.js"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("nested/style.css"), "").unwrap();

        let extensions = vec!["js".to_string(), "css".to_string()];
        let sources = collect_sources(&[dir.path().to_path_buf()], &extensions).unwrap();

        let relative: Vec<_> = sources.iter().map(|s| s.relative.clone()).collect();
        assert_eq!(
            relative,
            vec![PathBuf::from("app.js"), PathBuf::from("nested/style.css")]
        );
    }

    #[test]
    fn test_collect_sources_keeps_explicit_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "").unwrap();

        let sources = collect_sources(std::slice::from_ref(&file), &[]).unwrap();
        assert_eq!(
            sources,
            vec![SourceFile {
                path: file,
                relative: PathBuf::from("notes.txt"),
            }]
        );
    }

    #[test]
    fn test_check_distinct_targets() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a/app.js"), "").unwrap();
        fs::write(dir.path().join("b/app.js"), "").unwrap();
        fs::write(dir.path().join("b/other.js"), "").unwrap();

        let distinct = collect_sources(
            &[dir.path().join("a/app.js"), dir.path().join("b/other.js")],
            &[],
        )
        .unwrap();
        assert!(check_distinct_targets(&distinct).is_ok());

        let colliding = collect_sources(
            &[dir.path().join("a/app.js"), dir.path().join("b/app.js")],
            &[],
        )
        .unwrap();
        match check_distinct_targets(&colliding) {
            Err(CliError::InvalidArgument(message)) => {
                assert!(message.contains("a/app.js"));
                assert!(message.contains("b/app.js"));
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_sources_missing_path() {
        let result = collect_sources(&[PathBuf::from("/nonexistent/src")], &[]);
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_resolve_options_applies_flags() {
        let command = StripCommand {
            features: PathBuf::from("features.json"),
            options: None,
            extensions: default_extensions(),
            out_dir: None,
            in_place: false,
            disable: vec![Dialect::StarComments],
            replace: Some("gone".to_string()),
            env_prefix: None,
            paths: vec![],
            quiet: true,
        };

        let options = resolve_options(&command).unwrap();
        assert!(!options.star_comments.enabled);
        assert!(options.slash_comments.enabled);
        assert_eq!(options.slash_comments.replace, "gone");
    }
}
