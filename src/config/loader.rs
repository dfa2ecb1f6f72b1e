use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::InheritmapConfig;
use crate::errors::{Error, Result, ResultExt};

pub const CONFIG_FILE_NAME: &str = ".inheritmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse and validate config from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<InheritmapConfig> {
    let config = toml::from_str::<InheritmapConfig>(contents)
        .map_err(|e| Error::Configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}")))?;
    config.validate()?;
    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<InheritmapConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// `start` and its ancestors, nearest first, at most `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search the working directory and its ancestors for `.inheritmap.toml`
pub fn load_config() -> InheritmapConfig {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return InheritmapConfig::default();
        }
    };

    directory_ancestors(current, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            InheritmapConfig::default()
        })
}

/// Load an explicitly named config file; failures are errors, not warnings
pub fn load_config_from(path: &Path) -> Result<InheritmapConfig> {
    let context = path.display().to_string();
    let contents = read_config_file(path)
        .map_err(Error::from)
        .context(context.clone())?;
    parse_and_validate_config(&contents).context(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::SimilarityMethod;
    use indoc::indoc;

    #[test]
    fn parses_all_sections() {
        let config = parse_and_validate_config(indoc! {r##"
            [similarity]
            cutoff = 0.9
            method = "permute"

            [colors]
            override = "magenta"

            [hierarchy]
            exclude = ["Mixin", "pkg.Legacy"]
            max_depth = 2

            [modules]
            search_paths = ["manifests"]
        "##})
        .unwrap();
        assert_eq!(config.similarity.cutoff, 0.9);
        assert_eq!(config.similarity.method, SimilarityMethod::Permute);
        assert_eq!(config.colors.overridden.as_str(), "magenta");
        assert_eq!(config.colors.default.as_str(), "#000000");
        assert_eq!(config.hierarchy.exclude.len(), 2);
        assert_eq!(config.hierarchy.max_depth, Some(2));
        assert_eq!(config.modules.search_paths, vec![PathBuf::from("manifests")]);
    }

    #[test]
    fn rejects_unknown_method_and_bad_cutoff() {
        assert!(parse_and_validate_config("[similarity]\nmethod = \"badmethod\"").is_err());
        assert!(parse_and_validate_config("[similarity]\ncutoff = -0.1").is_err());
    }

    #[test]
    fn ancestors_are_bounded() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 3).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/a/b/c/d"),
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b"),
            ]
        );
    }

    #[test]
    fn explicit_path_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with(&path.display().to_string()));
        match err {
            Error::WithContext { source, .. } => assert!(matches!(*source, Error::Io(_))),
            other => panic!("unexpected error: {other}"),
        }

        fs::write(&path, "[similarity]\ncutoff = 0.5\n").unwrap();
        assert_eq!(load_config_from(&path).unwrap().similarity.cutoff, 0.5);

        fs::write(&path, "[similarity\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
        match err {
            Error::WithContext { source, .. } => {
                assert!(matches!(*source, Error::Configuration(_)))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(try_load_config_from_path(&path).is_none());
    }
}
