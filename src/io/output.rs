use crate::errors::Error;
use crate::explorer::InheritanceExplorer;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Dot,
    Json,
    Text,
}

impl OutputFormat {
    pub const VALID: &'static [&'static str] = &["dot", "gv", "json", "txt"];

    /// Format implied by the file extension, if it is one we render
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.to_ascii_lowercase().parse().ok())
    }

    /// Explicit format first, then the extension, then DOT
    pub fn resolve(explicit: Option<Self>, path: &Path) -> Self {
        explicit
            .or_else(|| Self::from_extension(path))
            .unwrap_or(Self::Dot)
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dot" | "gv" => Ok(Self::Dot),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Text),
            other => Err(Error::Configuration(format!(
                "Unknown output format '{other}', expected one of: {}",
                Self::VALID.join(", ")
            ))),
        }
    }
}

pub trait OutputWriter {
    fn write_explorer(&mut self, explorer: &InheritanceExplorer) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            OutputFormat::from_extension(Path::new("out.gv")),
            Some(OutputFormat::Dot)
        );
        assert_eq!(
            OutputFormat::from_extension(Path::new("out.JSON")),
            Some(OutputFormat::Json)
        );
        assert_eq!(OutputFormat::from_extension(Path::new("out.png")), None);
        assert_eq!(OutputFormat::from_extension(Path::new("out")), None);
    }

    #[test]
    fn explicit_format_wins_and_dot_is_fallback() {
        let path = PathBuf::from("graph.json");
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Text), &path),
            OutputFormat::Text
        );
        assert_eq!(OutputFormat::resolve(None, &path), OutputFormat::Json);
        assert_eq!(
            OutputFormat::resolve(None, Path::new("graph.svg")),
            OutputFormat::Dot
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = "svg".parse::<OutputFormat>().unwrap_err();
        assert!(err.to_string().contains("svg"));
    }
}
