use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A display color: `#rrggbb` hex or a plain color name understood by
/// renderers (`red`, `magenta`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let is_hex = value.len() == 7
            && value.starts_with('#')
            && value[1..].chars().all(|c| c.is_ascii_hexdigit());
        let is_name = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic());
        if is_hex || is_name {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidColor(value.to_string()))
        }
    }

    /// Build from an RGB triple with channels in `[0, 1]`
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Result<Self> {
        let channel = |v: f64| -> Result<u8> {
            if (0.0..=1.0).contains(&v) {
                Ok((v * 255.0).round() as u8)
            } else {
                Err(Error::InvalidColor(format!("({r}, {g}, {b})")))
            }
        };
        Ok(Self(format!(
            "#{:02x}{:02x}{:02x}",
            channel(r)?,
            channel(g)?,
            channel(b)?
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outline colors for overriding and non-overriding nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeColors {
    #[serde(default = "NodeColors::default_color")]
    pub default: Color,
    #[serde(default = "NodeColors::override_color", rename = "override")]
    pub overridden: Color,
}

impl NodeColors {
    fn default_color() -> Color {
        Color("#000000".to_string())
    }

    fn override_color() -> Color {
        Color("#ff0000".to_string())
    }

    pub fn pick(&self, overrides: bool) -> Color {
        if overrides {
            self.overridden.clone()
        } else {
            self.default.clone()
        }
    }
}

impl Default for NodeColors {
    fn default() -> Self {
        Self {
            default: Self::default_color(),
            overridden: Self::override_color(),
        }
    }
}

/// One discovered type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// 1-based, assigned in discovery order
    pub id: usize,
    pub name: String,
    /// Identifier the provider knows the type by
    pub qualified_name: String,
    pub parent_id: Option<usize>,
    pub depth: usize,
    pub overrides_tracked_op: bool,
    pub color: Color,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_triples_become_hex() {
        assert_eq!(Color::from_rgb(0.0, 0.0, 0.0).unwrap().as_str(), "#000000");
        assert_eq!(Color::from_rgb(1.0, 1.0, 1.0).unwrap().as_str(), "#ffffff");
        assert_eq!(Color::from_rgb(0.5, 1.0, 1.0).unwrap().as_str(), "#80ffff");
        assert!(Color::from_rgb(1.5, 0.0, 0.0).is_err());
    }

    #[test]
    fn parse_accepts_hex_and_names() {
        assert_eq!(Color::parse("#FF0000").unwrap().as_str(), "#ff0000");
        assert_eq!(Color::parse("magenta").unwrap().as_str(), "magenta");
        assert!(matches!(Color::parse("100"), Err(Error::InvalidColor(_))));
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn colors_deserialize_from_strings() {
        let colors: NodeColors = toml::from_str("default = \"#00ff00\"").unwrap();
        assert_eq!(colors.default.as_str(), "#00ff00");
        assert_eq!(colors.overridden.as_str(), "#ff0000");
        assert!(toml::from_str::<NodeColors>("default = \"#zz\"").is_err());
    }
}
