//! Stripping options
//!
//! Each comment dialect can be switched off or given its own replacement
//! template. Options deserialize from partial documents: any field left out
//! keeps its default.

use crate::error::{Result, StripError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted with the feature name in replacement templates.
pub const FEATURE_PLACEHOLDER: &str = "${FEATURE}";

/// Syntactic forms a feature block can take in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `<!-- FEATURE.start(name) -->` ... `<!-- FEATURE.end(name) -->`
    HtmlComments,
    /// `<name ...>` ... `</name>`
    HtmlElements,
    /// `<tag feature-name="name" ...>` ... `</tag>`
    HtmlAttributes,
    /// `/* FEATURE.start(name) */` ... `/* FEATURE.end(name) */`
    StarComments,
    /// `// FEATURE.start(name)` ... `// FEATURE.end(name)`
    SlashComments,
}

impl Dialect {
    /// All dialects, in the order they are applied to each feature.
    pub const ALL: [Dialect; 5] = [
        Dialect::HtmlComments,
        Dialect::HtmlElements,
        Dialect::HtmlAttributes,
        Dialect::StarComments,
        Dialect::SlashComments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::HtmlComments => "html_comments",
            Dialect::HtmlElements => "html_elements",
            Dialect::HtmlAttributes => "html_attributes",
            Dialect::StarComments => "star_comments",
            Dialect::SlashComments => "slash_comments",
        }
    }

    /// Replacement template used when none is configured.
    pub fn default_template(&self) -> &'static str {
        match self {
            Dialect::StarComments => "/* Feature [${FEATURE}] DISABLED */",
            Dialect::SlashComments => "// Feature [${FEATURE}] DISABLED //",
            Dialect::HtmlComments | Dialect::HtmlElements | Dialect::HtmlAttributes => {
                "<!-- Feature [${FEATURE}] DISABLED -->"
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = StripError;

    /// Accepts snake_case, kebab-case and camelCase spellings.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "htmlcomments" => Ok(Dialect::HtmlComments),
            "htmlelements" => Ok(Dialect::HtmlElements),
            "htmlattributes" => Ok(Dialect::HtmlAttributes),
            "starcomments" => Ok(Dialect::StarComments),
            "slashcomments" => Ok(Dialect::SlashComments),
            _ => Err(StripError::UnknownDialect(s.to_string())),
        }
    }
}

/// Settings for one dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectOptions {
    pub enabled: bool,

    /// Template that replaces a matched block; `${FEATURE}` becomes the name
    pub replace: String,
}

impl DialectOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            enabled: true,
            replace: dialect.default_template().to_string(),
        }
    }

    /// Render the replacement text for `feature`.
    pub fn replacement(&self, feature: &str) -> String {
        self.replace.replace(FEATURE_PLACEHOLDER, feature)
    }
}

/// Per-dialect options for the stripping tool.
///
/// # Examples
///
/// ```
/// use featureswitch_strip::{Dialect, StripOptions};
///
/// let options: StripOptions = serde_json::from_str(
///     r#"{"starComments": {"replace": "/* gone */"}, "slash_comments": {"enabled": false}}"#,
/// ).unwrap();
///
/// assert_eq!(options.dialect(Dialect::StarComments).replace, "/* gone */");
/// assert!(options.dialect(Dialect::StarComments).enabled);
/// assert!(!options.dialect(Dialect::SlashComments).enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PartialStripOptions")]
pub struct StripOptions {
    pub html_comments: DialectOptions,
    pub html_elements: DialectOptions,
    pub html_attributes: DialectOptions,
    pub star_comments: DialectOptions,
    pub slash_comments: DialectOptions,
}

impl StripOptions {
    pub fn dialect(&self, dialect: Dialect) -> &DialectOptions {
        match dialect {
            Dialect::HtmlComments => &self.html_comments,
            Dialect::HtmlElements => &self.html_elements,
            Dialect::HtmlAttributes => &self.html_attributes,
            Dialect::StarComments => &self.star_comments,
            Dialect::SlashComments => &self.slash_comments,
        }
    }

    pub fn dialect_mut(&mut self, dialect: Dialect) -> &mut DialectOptions {
        match dialect {
            Dialect::HtmlComments => &mut self.html_comments,
            Dialect::HtmlElements => &mut self.html_elements,
            Dialect::HtmlAttributes => &mut self.html_attributes,
            Dialect::StarComments => &mut self.star_comments,
            Dialect::SlashComments => &mut self.slash_comments,
        }
    }

    /// Switch a dialect off.
    pub fn disable(mut self, dialect: Dialect) -> Self {
        self.dialect_mut(dialect).enabled = false;
        self
    }

    /// Use the same replacement template for every dialect.
    pub fn replace_all(mut self, template: impl Into<String>) -> Self {
        let template = template.into();
        for dialect in Dialect::ALL {
            self.dialect_mut(dialect).replace = template.clone();
        }
        self
    }

    /// Dialects that are switched on, in application order.
    pub fn enabled_dialects(&self) -> impl Iterator<Item = Dialect> + '_ {
        Dialect::ALL
            .into_iter()
            .filter(|dialect| self.dialect(*dialect).enabled)
    }

    /// Apply a partial document on top of these options.
    pub fn merge(&mut self, partial: PartialStripOptions) {
        let PartialStripOptions {
            html_comments,
            html_elements,
            html_attributes,
            star_comments,
            slash_comments,
        } = partial;

        for (dialect, overrides) in [
            (Dialect::HtmlComments, html_comments),
            (Dialect::HtmlElements, html_elements),
            (Dialect::HtmlAttributes, html_attributes),
            (Dialect::StarComments, star_comments),
            (Dialect::SlashComments, slash_comments),
        ] {
            let Some(overrides) = overrides else {
                continue;
            };
            let target = self.dialect_mut(dialect);
            if let Some(enabled) = overrides.enabled {
                target.enabled = enabled;
            }
            if let Some(replace) = overrides.replace {
                target.replace = replace;
            }
        }
    }
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            html_comments: DialectOptions::new(Dialect::HtmlComments),
            html_elements: DialectOptions::new(Dialect::HtmlElements),
            html_attributes: DialectOptions::new(Dialect::HtmlAttributes),
            star_comments: DialectOptions::new(Dialect::StarComments),
            slash_comments: DialectOptions::new(Dialect::SlashComments),
        }
    }
}

/// Options document where every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PartialStripOptions {
    #[serde(alias = "htmlComments")]
    pub html_comments: Option<PartialDialectOptions>,
    #[serde(alias = "htmlElements")]
    pub html_elements: Option<PartialDialectOptions>,
    #[serde(alias = "htmlAttributes")]
    pub html_attributes: Option<PartialDialectOptions>,
    #[serde(alias = "starComments")]
    pub star_comments: Option<PartialDialectOptions>,
    #[serde(alias = "slashComments")]
    pub slash_comments: Option<PartialDialectOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PartialDialectOptions {
    pub enabled: Option<bool>,
    pub replace: Option<String>,
}

impl From<PartialStripOptions> for StripOptions {
    fn from(partial: PartialStripOptions) -> Self {
        let mut options = StripOptions::default();
        options.merge(partial);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StripOptions::default();

        for dialect in Dialect::ALL {
            assert!(options.dialect(dialect).enabled);
        }
        assert_eq!(
            options.star_comments.replacement("search"),
            "/* Feature [search] DISABLED */"
        );
        assert_eq!(
            options.slash_comments.replacement("search"),
            "// Feature [search] DISABLED //"
        );
        assert_eq!(
            options.html_attributes.replacement("search"),
            "<!-- Feature [search] DISABLED -->"
        );
    }

    #[test]
    fn test_replacement_substitutes_every_placeholder() {
        let options = DialectOptions {
            enabled: true,
            replace: "${FEATURE}/${FEATURE}".to_string(),
        };
        assert_eq!(options.replacement("a"), "a/a");
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let options: StripOptions = serde_json::from_str(
            r#"{"htmlElements": {"enabled": false}, "star_comments": {"replace": "x"}}"#,
        )
        .unwrap();

        assert!(!options.html_elements.enabled);
        assert_eq!(
            options.html_elements.replace,
            Dialect::HtmlElements.default_template()
        );
        assert!(options.star_comments.enabled);
        assert_eq!(options.star_comments.replace, "x");
        assert_eq!(options.slash_comments, DialectOptions::new(Dialect::SlashComments));
    }

    #[test]
    fn test_empty_document_is_default() {
        let options: StripOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, StripOptions::default());
    }

    #[test]
    fn test_dialect_parsing() {
        assert_eq!("star_comments".parse::<Dialect>().unwrap(), Dialect::StarComments);
        assert_eq!("slash-comments".parse::<Dialect>().unwrap(), Dialect::SlashComments);
        assert_eq!("htmlAttributes".parse::<Dialect>().unwrap(), Dialect::HtmlAttributes);
        assert!("hash_comments".parse::<Dialect>().is_err());

        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_builders() {
        let options = StripOptions::default()
            .disable(Dialect::HtmlElements)
            .replace_all("removed");

        let enabled: Vec<_> = options.enabled_dialects().collect();
        assert_eq!(enabled.len(), 4);
        assert!(!enabled.contains(&Dialect::HtmlElements));
        assert_eq!(options.slash_comments.replace, "removed");
    }
}
