//! Block removal for disabled features

use crate::error::{Result, StripError};
use crate::options::{Dialect, StripOptions};
use featureswitch_core::Features;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use tracing::{debug, trace};

/// Two consecutive star comments and everything between them.
static COMMENT_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/[\s\S]*?/\*[\s\S]*?\*/").unwrap());

/// Compiled removal rule for one feature in one dialect.
#[derive(Debug, Clone)]
enum Rule {
    /// Replace every match of the pattern
    Pattern { pattern: Regex, replacement: String },

    /// Replace from an opening tag (group 1 is the tag name) to its first
    /// matching close tag
    Element { opening: Regex, replacement: String },

    /// Replace star comment pairs that carry both markers
    CommentPair {
        start: String,
        end: String,
        replacement: String,
    },
}

impl Rule {
    fn compile(dialect: Dialect, feature: &str, replacement: String) -> Result<Self> {
        let name = regex::escape(feature);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|source| StripError::Pattern {
                feature: feature.to_string(),
                source,
            })
        };

        let rule = match dialect {
            Dialect::HtmlComments => Rule::Pattern {
                pattern: compile(format!(
                    r"<!--\s*\S*\s*FEATURE\.start\({name}\)[\s\S]*?FEATURE\.end\({name}\)\s*\S*\s*-->"
                ))?,
                replacement,
            },
            Dialect::HtmlElements => Rule::Pattern {
                pattern: compile(format!(r"<{name}[\s\S]*?</{name}>"))?,
                replacement,
            },
            Dialect::HtmlAttributes => Rule::Element {
                opening: compile(format!(
                    r#"<((?:\w|-)*?)\s*feature-name="?{name}"?(?:\s*(?:(?:\w|-)*(?:=?"?\w*"?)?)*)*?>"#
                ))?,
                replacement,
            },
            Dialect::StarComments => Rule::CommentPair {
                start: format!("FEATURE.start({feature})"),
                end: format!("FEATURE.end({feature})"),
                replacement,
            },
            Dialect::SlashComments => Rule::Pattern {
                pattern: compile(format!(
                    r"(?mR)//[^\S\r\n]*FEATURE\.start\({name}\).*$[\s\S]*?//[^\S\r\n]*FEATURE\.end\({name}\).*$"
                ))?,
                replacement,
            },
        };
        Ok(rule)
    }

    fn apply(&self, content: &str) -> String {
        match self {
            Rule::Pattern {
                pattern,
                replacement,
            } => pattern
                .replace_all(content, NoExpand(replacement))
                .into_owned(),
            Rule::Element {
                opening,
                replacement,
            } => replace_elements(content, opening, replacement),
            Rule::CommentPair {
                start,
                end,
                replacement,
            } => replace_comment_pairs(content, start, end, replacement),
        }
    }
}

fn replace_elements(content: &str, opening: &Regex, replacement: &str) -> String {
    let mut output = String::with_capacity(content.len());
    let mut copied = 0;
    let mut search = 0;

    while search < content.len() {
        let Some(caps) = opening.captures_at(content, search) else {
            break;
        };
        let Some(open) = caps.get(0) else {
            break;
        };
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let close = format!("</{tag}>");

        match content[open.end()..].find(&close) {
            Some(offset) => {
                let end = open.end() + offset + close.len();
                output.push_str(&content[copied..open.start()]);
                output.push_str(replacement);
                copied = end;
                search = end;
            }
            // Unclosed element: leave it and keep scanning past the '<'
            None => search = open.start() + 1,
        }
    }

    output.push_str(&content[copied..]);
    output
}

fn replace_comment_pairs(content: &str, start: &str, end: &str, replacement: &str) -> String {
    let mut output = String::with_capacity(content.len());
    let mut copied = 0;

    for pair in COMMENT_PAIR.find_iter(content) {
        let text = pair.as_str();
        if text.contains(start) && text.contains(end) {
            output.push_str(&content[copied..pair.start()]);
            output.push_str(replacement);
            copied = pair.end();
        }
    }

    output.push_str(&content[copied..]);
    output
}

/// Removes the blocks of every disabled feature from source text.
///
/// Rules are compiled once, so a single stripper can be reused across many
/// files. Disabled features are processed in name order; for each one the
/// enabled dialects run in [`Dialect::ALL`] order, each seeing the output of
/// the previous step. Enabled and unknown features are never touched.
///
/// # Examples
///
/// ```
/// use featureswitch_core::Features;
/// use featureswitch_strip::{StripOptions, Stripper};
///
/// let features = Features::from([("beta".to_string(), false)]);
/// let stripper = Stripper::new(&features, &StripOptions::default())?;
///
/// let source = "a();\n// FEATURE.start(beta)\nb();\n// FEATURE.end(beta)\nc();\n";
/// assert_eq!(
///     stripper.strip(source),
///     "a();\n// Feature [beta] DISABLED //\nc();\n"
/// );
/// # Ok::<(), featureswitch_strip::StripError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Stripper {
    rules: Vec<Rule>,
}

impl Stripper {
    pub fn new(features: &Features, options: &StripOptions) -> Result<Self> {
        let mut rules = Vec::new();

        for feature in features
            .iter()
            .filter(|(_, enabled)| !**enabled)
            .map(|(name, _)| name)
        {
            for dialect in options.enabled_dialects() {
                let replacement = options.dialect(dialect).replacement(feature);
                trace!(feature = %feature, dialect = %dialect, "compiling strip rule");
                rules.push(Rule::compile(dialect, feature, replacement)?);
            }
        }

        debug!(rules = rules.len(), "stripper ready");
        Ok(Self { rules })
    }

    /// Whether the stripper would leave every input unchanged.
    pub fn is_noop(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn strip(&self, content: &str) -> String {
        let mut output = content.to_string();
        for rule in &self.rules {
            output = rule.apply(&output);
        }
        output
    }
}

/// Strip `content` in one call.
pub fn strip(content: &str, features: &Features, options: &StripOptions) -> Result<String> {
    Ok(Stripper::new(features, options)?.strip(content))
}
