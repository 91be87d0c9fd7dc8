//! Integration tests for featureswitch-strip

use featureswitch_core::{Features, as_features};
use featureswitch_strip::*;
use serde_json::json;

fn fixture_features() -> Features {
    Features::from([
        ("feature-one".to_string(), true),
        ("feature-two".to_string(), false),
    ])
}

fn assert_stripped(source: &str, expected: &str) {
    let output = strip(source, &fixture_features(), &StripOptions::default()).unwrap();
    assert_eq!(output.trim(), expected.trim());
}

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn test_slash_comment_fixture() {
    assert_stripped(
        include_str!("fixtures/slash_comments.rs.txt"),
        include_str!("fixtures/slash_comments.expected.txt"),
    );
}

#[test]
fn test_star_comment_fixture() {
    assert_stripped(
        include_str!("fixtures/star_comments.css.txt"),
        include_str!("fixtures/star_comments.expected.txt"),
    );
}

#[test]
fn test_markup_fixture() {
    assert_stripped(
        include_str!("fixtures/markup.html.txt"),
        include_str!("fixtures/markup.expected.txt"),
    );
}

const MIXED_SOURCE: &str = r#"
// FEATURE.start(alpha)
alpha();
// FEATURE.end(alpha)
// FEATURE.start(beta)
beta();
// FEATURE.end(beta)
/* FEATURE.start(alpha) */
.alpha {}
/* FEATURE.end(alpha) */
/* FEATURE.start(beta) */
.beta {}
/* FEATURE.end(beta) */
<feature feature-name="alpha">alpha</feature>
<feature feature-name=beta>beta</feature>
<element feature-name="alpha" class="x">alpha</element>
<element feature-name="beta">beta</element>
"#;

#[test]
fn test_custom_replacements_for_every_block() {
    let features = as_features(&json!({"alpha": false, "beta": "no"}));
    let options = StripOptions::default().replace_all("replaced");

    let output = strip(MIXED_SOURCE, &features, &options).unwrap();
    assert_eq!(without_whitespace(&output), "replaced".repeat(8));
}

#[test]
fn test_disabling_every_dialect_leaves_source_untouched() {
    let features = as_features(&json!({"alpha": false, "beta": false}));
    let options: StripOptions = serde_json::from_value(json!({
        "htmlComments": {"enabled": false},
        "htmlElements": {"enabled": false},
        "htmlAttributes": {"enabled": false},
        "starComments": {"enabled": false},
        "slashComments": {"enabled": false},
    }))
    .unwrap();

    let output = strip(MIXED_SOURCE, &features, &options).unwrap();
    assert_eq!(output, MIXED_SOURCE);
}

#[test]
fn test_single_dialect_disabled() {
    let features = as_features(&json!({"alpha": false, "beta": false}));
    let options = StripOptions::default()
        .disable(Dialect::SlashComments)
        .replace_all("replaced");

    let output = strip(MIXED_SOURCE, &features, &options).unwrap();
    assert!(output.contains("// FEATURE.start(alpha)"));
    assert!(output.contains("// FEATURE.start(beta)"));
    assert!(!output.contains(".alpha {}"));
    assert!(!output.contains("feature-name"));
}

#[test]
fn test_stripper_is_reusable() {
    let stripper = Stripper::new(&fixture_features(), &StripOptions::default()).unwrap();

    let first = stripper.strip("<feature-two>x</feature-two>");
    let second = stripper.strip("<p><feature-two></feature-two></p>");

    assert_eq!(first, "<!-- Feature [feature-two] DISABLED -->");
    assert_eq!(second, "<p><!-- Feature [feature-two] DISABLED --></p>");
}
