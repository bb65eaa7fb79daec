//! `${var}` string templates for derived values.

use filler_types::{FillerError, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_.-]+)\}").expect("placeholder pattern is valid")
});

/// Replace every `${name}` in `template` using `lookup`.
///
/// An unknown name is an error; text outside placeholders is kept as is.
pub fn render<'a, F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut missing = None;

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match lookup(name) {
            Some(value) => value.to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(FillerError::Template(format!(
            "unknown variable '${{{}}}' in template \"{}\"",
            name, template
        ))),
        None => Ok(rendered.into_owned()),
    }
}

/// Names referenced by a template, in order of appearance.
pub fn references(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
