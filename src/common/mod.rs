//! Common utilities shared by the CLI and the runner

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Replace every `{{name}}` placeholder in `text` using `lookup`
///
/// Returns the name of the first placeholder `lookup` cannot resolve.
/// Text without placeholders is returned unchanged; an unterminated `{{`
/// is kept literally.
pub fn interpolate<'a, F>(text: &str, mut lookup: F) -> std::result::Result<String, String>
where
    F: FnMut(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = after[..end].trim();
        let value = lookup(name).ok_or_else(|| name.to_string())?;
        out.push_str(&rest[..start]);
        out.push_str(value);
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}
