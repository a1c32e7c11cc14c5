//! Storyboard panel placeholders.
//!
//! The storyboard prompt asks for one `PANEL: <description>` line per frame.
//! Each is replaced with a markdown image pointing at a placeholder service,
//! standing in for a real image generator.

/// Line prefix marking a panel description.
pub const PANEL_PREFIX: &str = "PANEL:";

const PLACEHOLDER_URL: &str = "https://placehold.co/600x300/png?text=";
const SLUG_MAX_CHARS: usize = 50;

/// Markdown image for a single scene description.
pub fn panel_image(description: &str) -> String {
    format!("![Storyboard Panel]({PLACEHOLDER_URL}{})", panel_slug(description))
}

/// URL text for a description: spaces become `+`, characters that would break
/// the URL or the markdown link are dropped, at most 50 characters.
pub fn panel_slug(description: &str) -> String {
    description
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            c if c.is_alphanumeric() || matches!(c, '-' | '.' | ',' | '+') => Some(c),
            _ => None,
        })
        .take(SLUG_MAX_CHARS)
        .collect()
}

/// Replaces every `PANEL:` line in `markdown` with its placeholder image.
pub fn expand_panels(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| match line.trim_start().strip_prefix(PANEL_PREFIX) {
            Some(description) => panel_image(description),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
