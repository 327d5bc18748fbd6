//! CLI output formatting utilities.
//!
//! This module provides utilities for formatting CLI output including:
//! - JSON syntax highlighting
//! - Colour swatches and style labels for analysis tables

use colored::{ColoredString, Colorize};

use crate::analysis::{PanelStyle, Rgb};

/// Prints JSON with syntax highlighting.
///
/// Colors:
/// - Keys: Cyan
/// - Strings: Green
/// - Numbers: Yellow
/// - Booleans/Null: Magenta
/// - Brackets/Braces: White (default)
pub fn print_highlighted_json(value: &serde_json::Value) {
    println!("{}", highlight_json(value));
}

/// Returns pretty-printed JSON with syntax highlighting.
#[must_use]
pub fn highlight_json(value: &serde_json::Value) -> String {
    let json_str = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    highlight_json_str(&json_str)
}

fn highlight_json_str(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut is_key = false;
    let mut escape_next = false;
    let mut current_token = String::new();
    let mut after_colon = false;

    for ch in json.chars() {
        if escape_next {
            current_token.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            current_token.push(ch);
            escape_next = true;
            continue;
        }

        match ch {
            '"' => {
                if in_string {
                    current_token.push(ch);
                    let colored =
                        if is_key { current_token.cyan() } else { current_token.green() };
                    out.push_str(&colored.to_string());
                    current_token.clear();
                    in_string = false;
                    is_key = false;
                } else {
                    flush_token(&mut out, &mut current_token, after_colon);
                    current_token.push(ch);
                    in_string = true;
                    // Strings before a colon are keys
                    is_key = !after_colon;
                    after_colon = false;
                }
            }
            ':' if !in_string => {
                flush_token(&mut out, &mut current_token, false);
                out.push_str(&":".white().to_string());
                after_colon = true;
            }
            ',' if !in_string => {
                flush_token(&mut out, &mut current_token, after_colon);
                out.push_str(&",".white().to_string());
                after_colon = false;
            }
            '{' | '}' | '[' | ']' if !in_string => {
                flush_token(&mut out, &mut current_token, after_colon);
                out.push_str(&ch.to_string().white().bold().to_string());
                after_colon = false;
            }
            _ => current_token.push(ch),
        }
    }

    flush_token(&mut out, &mut current_token, after_colon);
    out
}

/// Appends the current token with appropriate coloring.
fn flush_token(out: &mut String, token: &mut String, is_value: bool) {
    if token.is_empty() {
        return;
    }

    if is_value && !token.trim().is_empty() {
        let start = token.find(|c: char| !c.is_whitespace()).unwrap_or(0);
        let end = token.rfind(|c: char| !c.is_whitespace()).map_or(token.len(), |i| i + 1);

        let prefix = &token[..start];
        let value = &token[start..end];
        let suffix = &token[end..];

        let colored = if value == "true" || value == "false" || value == "null" {
            Some(value.magenta())
        } else if value.parse::<f64>().is_ok() {
            Some(value.yellow())
        } else {
            None
        };

        match colored {
            Some(value) => {
                out.push_str(prefix);
                out.push_str(&value.to_string());
                out.push_str(suffix);
            }
            None => out.push_str(token),
        }
    } else {
        out.push_str(token);
    }

    token.clear();
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// This function correctly handles multi-byte UTF-8 characters by counting
/// characters rather than bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_chars {
        s.to_string()
    } else if max_chars <= 1 {
        "…".to_string()
    } else {
        let truncate_at = s.char_indices().nth(max_chars - 1).map_or(s.len(), |(idx, _)| idx);
        format!("{}…", &s[..truncate_at])
    }
}

/// A two-cell block painted in `color`, followed by its hex code.
#[must_use]
pub fn swatch(color: Rgb) -> String {
    format!("{} {color}", "██".truecolor(color.r, color.g, color.b))
}

/// The style name, colored by family.
#[must_use]
pub fn style_label(style: PanelStyle) -> ColoredString {
    let label = style.as_str();
    match style {
        PanelStyle::Dark => label.bright_white().on_black(),
        PanelStyle::Light => label.black().on_bright_white(),
        PanelStyle::TranslucentDark => label.bright_white().on_bright_black(),
        PanelStyle::TranslucentLight => label.black().on_white(),
        PanelStyle::Maximized => label.cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_json_keeps_text_without_colors() {
        colored::control::set_override(false);

        let value = serde_json::json!({
            "style": "translucent-dark",
            "meanLuminance": 0.25,
            "fallback": false,
            "minRGB": { "r": 1, "g": 2, "b": 3 },
        });

        assert_eq!(highlight_json(&value), serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_highlight_json_handles_escaped_quotes() {
        colored::control::set_override(false);

        let value = serde_json::json!({ "error": "bad \"file\": missing" });
        assert_eq!(highlight_json(&value), serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("wall.png", 10), "wall.png");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("mountains-at-dusk.png", 8), "mountai…");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_min_length() {
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn test_truncate_multibyte_utf8() {
        let s = "café-au-lait.jpg";
        assert_eq!(truncate(s, 5), "café…");
        assert_eq!(truncate(s, 20), s);
    }

    #[test]
    fn test_swatch_ends_with_hex() {
        assert!(swatch(Rgb::new(0x12, 0xab, 0xff)).ends_with("#12abff"));
    }

    #[test]
    fn test_style_label_contains_name() {
        for style in PanelStyle::CLASSIFIED {
            assert!(style_label(style).to_string().contains(style.as_str()));
        }
    }
}
