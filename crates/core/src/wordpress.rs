//! WordPress plugin packaging.
//!
//! Wraps the generated widget fragment in a single-file plugin that
//! registers a shortcode, and zips it together with a `readme.txt` in the
//! layout WordPress expects for uploaded plugins (`<slug>/<slug>.php`).

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::CoreError;
use crate::markup::render_widget;
use crate::settings::Settings;

pub const PLUGIN_VERSION: &str = "1.0.0";

/// Slug used when a section name has no usable characters.
const FALLBACK_SLUG: &str = "table-reservation";


/// Lowercase ASCII slug: runs of anything other than `[a-z0-9]` collapse
/// to a single `-`.
///
/// ```
/// use tablebuilder_core::wordpress::slugify;
///
/// assert_eq!(slugify("Chez Nous: Dinner!"), "chez-nous-dinner");
/// assert_eq!(slugify("***"), "table-reservation");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Shortcode tag for a plugin slug, e.g. `table_reservation_chez_nous`.
pub fn shortcode_for(slug: &str) -> String {
    format!("table_reservation_{}", slug.replace('-', "_"))
}

/// Text safe to place inside a PHP doc-comment header line.
fn header_text(value: &str) -> String {
    value
        .replace("*/", "")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// PHP single-quoted string literal. Inside `'...'` only `\\` and `\'`
/// are escapes, so escaping those two leaves no way out of the literal.
///
/// ```
/// use tablebuilder_core::wordpress::php_string;
///
/// assert_eq!(php_string(r"it's C:\menu"), r"'it\'s C:\\menu'");
/// ```
pub fn php_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if matches!(c, '\\' | '\'') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Render the main plugin PHP file.
pub fn plugin_php(settings: &Settings, name: &str, slug: &str) -> String {
    let ident = slug.replace('-', "_");
    let shortcode = shortcode_for(slug);
    let mut php = String::new();
    php.push_str("<?php\n");
    php.push_str("/**\n");
    php.push_str(&format!(" * Plugin Name: {} Reservations\n", header_text(name)));
    php.push_str(" * Description: Table reservation form generated by Table Reservation Builder.\n");
    php.push_str(&format!(" * Version: {PLUGIN_VERSION}\n"));
    php.push_str(" * Requires PHP: 7.3\n");
    php.push_str(&format!(" * Text Domain: {slug}\n"));
    php.push_str(" */\n\n");
    php.push_str("if (!defined('ABSPATH')) {\n    exit;\n}\n\n");
    php.push_str(&format!("function trb_{ident}_render() {{\n"));
    php.push_str(&format!("    return {};\n", php_string(&render_widget(settings))));
    php.push_str("}\n\n");
    php.push_str(&format!(
        "add_shortcode('{shortcode}', 'trb_{ident}_render');\n"
    ));
    php
}

/// Render the WordPress.org style readme.
pub fn readme_txt(name: &str, slug: &str) -> String {
    let title = header_text(name);
    format!(
        "=== {title} Reservations ===\n\
         Stable tag: {PLUGIN_VERSION}\n\
         Requires PHP: 7.3\n\n\
         Table reservation form generated by Table Reservation Builder.\n\n\
         == Usage ==\n\n\
         Activate the plugin, then place [{}] on any page or post.\n\n\
         == Credentials ==\n\n\
         SMTP passwords and reCAPTCHA secret keys are not included in this plugin.\n\
         Configure them on the server endpoints that receive reservations.\n",
        shortcode_for(slug)
    )
}

/// Build the plugin zip for a named widget configuration.
///
/// Entries carry a fixed timestamp, so the same input always produces the
/// same archive bytes.
pub fn build_plugin(settings: &Settings, name: &str) -> Result<Vec<u8>, CoreError> {
    let slug = slugify(name);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let entries = [
        (format!("{slug}/{slug}.php"), plugin_php(settings, name, &slug)),
        (format!("{slug}/readme.txt"), readme_txt(name, &slug)),
    ];
    for (path, contents) in entries {
        zip.start_file(path, options)
            .map_err(|e| CoreError::Internal(format!("Plugin archive error: {e}")))?;
        zip.write_all(contents.as_bytes())
            .map_err(|e| CoreError::Internal(format!("Plugin archive error: {e}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| CoreError::Internal(format!("Plugin archive error: {e}")))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("  La   Bella--Vita  "), "la-bella-vita");
        assert_eq!(slugify("Ristorante 2024"), "ristorante-2024");
        assert_eq!(slugify(""), FALLBACK_SLUG);
    }

    #[test]
    fn php_registers_shortcode_and_embeds_widget() {
        let php = plugin_php(&Settings::default(), "Bistro */ Hack", "bistro-hack");
        assert!(php.starts_with("<?php\n"));
        assert!(php.contains(" * Plugin Name: Bistro  Hack Reservations\n"));
        assert!(php.contains("add_shortcode('table_reservation_bistro_hack', 'trb_bistro_hack_render');"));
        assert!(php.contains("class=\"trb-widget\""));
        assert!(php.contains("    return '<!-- Table Reservation Widget -->"));
    }

    /// Index just past the first unescaped `'` in `s`.
    fn literal_end(s: &str) -> usize {
        let bytes = s.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'\'' => return i + 1,
                _ => i += 1,
            }
        }
        panic!("unterminated PHP string literal");
    }

    #[test]
    fn user_text_cannot_leave_the_markup_literal() {
        let settings = Settings {
            title: "Dinner\nTRB_WIDGET_HTML;\nsystem('id');".to_string(),
            subtitle: "\\' . phpinfo() . '".to_string(),
            button_text: "Book\\".to_string(),
            ..Settings::default()
        };
        let php = plugin_php(&settings, "Dinner", "dinner");

        let start = php.find("    return '").unwrap() + "    return '".len();
        let end = start + literal_end(&php[start..]);
        assert_eq!(&php[end..], ";\n}\n\nadd_shortcode('table_reservation_dinner', 'trb_dinner_render');\n");

        let literal = &php[start..end - 1];
        assert!(literal.contains("Dinner\nTRB_WIDGET_HTML;\nsystem(&#39;id&#39;);"));
        assert!(literal.contains("\\\\"));
    }

    #[test]
    fn php_string_escapes_only_quote_and_backslash() {
        assert_eq!(php_string("plain\ntext"), "'plain\ntext'");
        assert_eq!(php_string("a'b"), r"'a\'b'");
        assert_eq!(php_string(r"a\'b"), r"'a\\\'b'");
        assert_eq!(php_string(r"end\"), r"'end\\'");
    }

    #[test]
    fn archive_contains_plugin_layout() {
        let bytes = build_plugin(&Settings::default(), "Chez Nous").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"chez-nous/chez-nous.php".to_string()));
        assert!(names.contains(&"chez-nous/readme.txt".to_string()));

        let mut readme = String::new();
        archive
            .by_name("chez-nous/readme.txt")
            .unwrap()
            .read_to_string(&mut readme)
            .unwrap();
        assert!(readme.contains("[table_reservation_chez_nous]"));
    }

    #[test]
    fn archive_is_deterministic() {
        let settings = Settings::default();
        assert_eq!(
            build_plugin(&settings, "Chez Nous").unwrap(),
            build_plugin(&settings, "Chez Nous").unwrap()
        );
    }
}
