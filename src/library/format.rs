//! Display templates for albums.
//!
//! `$field` and `${field}` are replaced with the album's field value;
//! `$$` produces a literal dollar sign. Unknown or unset fields render empty.

use super::models::Album;

/// Default album template
pub const DEFAULT_ALBUM_FORMAT: &str = "$albumartist - $album";

/// Render an album through a template
pub fn format_album(album: &Album, template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                out.push_str(&album.field(&name).unwrap_or_default());
            }
            Some(c) if is_field_char(c) => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_field_char(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                out.push_str(&album.field(&name).unwrap_or_default());
            }
            _ => out.push('$'),
        }
    }

    out
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
