//! The `NNN-name` convention shared by projects, media files and pages.
//!
//! An optional numeric prefix sets the order and puts the entry in
//! navigation; the rest is the name. Dashes in the name become spaces in
//! display titles, and the name is lowercased into a URL slug:
//!
//! - `010-Brand-Identity/` → title "Brand Identity", slug `brand-identity`
//! - `003-Logo-Sketches.jpg` → title "Logo Sketches"
//! - `020-contact.md` → link title "contact", slug `contact`

/// Result of parsing an entry name like `010-Brand-Identity`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present.
    pub number: Option<u32>,
    /// Raw name after `NNN-`. Empty if number-only; the full input if unnumbered.
    pub name: String,
    /// Name with dashes converted to spaces.
    pub display_title: String,
}

impl ParsedName {
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

pub fn parse_entry_name(name: &str) -> ParsedName {
    let (number, rest) = match name.split_once('-') {
        Some((prefix, rest)) => match prefix.parse::<u32>() {
            Ok(n) => (Some(n), rest),
            Err(_) => (None, name),
        },
        None => match name.parse::<u32>() {
            Ok(n) => (Some(n), ""),
            Err(_) => (None, name),
        },
    };
    ParsedName {
        number,
        name: rest.to_string(),
        display_title: rest.replace('-', " "),
    }
}

/// Lowercase slug with single dashes between alphanumeric runs.
///
/// Non-ASCII letters are kept, so `Café` becomes `café`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
