//! Album filter expressions.
//!
//! A query is a list of whitespace-separated terms, all of which must
//! match (AND). `field:value` matches a case-insensitive substring of the
//! named field; a bare term matches the album title or album artist.
//! `field:` with no value matches albums where that field is unset or empty.

use thiserror::Error;

use super::models::{Album, ALBUM_FIELDS};

/// Errors raised while parsing a query
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown album field in query: {0}")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Field { field: String, value: String },
    Any(String),
}

/// Parsed album query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
}

impl Query {
    /// Query matching every album
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse query terms as passed on the command line
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, QueryError> {
        let mut terms = Vec::new();

        for token in args.iter().flat_map(|a| a.as_ref().split_whitespace()) {
            match token.split_once(':') {
                Some((field, value)) if !field.is_empty() => {
                    if !ALBUM_FIELDS.contains(&field) {
                        return Err(QueryError::UnknownField(field.to_string()));
                    }
                    terms.push(Term::Field {
                        field: field.to_string(),
                        value: value.to_lowercase(),
                    });
                }
                _ => terms.push(Term::Any(token.to_lowercase())),
            }
        }

        Ok(Self { terms })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Check whether an album satisfies every term
    pub fn matches(&self, album: &Album) -> bool {
        self.terms.iter().all(|term| match term {
            Term::Field { field, value } => {
                let current = album.field(field).unwrap_or_default().to_lowercase();
                if value.is_empty() {
                    current.is_empty()
                } else {
                    current.contains(value.as_str())
                }
            }
            Term::Any(needle) => {
                album.album.to_lowercase().contains(needle.as_str())
                    || album.albumartist.to_lowercase().contains(needle.as_str())
            }
        })
    }
}
