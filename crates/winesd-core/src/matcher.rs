//! Resolve selection criteria to exactly one catalog record.
//!
//! Matching is byte-exact and case-sensitive. The catalog is untrusted, so
//! more than one hit is reported with every matched record instead of
//! picking one.

use std::fmt;

use crate::catalog::{Catalog, EulaEntry, ProductEntry};

/// The caller's choice of image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Criteria {
    pub edition: String,
    pub architecture: String,
    pub language_code: String,
}

impl Criteria {
    pub fn new(
        edition: impl Into<String>,
        architecture: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            edition: edition.into(),
            architecture: architecture.into(),
            language_code: language_code.into(),
        }
    }

    pub fn accepts(&self, entry: &ProductEntry) -> bool {
        entry.edition == self.edition
            && entry.architecture == self.architecture
            && entry.language_code == self.language_code
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "edition: {}, arch: {} and lang: {}",
            self.edition, self.architecture, self.language_code
        )
    }
}

/// Criteria with unset fields, used for listing what the catalog offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub edition: Option<String>,
    pub architecture: Option<String>,
    pub language_code: Option<String>,
}

impl Filter {
    #[must_use]
    pub fn edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = Some(edition.into());
        self
    }

    #[must_use]
    pub fn architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = Some(architecture.into());
        self
    }

    #[must_use]
    pub fn language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    pub fn accepts(&self, entry: &ProductEntry) -> bool {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().is_none_or(|w| w == have)
        }
        eq(&self.edition, &entry.edition)
            && eq(&self.architecture, &entry.architecture)
            && eq(&self.language_code, &entry.language_code)
    }
}

impl From<Criteria> for Filter {
    fn from(c: Criteria) -> Self {
        Self {
            edition: Some(c.edition),
            architecture: Some(c.architecture),
            language_code: Some(c.language_code),
        }
    }
}

/// What was being looked up when a match failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Product(Criteria),
    Eula { language_code: String },
}

impl Selection {
    pub fn kind(&self) -> &'static str {
        match self {
            Selection::Product(_) => "Windows ESD",
            Selection::Eula { .. } => "Windows EULA",
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Product(criteria) => fmt::Display::fmt(criteria, f),
            Selection::Eula { language_code } => write!(f, "lang: {language_code}"),
        }
    }
}

/// A matched catalog record, kept whole for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Product(ProductEntry),
    Eula(EulaEntry),
}

impl Record {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Record::Product(entry) => entry.fields(),
            Record::Eula(entry) => entry.fields(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    NoMatch { selection: Selection },
    Ambiguous { selection: Selection, matches: Vec<Record> },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::NoMatch { selection } => {
                write!(f, "No such {} with conditions {selection}.", selection.kind())
            }
            MatchError::Ambiguous { selection, matches } => {
                write!(
                    f,
                    "{} {} entries were matched with {selection}.",
                    matches.len(),
                    selection.kind()
                )?;
                for (i, record) in matches.iter().enumerate() {
                    write!(f, "\nMatch {i}:")?;
                    for (name, value) in record.fields() {
                        write!(f, "\n\t{name}: {value}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for MatchError {}

pub fn match_product<'c>(catalog: &'c Catalog, criteria: &Criteria) -> Result<&'c ProductEntry, MatchError> {
    let found: Vec<&ProductEntry> = catalog.products.iter().filter(|e| criteria.accepts(e)).collect();
    match found.as_slice() {
        &[entry] => Ok(entry),
        [] => Err(MatchError::NoMatch {
            selection: Selection::Product(criteria.clone()),
        }),
        _ => Err(MatchError::Ambiguous {
            selection: Selection::Product(criteria.clone()),
            matches: found.iter().map(|e| Record::Product((*e).clone())).collect(),
        }),
    }
}

/// EULA URL for a language. Zero or several entries are both errors.
pub fn match_eula<'c>(catalog: &'c Catalog, language_code: &str) -> Result<&'c str, MatchError> {
    let found: Vec<&EulaEntry> = catalog
        .eulas
        .iter()
        .filter(|e| e.language_code == language_code)
        .collect();
    let selection = || Selection::Eula {
        language_code: language_code.to_string(),
    };
    match found.as_slice() {
        &[entry] => Ok(&entry.url),
        [] => Err(MatchError::NoMatch { selection: selection() }),
        _ => Err(MatchError::Ambiguous {
            selection: selection(),
            matches: found.iter().map(|e| Record::Eula((*e).clone())).collect(),
        }),
    }
}
