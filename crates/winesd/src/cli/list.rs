use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;
use winesd_core::{Choice, Field, Filter, HttpClient, MemberExtractor, Session};

use crate::ui::table::Formatter;

/// Positional value that asks for the available choices instead.
pub const LIST: &str = "list";

/// Which fields to list, and the filter formed by the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    filter: Filter,
    fields: Vec<Field>,
}

impl Listing {
    /// `None` when no positional selects `list`.
    pub fn from_selection(edition: &str, arch: &str, lang: &str) -> Option<Self> {
        let mut filter = Filter::default();
        let mut fields = Vec::new();

        for (field, value) in [
            (Field::Edition, edition),
            (Field::Architecture, arch),
            (Field::LanguageCode, lang),
        ] {
            if value == LIST {
                fields.push(field);
                continue;
            }
            filter = match field {
                Field::Edition => filter.edition(value),
                Field::Architecture => filter.architecture(value),
                Field::LanguageCode => filter.language_code(value),
            };
        }

        (!fields.is_empty()).then_some(Self { filter, fields })
    }

    pub fn print<C: HttpClient, X: MemberExtractor>(
        &self,
        session: &Session<C, X>,
        json: bool,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut listed = BTreeMap::new();
        for &field in &self.fields {
            let rows: Vec<ChoiceRow> = session
                .choices(&self.filter, field)?
                .into_iter()
                .map(ChoiceRow::from)
                .collect();
            listed.insert(field.name(), rows);
        }

        if json {
            serde_json::to_writer_pretty(&mut *out, &listed)?;
            writeln!(out)?;
            return Ok(());
        }

        for &field in &self.fields {
            let rows = listed.remove(field.name()).unwrap_or_default();
            let footer = (rows.is_empty()).then(|| "no matching entries".to_string());
            let table = Formatter {
                header: Some(format!("Available {} for {}", plural(field), session.release())),
                footer,
            }
            .build(rows);
            writeln!(out, "{table}")?;
        }
        Ok(())
    }
}

fn plural(field: Field) -> &'static str {
    match field {
        Field::Edition => "editions",
        Field::Architecture => "architectures",
        Field::LanguageCode => "languages",
    }
}

#[derive(Debug, Tabled, Serialize)]
struct ChoiceRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Name")]
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[tabled(rename = "Files")]
    files: usize,
}

impl From<Choice> for ChoiceRow {
    fn from(choice: Choice) -> Self {
        Self {
            value: choice.value,
            name: choice.label.unwrap_or_default(),
            files: choice.files,
        }
    }
}
