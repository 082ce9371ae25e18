//! Typed view of the published media catalog (`products.xml`).
//!
//! Parsing is schema-checked: every required field is present and well
//! formed once a [`Catalog`] exists, so nothing downstream deals with
//! "maybe missing" values.

use std::collections::BTreeMap;

use roxmltree::{Document, Node};
use serde::Serialize;
use winesd_verify::Sha1Digest;

use crate::error::ParseError;
use crate::matcher::Filter;

/// Name of the catalog document inside the release archive.
pub const CATALOG_MEMBER: &str = "products.xml";

const MEDIA_PATH: [&str; 4] = ["MCT", "Catalogs", "Catalog", "PublishedMedia"];

/// One downloadable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductEntry {
    #[serde(rename = "Edition")]
    pub edition: String,
    #[serde(rename = "Architecture")]
    pub architecture: String,
    #[serde(rename = "LanguageCode")]
    pub language_code: String,
    #[serde(rename = "FilePath")]
    pub file_path: String,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "Sha1")]
    pub sha1: Sha1Digest,
    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "Edition_Loc", skip_serializing_if = "Option::is_none")]
    pub edition_loc: Option<String>,
    #[serde(rename = "Architecture_Loc", skip_serializing_if = "Option::is_none")]
    pub architecture_loc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EulaEntry {
    #[serde(rename = "LanguageCode")]
    pub language_code: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// Selection attribute of a product entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Edition,
    Architecture,
    LanguageCode,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Edition => "edition",
            Field::Architecture => "architecture",
            Field::LanguageCode => "language",
        }
    }
}

/// A distinct value of one field, as offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    /// Localized display name, when the catalog carries one.
    pub label: Option<String>,
    /// Number of files offering this value.
    pub files: usize,
}

impl ProductEntry {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Edition => &self.edition,
            Field::Architecture => &self.architecture,
            Field::LanguageCode => &self.language_code,
        }
    }

    fn label(&self, field: Field) -> Option<&str> {
        match field {
            Field::Edition => self.edition_loc.as_deref(),
            Field::Architecture => self.architecture_loc.as_deref(),
            Field::LanguageCode => self.language.as_deref(),
        }
    }

    /// Every field as `(catalog name, value)`, in catalog order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("FileName", self.file_name.clone()),
            ("LanguageCode", self.language_code.clone()),
            ("Edition", self.edition.clone()),
            ("Architecture", self.architecture.clone()),
            ("Size", self.size.to_string()),
            ("Sha1", self.sha1.to_string()),
            ("FilePath", self.file_path.clone()),
        ];
        let optional = [
            ("Language", &self.language),
            ("Edition_Loc", &self.edition_loc),
            ("Architecture_Loc", &self.architecture_loc),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.clone().map(|v| (name, v))),
        );
        fields
    }
}

impl EulaEntry {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("LanguageCode", self.language_code.clone()),
            ("URL", self.url.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub products: Vec<ProductEntry>,
    pub eulas: Vec<EulaEntry>,
}

impl Catalog {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        Self::from_xml(std::str::from_utf8(bytes)?)
    }

    pub fn from_xml(xml: &str) -> Result<Self, ParseError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let doc = Document::parse(xml)?;

        let root = doc.root_element();
        if !root.has_tag_name(MEDIA_PATH[0]) {
            return Err(missing(&MEDIA_PATH[..1]));
        }
        let mut media = root;
        for depth in 1..MEDIA_PATH.len() {
            media = child(media, MEDIA_PATH[depth]).ok_or_else(|| missing(&MEDIA_PATH[..=depth]))?;
        }

        let files = child(media, "Files").ok_or_else(|| missing_under("Files"))?;
        let products = children(files, "File")
            .enumerate()
            .map(|(index, node)| parse_product(node, index))
            .collect::<Result<Vec<_>, _>>()?;

        let eulas = child(media, "EULAs").ok_or_else(|| missing_under("EULAs"))?;
        let eulas = children(eulas, "EULA")
            .enumerate()
            .map(|(index, node)| parse_eula(node, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { products, eulas })
    }

    /// Distinct values of `field` among products passing `filter`, sorted.
    pub fn choices(&self, filter: &Filter, field: Field) -> Vec<Choice> {
        let mut seen: BTreeMap<&str, Choice> = BTreeMap::new();
        for entry in self.products.iter().filter(|e| filter.accepts(e)) {
            let choice = seen.entry(entry.field(field)).or_insert_with(|| Choice {
                value: entry.field(field).to_string(),
                label: None,
                files: 0,
            });
            choice.files += 1;
            if choice.label.is_none() {
                choice.label = entry.label(field).map(str::to_string);
            }
        }
        seen.into_values().collect()
    }
}

fn missing(path: &[&str]) -> ParseError {
    ParseError::MissingElement { path: path.join("/") }
}

fn missing_under(name: &'static str) -> ParseError {
    let mut path = MEDIA_PATH.to_vec();
    path.push(name);
    missing(&path)
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(name))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.is_element() && n.has_tag_name(name))
}

/// Field reader for one record. Values come from a child element, or from
/// an attribute of the same name; surrounding whitespace is trimmed.
struct RecordReader<'a, 'input> {
    node: Node<'a, 'input>,
    kind: &'static str,
    index: usize,
}

impl RecordReader<'_, '_> {
    fn optional(&self, field: &'static str) -> Option<String> {
        child(self.node, field)
            .map(|n| n.text().unwrap_or_default())
            .or_else(|| self.node.attribute(field))
            .map(|v| v.trim().to_string())
    }

    fn required(&self, field: &'static str) -> Result<String, ParseError> {
        self.optional(field).ok_or(ParseError::MissingField {
            record: self.kind,
            index: self.index,
            field,
        })
    }

    fn invalid(&self, field: &'static str, value: String, reason: impl ToString) -> ParseError {
        ParseError::InvalidField {
            record: self.kind,
            index: self.index,
            field,
            value,
            reason: reason.to_string(),
        }
    }
}

fn parse_product(node: Node, index: usize) -> Result<ProductEntry, ParseError> {
    let r = RecordReader { node, kind: "File", index };

    let file_path = r.required("FilePath")?;
    if file_path.is_empty() {
        return Err(r.invalid("FilePath", file_path, "empty URL"));
    }

    let size = r.required("Size")?;
    let size = match size.parse::<u64>() {
        Ok(0) => return Err(r.invalid("Size", size, "must be positive")),
        Ok(n) => n,
        Err(e) => return Err(r.invalid("Size", size, e)),
    };

    let sha1 = r.required("Sha1")?;
    let sha1 = sha1.parse::<Sha1Digest>().map_err(|e| r.invalid("Sha1", sha1.clone(), e))?;

    Ok(ProductEntry {
        edition: r.required("Edition")?,
        architecture: r.required("Architecture")?,
        language_code: r.required("LanguageCode")?,
        file_name: r.required("FileName")?,
        file_path,
        size,
        sha1,
        language: r.optional("Language"),
        edition_loc: r.optional("Edition_Loc"),
        architecture_loc: r.optional("Architecture_Loc"),
    })
}

fn parse_eula(node: Node, index: usize) -> Result<EulaEntry, ParseError> {
    let r = RecordReader { node, kind: "EULA", index };
    Ok(EulaEntry {
        language_code: r.required("LanguageCode")?,
        url: r.required("URL")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED";

    fn file(edition: &str, arch: &str, lang: &str) -> String {
        format!(
            "<File><FileName>{edition}_{arch}_{lang}.esd</FileName><LanguageCode>{lang}</LanguageCode>\
             <Language>Lang {lang}</Language><Edition>{edition}</Edition><Architecture>{arch}</Architecture>\
             <Size>1024</Size><Sha1>{SHA}</Sha1>\
             <FilePath>http://dl.example/{edition}_{arch}_{lang}.esd</FilePath></File>"
        )
    }

    fn document(files: &str, eulas: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <MCT><Catalogs><Catalog><PublishedMedia>{files}{eulas}</PublishedMedia></Catalog></Catalogs></MCT>"
        )
    }

    fn eulas() -> &'static str {
        "<EULAs><EULA><LanguageCode>en-us</LanguageCode><URL>http://eula.example/en-us</URL></EULA></EULAs>"
    }

    #[test]
    fn parses_products_and_eulas() {
        let xml = document(
            &format!("<Files>{}{}</Files>", file("Professional", "x64", "en-us"), file("Education", "ARM64", "de-de")),
            eulas(),
        );
        let catalog = Catalog::from_xml(&xml).unwrap();

        assert_eq!(catalog.products.len(), 2);
        let first = &catalog.products[0];
        assert_eq!(first.edition, "Professional");
        assert_eq!(first.size, 1024);
        assert_eq!(first.sha1.to_string(), SHA.to_lowercase());
        assert_eq!(first.language.as_deref(), Some("Lang en-us"));
        assert_eq!(first.edition_loc, None);
        assert_eq!(catalog.eulas, vec![EulaEntry {
            language_code: "en-us".into(),
            url: "http://eula.example/en-us".into(),
        }]);
    }

    #[test]
    fn accepts_byte_order_mark_and_attributes() {
        let xml = format!(
            "\u{feff}{}",
            document(
                "<Files><File Edition=\"Pro\" Architecture=\"x86\" LanguageCode=\"fr-fr\" \
                 FileName=\"a.esd\" Size=\"5\" FilePath=\"http://x/a.esd\">\
                 <Sha1> 2aae6c35c94fcfb415dbe95f408b9ce91ee846ed </Sha1></File></Files>",
                "<EULAs/>",
            )
        );
        let catalog = Catalog::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(catalog.products[0].architecture, "x86");
        assert!(catalog.eulas.is_empty());
    }

    #[test]
    fn missing_eulas_section_is_an_error() {
        let xml = document(&format!("<Files>{}</Files>", file("Pro", "x64", "en-us")), "");
        match Catalog::from_xml(&xml) {
            Err(ParseError::MissingElement { path }) => {
                assert_eq!(path, "MCT/Catalogs/Catalog/PublishedMedia/EULAs");
            }
            other => panic!("expected missing EULAs, got {other:?}"),
        }
    }

    #[test]
    fn missing_files_section_is_an_error() {
        let xml = document("", eulas());
        assert!(matches!(
            Catalog::from_xml(&xml),
            Err(ParseError::MissingElement { path }) if path.ends_with("/Files")
        ));
    }

    #[test]
    fn wrong_root_is_an_error() {
        assert!(matches!(
            Catalog::from_xml("<Products/>"),
            Err(ParseError::MissingElement { path }) if path == "MCT"
        ));
        assert!(matches!(
            Catalog::from_xml("<MCT><Catalogs/></MCT>"),
            Err(ParseError::MissingElement { path }) if path == "MCT/Catalogs/Catalog"
        ));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(Catalog::from_xml("<MCT><Catalogs>"), Err(ParseError::Xml(_))));
        assert!(matches!(Catalog::from_bytes(&[0xff, 0xfe, 0x00]), Err(ParseError::Encoding(_))));
    }

    #[test]
    fn missing_required_field_names_record() {
        let broken = file("Pro", "x64", "en-us").replace("<Edition>Pro</Edition>", "");
        let xml = document(&format!("<Files>{}{broken}</Files>", file("Home", "x64", "en-us")), eulas());
        match Catalog::from_xml(&xml) {
            Err(ParseError::MissingField { record, index, field }) => {
                assert_eq!((record, index, field), ("File", 1, "Edition"));
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            ("<Size>1024</Size>", "<Size>big</Size>", "Size"),
            ("<Size>1024</Size>", "<Size>0</Size>", "Size"),
            ("<Sha1>2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED</Sha1>", "<Sha1>abc</Sha1>", "Sha1"),
            ("<FilePath>http://dl.example/Pro_x64_en-us.esd</FilePath>", "<FilePath> </FilePath>", "FilePath"),
        ];
        for (from, to, expected_field) in cases {
            let entry = file("Pro", "x64", "en-us").replace(from, to);
            let xml = document(&format!("<Files>{entry}</Files>"), eulas());
            match Catalog::from_xml(&xml) {
                Err(ParseError::InvalidField { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("{to}: expected invalid field, got {other:?}"),
            }
        }
    }

    #[test]
    fn choices_are_distinct_and_filtered() {
        let xml = document(
            &format!(
                "<Files>{}{}{}{}</Files>",
                file("Professional", "x64", "en-us"),
                file("Professional", "x64", "de-de"),
                file("Professional", "ARM64", "en-us"),
                file("Education", "x64", "en-us"),
            ),
            eulas(),
        );
        let catalog = Catalog::from_xml(&xml).unwrap();

        let archs = catalog.choices(&Filter::default().edition("Professional"), Field::Architecture);
        let values: Vec<_> = archs.iter().map(|c| (c.value.as_str(), c.files)).collect();
        assert_eq!(values, vec![("ARM64", 1), ("x64", 2)]);

        let langs = catalog.choices(&Filter::default(), Field::LanguageCode);
        assert_eq!(langs[0].value, "de-de");
        assert_eq!(langs[0].label.as_deref(), Some("Lang de-de"));
        assert_eq!(langs[1].files, 3);
    }
}
