//! Saved filter definitions backing dynamic collections.
//!
//! A dynamic collection never stores its members. It stores which source
//! systems to draw from plus a set of facet selections and a text filter,
//! and membership is recomputed from the corpus every time the collection
//! is populated.
//!
//! On disk the definition is a small XML document (`<name>.xcc`):
//!
//! ```xml
//! <?xml version="1.0"?>
//! <filter name="Shmups">
//!   <system>snes</system>
//!   <system>megadrive</system>
//!   <genre>SHOOTER</genre>
//!   <ratings>4 STARS</ratings>
//! </filter>
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use retro_shelf_core::Game;

use crate::error::CollectionError;
use crate::facet::{Facet, FacetIndex, FacetKeys};

const SYSTEM_TAG: &str = "system";
const TEXT_TAG: &str = "text";
const ROOT_TAG: &str = "filter";

/// A filter definition: source-system selection AND facet/text match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicFilter {
    name: String,
    path: PathBuf,
    systems: BTreeSet<String>,
    index: FacetIndex,
}

impl DynamicFilter {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create an empty definition and write it to `path`.
    pub fn create(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, CollectionError> {
        let filter = Self::new(name, path);
        filter.save()?;
        Ok(filter)
    }

    /// Create a definition seeded from another list's current filters.
    ///
    /// `source_system` becomes the only selected system when given; callers
    /// pass `None` for collections and group systems so the new filter
    /// spans every system.
    pub fn create_from_system(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        source_system: Option<&str>,
        source_index: &FacetIndex,
    ) -> Result<Self, CollectionError> {
        let mut filter = Self::new(name, path);
        if let Some(system) = source_system {
            filter.systems.insert(system.to_string());
        }
        filter
            .index
            .set_text_filter(source_index.text_filter(), source_index.uses_relevance());
        for (facet, keys) in source_index.selections() {
            for key in keys {
                filter.index.select_unchecked(facet, key);
            }
        }
        filter.save()?;
        Ok(filter)
    }

    /// Load a definition from disk.
    pub fn load(path: &Path) -> Result<Self, CollectionError> {
        let mut filter = Self {
            path: path.to_path_buf(),
            ..Self::default()
        };
        filter.read_from(path)?;
        Ok(filter)
    }

    /// Re-read the definition from its path, replacing the current
    /// selections. Returns `Ok(false)` if the file no longer exists.
    pub fn reload(&mut self) -> Result<bool, CollectionError> {
        if !self.path.exists() {
            return Ok(false);
        }
        let path = self.path.clone();
        self.read_from(&path)?;
        Ok(true)
    }

    fn read_from(&mut self, path: &Path) -> Result<(), CollectionError> {
        let file = fs::File::open(path)?;
        let parsed = parse_definition(std::io::BufReader::new(file))?;

        self.systems = parsed.systems;
        self.index.clear_all_filters();
        self.index.set_text_filter(&parsed.text, false);
        for (facet, key) in parsed.selections {
            self.index.select_unchecked(facet, &key);
        }
        self.name = match parsed.name {
            Some(name) => name,
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        Ok(())
    }

    /// Write the definition atomically to its path.
    pub fn save(&self) -> Result<(), CollectionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("xcc.tmp");
        fs::write(&tmp, self.to_xml())?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\"?>\n");
        xml.push_str(&format!("<{ROOT_TAG} name=\"{}\">\n", escape_xml(&self.name)));
        for system in &self.systems {
            write_tag(&mut xml, SYSTEM_TAG, system);
        }
        if !self.index.text_filter().is_empty() {
            write_tag(&mut xml, TEXT_TAG, self.index.text_filter());
        }
        for &facet in Facet::all() {
            if let Some(keys) = self.index.selected(facet) {
                for key in keys {
                    write_tag(&mut xml, facet.tag(), key);
                }
            }
        }
        xml.push_str(&format!("</{ROOT_TAG}>\n"));
        xml
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &FacetIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut FacetIndex {
        &mut self.index
    }

    pub fn systems(&self) -> &BTreeSet<String> {
        &self.systems
    }

    /// An empty selection selects every system.
    pub fn is_system_selected(&self, system: &str) -> bool {
        self.systems.is_empty() || self.systems.contains(system)
    }

    pub fn set_system_selected(&mut self, system: &str, selected: bool) {
        if selected {
            self.systems.insert(system.to_string());
        } else {
            self.systems.remove(system);
        }
    }

    pub fn reset_system_filter(&mut self) {
        self.systems.clear();
    }

    pub fn is_filtered(&self) -> bool {
        !self.systems.is_empty() || self.index.is_filtered()
    }

    pub fn show_file(&self, game: &Game) -> bool {
        self.matches(game.system_name(), game.name(), &FacetKeys::of(game))
    }

    /// System selection AND facet/text match.
    pub fn matches(&self, system: &str, name: &str, keys: &FacetKeys) -> bool {
        self.is_system_selected(system) && self.index.matches(name, keys)
    }
}

struct ParsedDefinition {
    name: Option<String>,
    systems: BTreeSet<String>,
    text: String,
    selections: Vec<(Facet, String)>,
}

fn parse_definition<R: BufRead>(reader: R) -> Result<ParsedDefinition, CollectionError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut parsed = ParsedDefinition {
        name: None,
        systems: BTreeSet::new(),
        text: String::new(),
        selections: Vec::new(),
    };
    let mut seen_root = false;
    let mut current_tag = String::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if !seen_root {
                    if tag_name != ROOT_TAG {
                        return Err(CollectionError::invalid_filter(format!(
                            "expected <{ROOT_TAG}> root, found <{tag_name}>"
                        )));
                    }
                    seen_root = true;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == b"name" {
                            parsed.name = Some(attr.unescape_value()?.to_string());
                        }
                    }
                } else {
                    current_tag = tag_name;
                }
            }
            Event::Text(ref e) => {
                let text = e.unescape()?.to_string();
                match current_tag.as_str() {
                    SYSTEM_TAG => {
                        parsed.systems.insert(text);
                    }
                    TEXT_TAG => parsed.text = text,
                    "" => {}
                    tag => match Facet::from_tag(tag) {
                        Some(facet) => parsed.selections.push((facet, text)),
                        None => log::debug!("Ignoring unknown filter element <{}>", tag),
                    },
                }
            }
            Event::End(_) => current_tag.clear(),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(CollectionError::invalid_filter("missing <filter> element"));
    }
    Ok(parsed)
}

fn write_tag(xml: &mut String, tag: &str, value: &str) {
    xml.push_str("  <");
    xml.push_str(tag);
    xml.push('>');
    xml.push_str(&escape_xml(value));
    xml.push_str("</");
    xml.push_str(tag);
    xml.push_str(">\n");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[path = "tests/dynamic_filter_tests.rs"]
mod tests;
