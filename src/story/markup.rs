//! Markup host parsing and the story scraper.
//!
//! The parser is lenient in the ways real pages need: HTML void elements,
//! valueless attributes (`<div data-storie>`), and stray end tags. Text
//! content is dropped; the scraper reads only attributes.
//!
//! Markup contract:
//!
//! ```html
//! <section id="stories">
//!   <div data-storie data-order="1">
//!     <span data-author="ana"></span>
//!     <time data-dataposted="2024-05-01T12:00:00Z"></time>
//!     <img data-image="https://cdn.example/1.jpg">
//!   </div>
//! </section>
//! ```
//!
//! Grouped hosts wrap entries in `data-storie-group` containers, and entries
//! may carry a `data-avatar` field.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{parse_timestamp, Story, StoryCollection, StoryGroup};
use crate::carousel::error::{CarouselError, CarouselResult};

/// Elements that never have content or an end tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Attribute marking a story entry.
pub const ENTRY_ATTR: &str = "data-storie";

/// Attribute marking a group container (nested variant).
pub const GROUP_ATTR: &str = "data-storie-group";

/// A parsed element. Attribute names and tag names are lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

/// A parsed markup document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

/// The selector forms hosts are located with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector<'a> {
    Id(&'a str),
    Class(&'a str),
    Attr(&'a str),
    Tag(&'a str),
}

impl<'a> Selector<'a> {
    fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        if let Some(id) = raw.strip_prefix('#') {
            Selector::Id(id)
        } else if let Some(class) = raw.strip_prefix('.') {
            Selector::Class(class)
        } else if let Some(attr) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Selector::Attr(attr.trim())
        } else {
            Selector::Tag(raw)
        }
    }
}

impl Element {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Attribute value by (lowercase) name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.iter().any(|(k, _)| k == key)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn matches(&self, selector: Selector<'_>) -> bool {
        match selector {
            Selector::Id(id) => self.attr("id") == Some(id),
            Selector::Class(class) => self.has_class(class),
            Selector::Attr(attr) => self.has_attr(&attr.to_ascii_lowercase()),
            Selector::Tag(tag) => self.name.eq_ignore_ascii_case(tag),
        }
    }

    /// Descendants in document order (the element itself excluded).
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(el.children.iter().rev());
        }
        out
    }

    /// First descendant matching `selector` (`#id`, `.class`, `[attr]`, `tag`).
    pub fn select(&self, selector: &str) -> Option<&Element> {
        let selector = Selector::parse(selector);
        self.descendants().into_iter().find(|el| el.matches(selector))
    }

    /// Every descendant matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Vec<&Element> {
        let selector = Selector::parse(selector);
        self.descendants()
            .into_iter()
            .filter(|el| el.matches(selector))
            .collect()
    }
}

impl Document {
    /// Parse markup into an element tree.
    pub fn parse(markup: &str) -> CarouselResult<Self> {
        let mut reader = Reader::from_str(markup);
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut stack = vec![Element::named("#document")];
        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let el = element_from(&start, reader.decoder());
                    if VOID_ELEMENTS.contains(&el.name.as_str()) {
                        attach(&mut stack, el);
                    } else {
                        stack.push(el);
                    }
                }
                Ok(Event::Empty(start)) => {
                    let el = element_from(&start, reader.decoder());
                    attach(&mut stack, el);
                }
                Ok(Event::End(end)) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase();
                    // Close everything up to the nearest matching open element;
                    // end tags with no open match are dropped.
                    if let Some(pos) = stack.iter().rposition(|el| el.name == name) {
                        if pos > 0 {
                            close_to(&mut stack, pos);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(CarouselError::Markup(format!(
                        "at byte {}: {e}",
                        reader.buffer_position()
                    )))
                }
            }
        }
        close_to(&mut stack, 1);

        let root = stack.pop().unwrap_or_else(|| Element::named("#document"));
        Ok(Self { root })
    }

    /// The synthetic document root.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First element in the document matching `selector`.
    pub fn select(&self, selector: &str) -> Option<&Element> {
        self.root.select(selector)
    }

    /// Locate the carousel host. No selector means the whole document.
    pub fn host(&self, selector: Option<&str>) -> CarouselResult<&Element> {
        match selector {
            None => Ok(&self.root),
            Some(sel) => self
                .select(sel)
                .ok_or_else(|| CarouselError::HostNotFound(sel.to_string())),
        }
    }
}

fn element_from(start: &BytesStart<'_>, decoder: Decoder) -> Element {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let attributes = start
        .html_attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            let value = attr
                .decode_and_unescape_value(decoder)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect();
    Element {
        name,
        attributes,
        children: Vec::new(),
    }
}

fn attach(stack: &mut [Element], el: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(el);
    }
}

/// Pop open elements until only `keep` remain, attaching each to its parent.
fn close_to(stack: &mut Vec<Element>, keep: usize) {
    while stack.len() > keep.max(1) {
        if let Some(el) = stack.pop() {
            attach(stack, el);
        }
    }
}

/// Scrape the stories declared inside `host`.
///
/// Hosts containing `data-storie-group` containers produce a grouped
/// collection; otherwise every `data-storie` entry forms one flat run.
/// Grouped hosts must not nest containers or leave entries outside them.
pub fn scrape(host: &Element) -> CarouselResult<StoryCollection> {
    let group_selector = format!("[{GROUP_ATTR}]");
    let entry_selector = format!("[{ENTRY_ATTR}]");
    let containers = host.select_all(&group_selector);

    if containers.is_empty() {
        let entries = host.select_all(&entry_selector);
        if entries.is_empty() {
            return Err(CarouselError::NoStories);
        }
        let stories = entries
            .iter()
            .enumerate()
            .map(|(i, el)| read_entry(i, el))
            .collect::<CarouselResult<Vec<_>>>()?;
        return StoryCollection::flat(stories);
    }

    if containers.iter().any(|c| c.select(&group_selector).is_some()) {
        return Err(CarouselError::Markup(format!("nested {GROUP_ATTR} containers")));
    }
    let grouped: usize = containers
        .iter()
        .map(|c| c.select_all(&entry_selector).len())
        .sum();
    let loose = host.select_all(&entry_selector).len() - grouped;
    if loose > 0 {
        return Err(CarouselError::Markup(format!(
            "{loose} {ENTRY_ATTR} entries outside any {GROUP_ATTR} container"
        )));
    }

    let mut entry = 0;
    let mut groups = Vec::with_capacity(containers.len());
    for container in containers {
        let mut stories = Vec::new();
        for el in container.select_all(&entry_selector) {
            stories.push(read_entry(entry, el)?);
            entry += 1;
        }
        groups.push(StoryGroup {
            author: container.attr("data-author").map(str::to_string),
            stories,
        });
    }
    StoryCollection::grouped(groups)
}

fn read_entry(entry: usize, el: &Element) -> CarouselResult<Story> {
    let require = |field: &'static str| {
        data_field(el, field)
            .filter(|v| !v.trim().is_empty())
            .ok_or(CarouselError::MissingField { entry, field })
    };

    let author = require("author")?;
    let posted = require("dataposted")?;
    let posted_at = parse_timestamp(&posted).ok_or_else(|| CarouselError::InvalidTimestamp {
        entry,
        value: posted.clone(),
    })?;
    let image = require("image")?;
    let avatar = data_field(el, "avatar").filter(|v| !v.trim().is_empty());
    let order = el
        .attr("data-order")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(entry as i64);

    Ok(Story {
        order,
        author,
        posted_at,
        image,
        avatar,
    })
}

/// `data-<field>` from the entry itself or its first descendant carrying it.
fn data_field(el: &Element, field: &str) -> Option<String> {
    let key = format!("data-{field}");
    el.attr(&key)
        .or_else(|| el.select(&format!("[{key}]")).and_then(|d| d.attr(&key)))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"<!DOCTYPE html>
<html>
<body>
  <header><img src="logo.png"><br></header>
  <section id="stories" class="feed dark">
    <div data-storie data-order="2">
      <span data-author="ana">Ana</span>
      <time data-dataposted="2024-05-01T12:00:00Z"></time>
      <img data-image="https://cdn.example/1.jpg">
    </div>
    <div data-storie data-order="1">
      <span data-author="ben"></span>
      <time data-dataposted="2024-05-01 09:00:00"></time>
      <img data-image="https://cdn.example/2.jpg" data-avatar="ben.png" />
    </div>
  </section>
</body>
</html>"#;

    #[test]
    fn parse_tolerates_html() {
        let doc = Document::parse(FLAT).unwrap();
        let section = doc.root().select("section").unwrap();
        assert_eq!(section.attr("id"), Some("stories"));
        // Void <img> and <br> did not swallow the section.
        let header = doc.root().select("header").unwrap();
        assert_eq!(header.children.len(), 2);
    }

    #[test]
    fn selectors() {
        let doc = Document::parse(FLAT).unwrap();
        assert!(doc.root().select("#stories").is_some());
        assert!(doc.root().select(".dark").is_some());
        assert!(doc.root().select(".light").is_none());
        assert_eq!(doc.root().select_all("[data-storie]").len(), 2);
        assert_eq!(doc.root().select_all("IMG").len(), 3);
    }

    #[test]
    fn host_lookup() {
        let doc = Document::parse(FLAT).unwrap();
        assert_eq!(doc.host(Some("#stories")).unwrap().name, "section");
        assert_eq!(doc.host(None).unwrap().name, "#document");
        assert_eq!(
            doc.host(Some("#missing")),
            Err(CarouselError::HostNotFound("#missing".into()))
        );
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let doc = Document::parse("<div id=\"a\"></span><p></p></div>").unwrap();
        let div = doc.root().select("#a").unwrap();
        assert_eq!(div.children.len(), 1);
        assert_eq!(div.children[0].name, "p");
    }

    #[test]
    fn scrape_flat_keeps_insertion_order() {
        let doc = Document::parse(FLAT).unwrap();
        let stories = scrape(doc.host(Some("#stories")).unwrap()).unwrap();
        assert!(!stories.is_grouped());
        assert_eq!(stories.total(), 2);

        let first = stories.story(0, 0).unwrap();
        assert_eq!(first.author, "ana");
        assert_eq!(first.order, 2);
        assert_eq!(first.image, "https://cdn.example/1.jpg");
        assert!(first.avatar.is_none());

        let second = stories.story(0, 1).unwrap();
        assert_eq!(second.author, "ben");
        assert_eq!(second.avatar.as_deref(), Some("ben.png"));
    }

    #[test]
    fn scrape_grouped() {
        let markup = r#"
<div id="host">
  <div data-storie-group data-author="ana">
    <div data-storie data-author="ana" data-dataposted="2024-05-01" data-image="a1.jpg"
         data-avatar="ana.png"></div>
    <div data-storie data-author="ana" data-dataposted="2024-05-02" data-image="a2.jpg"></div>
  </div>
  <div data-storie-group></div>
  <div data-storie-group data-author="ben">
    <div data-storie data-author="ben" data-dataposted="2024-05-03" data-image="b1.jpg"></div>
  </div>
</div>"#;
        let doc = Document::parse(markup).unwrap();
        let stories = scrape(doc.host(Some("#host")).unwrap()).unwrap();
        assert!(stories.is_grouped());
        assert_eq!(stories.group_count(), 2);
        assert_eq!(stories.group_len(0), 2);
        assert_eq!(stories.group_label(1), Some("ben"));
        assert_eq!(stories.story(1, 0).unwrap().image, "b1.jpg");
    }

    #[test]
    fn scrape_rejects_loose_entries_beside_groups() {
        let markup = r#"
<div id="host">
  <div data-storie data-author="ana" data-dataposted="2024-05-01" data-image="a.jpg"></div>
  <div data-storie-group>
    <div data-storie data-author="ben" data-dataposted="2024-05-02" data-image="b.jpg"></div>
  </div>
</div>"#;
        let doc = Document::parse(markup).unwrap();
        let err = scrape(doc.host(Some("#host")).unwrap()).unwrap_err();
        assert!(matches!(err, CarouselError::Markup(msg) if msg.contains("outside")));
    }

    #[test]
    fn scrape_rejects_nested_groups() {
        let markup = r#"
<div id="host">
  <div data-storie-group>
    <div data-storie-group>
      <div data-storie data-author="ben" data-dataposted="2024-05-02" data-image="b.jpg"></div>
    </div>
  </div>
</div>"#;
        let doc = Document::parse(markup).unwrap();
        let err = scrape(doc.host(Some("#host")).unwrap()).unwrap_err();
        assert!(matches!(err, CarouselError::Markup(msg) if msg.contains("nested")));
    }

    #[test]
    fn scrape_without_entries() {
        let doc = Document::parse("<div id=\"host\"><p>nothing</p></div>").unwrap();
        assert_eq!(
            scrape(doc.host(Some("#host")).unwrap()),
            Err(CarouselError::NoStories)
        );
    }

    #[test]
    fn scrape_missing_field() {
        let markup = r#"
<div data-storie>
  <span data-author="ana"></span>
  <img data-image="a.jpg">
</div>"#;
        let doc = Document::parse(markup).unwrap();
        assert_eq!(
            scrape(doc.root()),
            Err(CarouselError::MissingField {
                entry: 0,
                field: "dataposted"
            })
        );
    }

    #[test]
    fn scrape_blank_field_counts_as_missing() {
        let markup =
            r#"<div data-storie data-author="  " data-dataposted="2024-05-01" data-image="a.jpg">"#;
        let doc = Document::parse(markup).unwrap();
        assert!(matches!(
            scrape(doc.root()),
            Err(CarouselError::MissingField { field: "author", .. })
        ));
    }

    #[test]
    fn scrape_invalid_timestamp() {
        let markup =
            r#"<div data-storie data-author="ana" data-dataposted="last week" data-image="a.jpg">"#;
        let doc = Document::parse(markup).unwrap();
        assert!(matches!(
            scrape(doc.root()),
            Err(CarouselError::InvalidTimestamp { entry: 0, .. })
        ));
    }

    #[test]
    fn escaped_attribute_values() {
        let markup = r#"
<div data-storie data-author="Ana &amp; Ben" data-dataposted="2024-05-01"
     data-image="a.jpg?x=1&amp;y=2"></div>"#;
        let doc = Document::parse(markup).unwrap();
        let stories = scrape(doc.root()).unwrap();
        let story = stories.story(0, 0).unwrap();
        assert_eq!(story.author, "Ana & Ben");
        assert_eq!(story.image, "a.jpg?x=1&y=2");
    }
}
