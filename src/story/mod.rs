//! Story data: the slides a carousel walks through.
//!
//! A collection is either a flat run of stories or an ordered list of
//! author groups. The shape is decided once, at load time, and navigation
//! branches on the tag instead of probing the data on every step.
//!
//! Explicit data files are YAML or JSON:
//!
//! ```yaml
//! # flat
//! - author: ana
//!   posted_at: 2024-05-01T12:00:00Z
//!   image: https://cdn.example/1.jpg
//!
//! # grouped
//! - author: ana
//!   stories:
//!     - { author: ana, posted_at: 2024-05-01, image: a.jpg, avatar: ana.png }
//! ```

pub mod markup;
pub mod time_ago;

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::carousel::error::{CarouselError, CarouselResult};
use markup::Document;

/// One slide's content. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    /// Declared order. Informational only; slides keep insertion order.
    pub order: i64,
    pub author: String,
    pub posted_at: DateTime<Utc>,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Stories belonging to one author or session (nested variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryGroup {
    /// Display label for the group, if the source names one.
    pub author: Option<String>,
    pub stories: Vec<Story>,
}

/// The carousel's slides, resolved once into one of two shapes.
///
/// Build through [`StoryCollection::flat`] / [`StoryCollection::grouped`]
/// to guarantee the collection (and every group) is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryCollection {
    Flat { stories: Vec<Story> },
    Grouped { groups: Vec<StoryGroup> },
}

impl StoryCollection {
    /// A flat collection. Fails on an empty list.
    pub fn flat(stories: Vec<Story>) -> CarouselResult<Self> {
        if stories.is_empty() {
            return Err(CarouselError::NoStories);
        }
        Ok(Self::Flat { stories })
    }

    /// A grouped collection. Empty groups are dropped; fails if none remain.
    pub fn grouped(groups: Vec<StoryGroup>) -> CarouselResult<Self> {
        let groups: Vec<StoryGroup> = groups
            .into_iter()
            .filter(|g| !g.stories.is_empty())
            .collect();
        if groups.is_empty() {
            return Err(CarouselError::NoStories);
        }
        Ok(Self::Grouped { groups })
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Grouped { .. })
    }

    /// Number of groups (1 for a flat collection).
    pub fn group_count(&self) -> usize {
        match self {
            Self::Flat { .. } => 1,
            Self::Grouped { groups } => groups.len(),
        }
    }

    /// Number of slides in `group`, or 0 when the group does not exist.
    pub fn group_len(&self, group: usize) -> usize {
        match self {
            Self::Flat { stories } if group == 0 => stories.len(),
            Self::Flat { .. } => 0,
            Self::Grouped { groups } => groups.get(group).map_or(0, |g| g.stories.len()),
        }
    }

    /// Total number of slides across all groups.
    pub fn total(&self) -> usize {
        match self {
            Self::Flat { stories } => stories.len(),
            Self::Grouped { groups } => groups.iter().map(|g| g.stories.len()).sum(),
        }
    }

    /// Look up a slide.
    pub fn story(&self, group: usize, index: usize) -> Option<&Story> {
        match self {
            Self::Flat { stories } if group == 0 => stories.get(index),
            Self::Flat { .. } => None,
            Self::Grouped { groups } => groups.get(group)?.stories.get(index),
        }
    }

    /// The group's display label, if any.
    pub fn group_label(&self, group: usize) -> Option<&str> {
        match self {
            Self::Flat { .. } => None,
            Self::Grouped { groups } => groups.get(group)?.author.as_deref(),
        }
    }

    /// Parse explicit story data from YAML.
    pub fn from_yaml(content: &str) -> CarouselResult<Self> {
        let data: StoriesYaml =
            serde_yaml::from_str(content).map_err(|e| CarouselError::Data(e.to_string()))?;
        data.into_collection()
    }

    /// Parse explicit story data from JSON.
    pub fn from_json(content: &str) -> CarouselResult<Self> {
        let data: StoriesYaml =
            serde_json::from_str(content).map_err(|e| CarouselError::Data(e.to_string()))?;
        data.into_collection()
    }

    /// Load a `.yaml`/`.yml`/`.json` data file.
    pub fn load(path: &Path) -> CarouselResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match DataFormat::of(path) {
            Some(DataFormat::Yaml) => Self::from_yaml(&content),
            Some(DataFormat::Json) => Self::from_json(&content),
            None => Err(CarouselError::Data(format!(
                "not a story data file: {}",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Yaml,
    Json,
}

impl DataFormat {
    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where the stories come from: explicit data, or markup to scrape.
#[derive(Debug, Clone)]
pub enum StorySource {
    /// A markup document; the carousel host is located inside it and scraped.
    Markup(Document),
    /// An explicit, already-resolved collection.
    Data(StoryCollection),
}

impl StorySource {
    /// Load a source file. `.yaml`/`.yml`/`.json` are explicit data;
    /// anything else is parsed as markup.
    pub fn open(path: &Path) -> CarouselResult<Self> {
        if DataFormat::of(path).is_some() {
            return Ok(Self::Data(StoryCollection::load(path)?));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::Markup(Document::parse(&content)?))
    }
}

/// Parse a posted-at timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS` (or with a `T`), and bare
/// dates. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
struct StoryYaml {
    #[serde(default)]
    order: Option<i64>,
    author: String,
    #[serde(alias = "dataposted", alias = "postedAt")]
    posted_at: String,
    image: String,
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroupYaml {
    #[serde(default)]
    author: Option<String>,
    stories: Vec<StoryYaml>,
}

/// Groups or a flat list (untagged: the shape decides).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoriesYaml {
    Grouped(Vec<GroupYaml>),
    Flat(Vec<StoryYaml>),
}

impl StoriesYaml {
    fn into_collection(self) -> CarouselResult<StoryCollection> {
        let mut entry = 0;
        let mut convert = |story: StoryYaml| -> CarouselResult<Story> {
            let this = entry;
            entry += 1;
            story.into_story(this)
        };
        match self {
            StoriesYaml::Flat(stories) => {
                let stories = stories
                    .into_iter()
                    .map(&mut convert)
                    .collect::<CarouselResult<Vec<_>>>()?;
                StoryCollection::flat(stories)
            }
            StoriesYaml::Grouped(groups) => {
                let mut out = Vec::with_capacity(groups.len());
                for group in groups {
                    let stories = group
                        .stories
                        .into_iter()
                        .map(&mut convert)
                        .collect::<CarouselResult<Vec<_>>>()?;
                    out.push(StoryGroup {
                        author: group.author,
                        stories,
                    });
                }
                StoryCollection::grouped(out)
            }
        }
    }
}

impl StoryYaml {
    fn into_story(self, entry: usize) -> CarouselResult<Story> {
        let posted_at =
            parse_timestamp(&self.posted_at).ok_or_else(|| CarouselError::InvalidTimestamp {
                entry,
                value: self.posted_at.clone(),
            })?;
        Ok(Story {
            order: self.order.unwrap_or(entry as i64),
            author: self.author,
            posted_at,
            image: self.image,
            avatar: self.avatar,
        })
    }
}
