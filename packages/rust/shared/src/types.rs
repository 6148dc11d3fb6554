//! Core domain types for discodigest.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// FeedEntry
// ---------------------------------------------------------------------------

/// One item (episode) of the podcast feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Episode title.
    pub title: String,
    /// Publication date as `YYYY-MM-DD`.
    pub date: String,
    /// Canonical episode page.
    pub url: String,
    /// Short summary (the item's `<description>`).
    pub summary: String,
    /// Show-notes HTML (the item's `<content:encoded>`).
    pub content_html: String,
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

/// Result of looking up the description of a discovered page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Description {
    /// The page's `<meta name="description">` content, verbatim.
    Text(String),
    /// The page was fetched but carries no usable description.
    Missing,
    /// The page could not be fetched.
    FetchFailed,
}

impl Description {
    /// The description text, if one was found.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Missing | Self::FetchFailed => None,
        }
    }

    /// Whether this is one of the two sentinels.
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

impl std::fmt::Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Missing => f.write_str("None"),
            Self::FetchFailed => f.write_str("Error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// A titled link from an entry's discoveries section, with its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub title: String,
    pub url: String,
    pub description: Description,
}

// ---------------------------------------------------------------------------
// DiscoveryLinks
// ---------------------------------------------------------------------------

/// Ordered title → URL mapping produced by the show-notes scanner.
///
/// Iteration follows the order in which titles were first inserted.
/// Re-inserting a title replaces its URL in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryLinks {
    links: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl DiscoveryLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link. Returns the URL it replaced, if the title was already present.
    pub fn insert(&mut self, title: impl Into<String>, url: impl Into<String>) -> Option<String> {
        let title = title.into();
        let url = url.into();

        match self.positions.get(&title) {
            Some(&idx) => Some(std::mem::replace(&mut self.links[idx].1, url)),
            None => {
                self.positions.insert(title.clone(), self.links.len());
                self.links.push((title, url));
                None
            }
        }
    }

    /// URL recorded for `title`.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.positions
            .get(title)
            .map(|&idx| self.links[idx].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// `(title, url)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(t, u)| (t.as_str(), u.as_str()))
    }
}

impl<T: Into<String>, U: Into<String>> FromIterator<(T, U)> for DiscoveryLinks {
    fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
        let mut links = Self::new();
        for (title, url) in iter {
            links.insert(title, url);
        }
        links
    }
}

impl IntoIterator for DiscoveryLinks {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

// ---------------------------------------------------------------------------
// EnrichedEntry
// ---------------------------------------------------------------------------

/// A feed entry together with its resolved discoveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedEntry {
    pub entry: FeedEntry,
    /// Discoveries in scan order; titles are unique.
    pub discoveries: Vec<Discovery>,
}

impl EnrichedEntry {
    pub fn discovery_count(&self) -> usize {
        self.discoveries.len()
    }
}
