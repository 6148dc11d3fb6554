//! Markdown rendering of episode digests.
//!
//! A digest is a heading linking to the episode, its date and summary, and one
//! paragraph per discovery:
//!
//! ```text
//! ## [Episode title](episode url)
//!
//! _2023-10-02_
//!
//! __Summary__
//!
//! ### Discoveries
//!
//! [Foo](http://a) -- description of foo
//!
//!
//! ---
//! ```
//!
//! Fields are interpolated as-is; Markdown metacharacters in titles, URLs or
//! descriptions are not escaped.

use std::fmt::Write;

use tracing::debug;

use discodigest_shared::{Discovery, EnrichedEntry};

/// Render an enriched entry to its digest document.
///
/// The output depends only on `entry`, so equal entries render byte-identically.
pub fn render(entry: &EnrichedEntry) -> String {
    let e = &entry.entry;
    let discoveries = render_discoveries(&entry.discoveries);

    let markdown = format!(
        "## [{title}]({url})\n\n_{date}_\n\n__{summary}__\n\n### Discoveries\n\n{discoveries}\n---\n\n",
        title = e.title,
        url = e.url,
        date = e.date,
        summary = e.summary,
    );

    debug!(
        title = %e.title,
        discoveries = entry.discoveries.len(),
        len = markdown.len(),
        "digest rendered"
    );

    markdown
}

/// One `[title](url) -- description` paragraph per discovery.
fn render_discoveries(discoveries: &[Discovery]) -> String {
    let mut out = String::new();
    for d in discoveries {
        // Writing to a String cannot fail.
        let _ = write!(out, "[{}]({}) -- {}\n\n", d.title, d.url, d.description);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use discodigest_shared::{Description, FeedEntry};

    fn entry(discoveries: Vec<Discovery>) -> EnrichedEntry {
        EnrichedEntry {
            entry: FeedEntry {
                title: "Late Night Linux – Episode 250".into(),
                date: "2023-10-02".into(),
                url: "https://latenightlinux.com/late-night-linux-episode-250/".into(),
                summary: "News, discoveries, and feedback.".into(),
                content_html: "<p>ignored</p>".into(),
            },
            discoveries,
        }
    }

    fn discovery(title: &str, url: &str, description: Description) -> Discovery {
        Discovery {
            title: title.into(),
            url: url.into(),
            description,
        }
    }

    #[test]
    fn renders_full_template() {
        let e = entry(vec![
            discovery("Foo", "http://a", Description::Text("A foo tool".into())),
            discovery("Bar", "http://b", Description::Missing),
            discovery("Baz", "http://c", Description::FetchFailed),
        ]);

        let expected = "## [Late Night Linux – Episode 250](https://latenightlinux.com/late-night-linux-episode-250/)\n\
\n\
_2023-10-02_\n\
\n\
__News, discoveries, and feedback.__\n\
\n\
### Discoveries\n\
\n\
[Foo](http://a) -- A foo tool\n\
\n\
[Bar](http://b) -- None\n\
\n\
[Baz](http://c) -- Error\n\
\n\
\n\
---\n\
\n";
        assert_eq!(render(&e), expected);
    }

    #[test]
    fn no_escaping_is_applied() {
        let e = entry(vec![discovery(
            "[weird]_*title*",
            "http://a/(x)",
            Description::Text("uses __bold__ and <b>html</b>".into()),
        )]);
        let md = render(&e);
        assert!(md.contains("[[weird]_*title*](http://a/(x)) -- uses __bold__ and <b>html</b>\n\n"));
    }

    #[test]
    fn empty_discoveries_still_render_frame() {
        let md = render(&entry(vec![]));
        assert!(md.ends_with("### Discoveries\n\n\n---\n\n"));
    }

    #[test]
    fn blank_line_separates_discoveries_from_rule() {
        let md = render(&entry(vec![discovery(
            "Foo",
            "http://a",
            Description::Text("x".into()),
        )]));
        assert!(md.ends_with("### Discoveries\n\n[Foo](http://a) -- x\n\n\n---\n\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = entry(vec![
            discovery("Foo", "http://a", Description::Text("x".into())),
            discovery("Bar", "http://b", Description::Missing),
        ]);
        let b = a.clone();
        assert_eq!(render(&a), render(&b));
        assert_eq!(render(&a), render(&a));
    }
}
