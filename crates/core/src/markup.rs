//! Text and link extraction from the HTML fragments embedded in upstream cells.

use std::sync::LazyLock;

use scraper::{Html, Selector};

#[expect(clippy::unwrap_used, reason = "static selector is compile-time validated")]
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// First `<a>` element of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    /// Anchor text with runs of whitespace collapsed to one space.
    pub text: String,
    /// `href` attribute, empty when missing.
    pub href: String,
}

/// Returns the first anchor of `fragment`, if any.
#[must_use]
pub fn first_link(fragment: &str) -> Option<Link> {
    let html = Html::parse_fragment(fragment);
    let anchor = html.select(&ANCHOR_SELECTOR).next()?;
    let text = collapse_whitespace(&anchor.text().collect::<String>());
    let href = anchor.value().attr("href").unwrap_or("").trim().to_owned();
    Some(Link { text, href })
}

/// All text nodes of `fragment`, each trimmed, empties dropped, joined by one space.
#[must_use]
pub fn flatten_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    html.root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_link_extracts_text_and_href() {
        let link =
            first_link(r#"<div><a href="/section/482">Basic RiderCourse</a></div>"#).unwrap();
        assert_eq!(link.text, "Basic RiderCourse");
        assert_eq!(link.href, "/section/482");
    }

    #[test]
    fn first_link_takes_only_the_first_anchor() {
        let link = first_link(r#"<a href="/one">One</a> <a href="/two">Two</a>"#).unwrap();
        assert_eq!(link.text, "One");
        assert_eq!(link.href, "/one");
    }

    #[test]
    fn first_link_collapses_nested_markup() {
        let link = first_link("<a href='x'>\n  Basic <b>Rider</b>\n  Course  </a>").unwrap();
        assert_eq!(link.text, "Basic Rider Course");
    }

    #[test]
    fn first_link_without_href_has_empty_target() {
        let link = first_link("<a>Title only</a>").unwrap();
        assert_eq!(link.text, "Title only");
        assert_eq!(link.href, "");
    }

    #[test]
    fn first_link_absent_for_plain_text() {
        assert_eq!(first_link("Motorcycle class"), None);
        assert_eq!(first_link(""), None);
    }

    #[test]
    fn first_link_decodes_entities() {
        let link = first_link(r#"<a href="/section/1?a=1&amp;b=2">Riders &amp; Co</a>"#).unwrap();
        assert_eq!(link.text, "Riders & Co");
        assert_eq!(link.href, "/section/1?a=1&b=2");
    }

    #[test]
    fn flatten_text_joins_text_nodes_with_spaces() {
        let text = flatten_text("<div>Main Campus<br/>Building 7</div><span> Room 110 </span>");
        assert_eq!(text, "Main Campus Building 7 Room 110");
    }

    #[test]
    fn flatten_text_of_plain_string_is_trimmed() {
        assert_eq!(flatten_text("  Graham, NC  "), "Graham, NC");
        assert_eq!(flatten_text(""), "");
    }
}
