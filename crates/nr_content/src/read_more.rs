//! "Weiterlesen" detection: short teaser stories that point at the full
//! article on another part of the site.

use regex::Regex;
use url::Url;

use crate::cleanup::resolve_href;
use crate::dom::Document;

pub struct ReadMoreRules<'a> {
    pub phrases: &'a [Regex],
    pub story_url: &'a Regex,
    pub paragraph_limit: usize,
}

/// URL of the first leading paragraph that reads like "mehr dazu in ..."
/// and links to a story page.
pub fn find_read_more_url(original: &Document, base: &Url, rules: &ReadMoreRules<'_>) -> Option<String> {
    original
        .select("p")
        .iter()
        .take(rules.paragraph_limit)
        .filter(|p| {
            let text = p.text();
            rules.phrases.iter().any(|phrase| phrase.is_match(&text))
        })
        .filter_map(|p| {
            let href = p.select_single("a").attr("href")?;
            resolve_href(base, &href)
        })
        .map(String::from)
        .find(|url| rules.story_url.is_match(url))
}

/// Subdomain label of a site URL, e.g. `sport` for `https://sport.orf.at/...`.
pub fn source_from_url(url: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(url)
        .and_then(|captures| captures.name("source"))
        .map(|source| source.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        phrases: Vec<Regex>,
        story_url: Regex,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                phrases: vec![
                    Regex::new(r"(?i)mehr\s+(\w+\s+)*in").unwrap(),
                    Regex::new(r"(?i)lesen\s+(\w+\s+)*mehr").unwrap(),
                ],
                story_url: Regex::new(r"(?i)^https://.*orf\.at/(.+/)?stories/\d+").unwrap(),
            }
        }

        fn rules(&self) -> ReadMoreRules<'_> {
            ReadMoreRules {
                phrases: &self.phrases,
                story_url: &self.story_url,
                paragraph_limit: 4,
            }
        }
    }

    fn base() -> Url {
        Url::parse("https://orf.at/stories/3000001/").unwrap()
    }

    #[test]
    fn test_finds_relative_story_link() {
        let fixture = Fixture::new();
        let doc = Document::from(
            r#"<p>Kurzmeldung.</p><p>Mehr dazu in <a href="https://sport.orf.at/stories/3100000/">sport.ORF.at</a></p>"#,
        );
        assert_eq!(
            find_read_more_url(&doc, &base(), &fixture.rules()),
            Some("https://sport.orf.at/stories/3100000/".to_string())
        );

        let doc = Document::from(r#"<p>Lesen Sie mehr <a href="/stories/3000002/">hier</a></p>"#);
        assert_eq!(
            find_read_more_url(&doc, &base(), &fixture.rules()),
            Some("https://orf.at/stories/3000002/".to_string())
        );
    }

    #[test]
    fn test_ignores_non_story_links_and_late_paragraphs() {
        let fixture = Fixture::new();
        let doc = Document::from(r#"<p>Mehr dazu in <a href="https://orf.at/wetter">Wetter</a></p>"#);
        assert_eq!(find_read_more_url(&doc, &base(), &fixture.rules()), None);

        let doc = Document::from(
            r#"<p>1</p><p>2</p><p>3</p><p>4</p><p>Mehr dazu in <a href="https://orf.at/stories/3000003/">x</a></p>"#,
        );
        assert_eq!(find_read_more_url(&doc, &base(), &fixture.rules()), None);
    }

    #[test]
    fn test_source_from_url() {
        let pattern = Regex::new(r"(?i)^https://(?P<source>\w+)\.orf\.at").unwrap();
        assert_eq!(source_from_url("https://sport.orf.at/stories/1", &pattern), Some("sport".to_string()));
        assert_eq!(source_from_url("https://orf.at/stories/1", &pattern), None);
    }
}
