//! Interactive chart embeds cannot be rendered off-site; each one becomes
//! a plain link back to the story, labelled with the chart's title.

use futures::future::join_all;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use nr_core::Fetcher;

use crate::dom::{Document, NodeRef};

pub struct ChartRules<'a> {
    pub hosts: &'a [String],
    pub fallback_label: &'a str,
}

/// What is known about an embed before its page is fetched.
#[derive(Debug, Clone, PartialEq)]
struct ChartSource {
    src: Option<Url>,
    title_attr: Option<String>,
}

/// Embeds to replace, in document order: the `.datawrapper` wrapper when
/// there is one, else the iframe itself.
fn chart_widgets<'a>(doc: &'a Document, rules: &ChartRules<'_>) -> Vec<(NodeRef<'a>, ChartSource)> {
    let mut widgets: Vec<(NodeRef<'a>, ChartSource)> = Vec::new();
    for iframe in doc.select("iframe[src]").nodes() {
        let src = iframe.attr("src").and_then(|src| Url::parse(&src).ok());
        let is_chart = src
            .as_ref()
            .and_then(|src| src.host_str())
            .map(|host| rules.hosts.iter().any(|h| host.eq_ignore_ascii_case(h)))
            .unwrap_or(false);
        if !is_chart {
            continue;
        }

        let node = iframe
            .ancestors_it(None)
            .find(|ancestor| ancestor.has_class("datawrapper"))
            .unwrap_or_else(|| iframe.clone());
        if widgets.iter().any(|(existing, _)| existing.id == node.id) {
            continue;
        }
        let title_attr = iframe.attr("title").map(|title| title.to_string());
        widgets.push((node, ChartSource { src, title_attr }));
    }
    widgets
}

fn chart_sources(html: &str, rules: &ChartRules<'_>) -> Vec<ChartSource> {
    let doc = Document::from(html);
    chart_widgets(&doc, rules).into_iter().map(|(_, source)| source).collect()
}

/// `og:title`, else `<title>`, of a chart page.
fn page_title(html: &str) -> Option<String> {
    let page = Html::parse_document(html);
    let og_title = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
    let title = Selector::parse("title").ok()?;

    page.select(&og_title)
        .filter_map(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
        .or_else(|| {
            page.select(&title)
                .map(|t| t.text().collect::<String>().trim().to_string())
                .find(|t| !t.is_empty())
        })
}

async fn fetch_title(fetcher: &dyn Fetcher, src: Option<&Url>) -> Option<String> {
    let src = src?;
    match fetcher.fetch_text(src.as_str()).await {
        Ok(html) => page_title(&html),
        Err(e) => {
            warn!(url = %src, error = %e, "Failed to fetch chart metadata");
            None
        }
    }
}

fn apply_labels(html: &str, story_url: &str, labels: &[String], rules: &ChartRules<'_>) -> String {
    let doc = Document::from(html);
    for ((widget, _), label) in chart_widgets(&doc, rules).into_iter().zip(labels) {
        let paragraph = doc.tree.new_element("p");
        let anchor = doc.tree.new_element("a");
        anchor.set_attr("href", story_url);
        anchor.set_text(label.as_str());
        paragraph.append_child(&anchor);
        widget.insert_before(&paragraph);
        widget.remove_from_parent();
    }
    doc.html().to_string()
}

/// Replace every chart embed in `html` with `<p><a href=story_url>label</a></p>`.
/// The label is the chart page's title, else the iframe's `title`, else
/// the fallback label; a failed title fetch never fails the page.
pub async fn replace_chart_widgets(html: String, story_url: &str, fetcher: &dyn Fetcher, rules: &ChartRules<'_>) -> String {
    let sources = chart_sources(&html, rules);
    if sources.is_empty() {
        return html;
    }
    debug!(count = sources.len(), "Replacing chart widgets");

    let titles = join_all(sources.iter().map(|source| fetch_title(fetcher, source.src.as_ref()))).await;
    let labels = sources
        .iter()
        .zip(titles)
        .map(|(source, title)| {
            title
                .or_else(|| source.title_attr.clone().filter(|t| !t.trim().is_empty()))
                .unwrap_or_else(|| rules.fallback_label.to_string())
        })
        .collect::<Vec<_>>();

    apply_labels(&html, story_url, &labels, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::body_html;
    use async_trait::async_trait;
    use nr_core::{Error, Result};
    use std::collections::HashMap;

    struct StubFetcher(HashMap<String, String>);

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Status { url: url.to_string(), status: 404 })
        }
    }

    fn rules() -> (Vec<String>, &'static str) {
        (vec!["datawrapper.dwcdn.net".to_string()], "Grafik")
    }

    #[tokio::test]
    async fn test_charts_become_links() {
        let fetcher = StubFetcher(HashMap::from([(
            "https://datawrapper.dwcdn.net/abc/1/".to_string(),
            r#"<html><head><meta property="og:title" content="Arbeitslosigkeit 2024"><title>DW</title></head></html>"#
                .to_string(),
        )]));
        let html = r#"<p>Vorher</p>
            <div class="datawrapper"><iframe src="https://datawrapper.dwcdn.net/abc/1/"></iframe></div>
            <iframe src="https://datawrapper.dwcdn.net/missing/1/" title="Inflation"></iframe>
            <iframe src="https://datawrapper.dwcdn.net/gone/1/"></iframe>
            <iframe src="https://www.youtube.com/embed/x"></iframe>"#;
        let (hosts, fallback_label) = rules();
        let rules = ChartRules { hosts: &hosts, fallback_label };

        let html = replace_chart_widgets(html.to_string(), "https://orf.at/stories/1", &fetcher, &rules).await;
        let body = body_html(&Document::from(html));

        assert!(body.contains(r#"<p><a href="https://orf.at/stories/1">Arbeitslosigkeit 2024</a></p>"#));
        assert!(body.contains(r#"<p><a href="https://orf.at/stories/1">Inflation</a></p>"#));
        assert!(body.contains(r#"<p><a href="https://orf.at/stories/1">Grafik</a></p>"#));
        assert!(!body.contains("datawrapper"));
        assert!(body.contains("youtube"));
    }

    #[tokio::test]
    async fn test_without_charts_html_is_untouched() {
        let fetcher = StubFetcher(HashMap::new());
        let (hosts, fallback_label) = rules();
        let rules = ChartRules { hosts: &hosts, fallback_label };
        let html = r#"<p>Text <a href="x">&amp;</a></p>"#.to_string();
        assert_eq!(replace_chart_widgets(html.clone(), "https://orf.at/stories/1", &fetcher, &rules).await, html);
    }

    #[test]
    fn test_label_is_escaped() {
        let (hosts, fallback_label) = rules();
        let rules = ChartRules { hosts: &hosts, fallback_label };
        let html = r#"<iframe src="https://datawrapper.dwcdn.net/a/1/"></iframe>"#;
        let out = apply_labels(html, "https://orf.at/stories/1", &["Löhne & Preise <2024>".to_string()], &rules);
        assert!(out.contains(r#"<a href="https://orf.at/stories/1">Löhne &amp; Preise &lt;2024&gt;</a>"#));
    }

    #[test]
    fn test_page_title_falls_back_to_title_tag() {
        assert_eq!(page_title("<title> Wahl </title>"), Some("Wahl".to_string()));
        assert_eq!(page_title("<p>nothing</p>"), None);
    }
}
