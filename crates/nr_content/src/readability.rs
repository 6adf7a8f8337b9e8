//! Main content extraction on top of `dom_smoothie`, a port of Mozilla's
//! Readability.

use dom_smoothie::{Config, Readability};
use tracing::{debug, warn};

use crate::dom::{body_html, Document};

const PAGE_ID: &str = "readability-page-1";

/// Extract the article body of `html`. Classes in `preserved_classes`
/// survive the extractor's class stripping.
///
/// Returns `None` when the extractor gives up or keeps neither text nor
/// images. The result is always rooted in the
/// `<div id="readability-page-1" class="page">` container.
pub fn extract_main_content(html: &str, url: &str, preserved_classes: &[String]) -> Option<String> {
    let config = Config {
        classes_to_preserve: preserved_classes.to_vec(),
        ..Default::default()
    };

    let article = match Readability::new(html, Some(url), Some(config)).and_then(|mut r| r.parse()) {
        Ok(article) => article,
        Err(e) => {
            warn!(url, error = %e, "Readability extraction failed");
            return None;
        }
    };

    let document = ensure_page_container(Document::from(article.content.to_string()));
    let body = document.select_single("body");
    let has_text = !body.text().trim().is_empty();
    let has_images = body.select("img").exists();
    if !has_text && !has_images {
        debug!(url, "Readability produced an empty article");
        return None;
    }

    Some(body_html(&document))
}

fn ensure_page_container(document: Document) -> Document {
    let body = document.select_single("body");
    let already_wrapped = matches!(
        body.children().nodes(),
        [only] if only.attr("id").as_deref() == Some(PAGE_ID)
    );
    if !already_wrapped {
        let inner = body.inner_html();
        body.set_html(format!(r#"<div id="{PAGE_ID}" class="page">{inner}</div>"#));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        vec!["fact".to_string(), "keyword".to_string(), "slideshow".to_string()]
    }

    #[test]
    fn test_simple_article() {
        let content = extract_main_content("<p>Hello World</p>", "https://orf.at/stories/1", &classes()).unwrap();
        assert_eq!(content, r#"<div id="readability-page-1" class="page"><p>Hello World</p></div>"#);
    }

    #[test]
    fn test_empty_article() {
        assert_eq!(extract_main_content("", "https://orf.at/stories/1", &classes()), None);
    }

    #[test]
    fn test_wraps_bare_output() {
        let document = ensure_page_container(Document::from("<p>One</p>\n<p>Two</p>"));
        assert_eq!(
            body_html(&document),
            "<div id=\"readability-page-1\" class=\"page\"><p>One</p>\n<p>Two</p></div>"
        );
    }

    #[test]
    fn test_existing_container_untouched() {
        let html = r#"<div id="readability-page-1" class="page"><p>One</p></div>"#;
        assert_eq!(body_html(&ensure_page_container(Document::from(html))), html);
    }
}
