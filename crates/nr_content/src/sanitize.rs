//! Allow-list HTML sanitizer applied to extracted content before it leaves
//! the pipeline.

use ammonia::Builder;

fn builder() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .add_tags(&["section", "picture", "source"])
        .add_generic_attributes(&["id", "class", "target"])
        .add_tag_attributes("img", &["srcset", "loading", "sizes"])
        .add_tag_attributes("source", &["srcset", "type", "media", "sizes"])
        .rm_generic_attributes(&["tabindex"]);
    builder
}

/// Strip everything outside the allow-list. Anchors always leave with
/// `rel="noopener noreferrer"`.
pub fn sanitize_html(html: &str) -> String {
    builder().clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_page_wrapper() {
        let html = r#"<div id="readability-page-1" class="page"><p>Hello World</p></div>"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_strips_scripts_and_handlers() {
        let html = r#"<p onclick="steal()">Text<script>alert(1)</script></p><style>p{}</style>"#;
        assert_eq!(sanitize_html(html), "<p>Text</p>");
    }

    #[test]
    fn test_keeps_target_and_drops_tabindex() {
        let html = r#"<a href="https://orf.at/stories/1" target="_blank" tabindex="3">Link</a>"#;
        let clean = sanitize_html(html);
        assert!(clean.contains(r#"target="_blank""#));
        assert!(clean.contains(r#"rel="noopener noreferrer""#));
        assert!(!clean.contains("tabindex"));
    }

    #[test]
    fn test_keeps_lazy_images() {
        let html = r#"<img src="https://orf.at/a.jpg" srcset="https://orf.at/a.jpg 1x" loading="lazy">"#;
        let clean = sanitize_html(html);
        assert!(clean.contains(r#"srcset="https://orf.at/a.jpg 1x""#));
        assert!(clean.contains(r#"loading="lazy""#));
    }

    #[test]
    fn test_drops_javascript_urls() {
        let clean = sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!clean.contains("javascript"));
    }
}
