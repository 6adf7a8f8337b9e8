//! Site chrome removal before extraction and anchor/list fixes after it.
//! Every stage takes a document and hands it back.

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::dom::Document;

const VIDEO_SECTIONS: &str = "section.stripe, .oon-video";
const VIDEO_CONTENT: &str = "video, iframe, .video";
const VIDEO_CAPTIONS: &str = "figcaption, .caption, .video-caption";

/// Resolve an `href` the way a browser would for a page at `base`.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

pub fn remove_print_warnings(doc: Document) -> Document {
    doc.select(".print-warning").remove();
    doc
}

pub fn remove_more_to_read(doc: Document) -> Document {
    doc.select("#more-to-read").remove();
    doc
}

/// Embedded players and the caption that trails them.
pub fn remove_video_sections(doc: Document) -> Document {
    for section in doc.select(VIDEO_SECTIONS).iter() {
        if !section.select(VIDEO_CONTENT).exists() {
            continue;
        }
        let caption = section.next_sibling();
        if caption.is(VIDEO_CAPTIONS) {
            caption.remove();
        }
        section.remove();
    }
    doc
}

pub fn pre_clean(doc: Document) -> Document {
    let doc = remove_print_warnings(doc);
    let doc = remove_video_sections(doc);
    remove_more_to_read(doc)
}

pub fn remove_navigation(doc: Document) -> Document {
    doc.select("nav").remove();
    doc
}

/// Drop in-page jump links back into the site.
pub fn remove_site_anchors(doc: Document, base: &Url, pattern: &Regex) -> Document {
    for anchor in doc.select("a[href]").iter() {
        let Some(resolved) = anchor.attr("href").and_then(|href| resolve_href(base, &href)) else {
            continue;
        };
        if pattern.is_match(resolved.as_str()) {
            debug!(href = %resolved, "Removing site anchor");
            anchor.remove();
        }
    }
    doc
}

/// Append a copy of the original page's `.story-footer`, if it has one.
pub fn inject_story_footer(doc: Document, original: &Document) -> Document {
    let footer = original.select_single(".story-footer");
    if footer.exists() {
        doc.select_single("body").append_html(footer.html());
    }
    doc
}

pub fn adjust_anchors(doc: Document) -> Document {
    let anchors = doc.select("a");
    anchors.set_attr("target", "_blank");
    anchors.set_attr("rel", "noopener noreferrer");
    doc
}

pub fn remove_empty_list_items(doc: Document) -> Document {
    for item in doc.select("li").iter() {
        if item.inner_html().trim().is_empty() {
            item.remove();
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::body_html;

    fn base() -> Url {
        Url::parse("https://orf.at/stories/3300000/").unwrap()
    }

    #[test]
    fn test_pre_clean() {
        let html = r#"<div class="print-warning">Drucken</div>
            <section class="stripe"><div class="video"></div></section><p class="caption">Video</p>
            <section class="stripe"><p>Kein Video</p></section>
            <div id="more-to-read"><a href="/stories/1">Mehr</a></div>
            <p>Text</p>"#;
        let body = body_html(&pre_clean(Document::from(html)));

        assert!(!body.contains("Drucken"));
        assert!(!body.contains(">Video</p>"));
        assert!(!body.contains("class=\"video\""));
        assert!(body.contains("Kein Video"));
        assert!(!body.contains("more-to-read"));
        assert!(body.contains("<p>Text</p>"));
    }

    #[test]
    fn test_video_caption_only_removed_next_to_video() {
        let html = r#"<div class="oon-video"><iframe src="https://player"></iframe></div><figcaption>Cap</figcaption>
            <figure><img src="a.jpg"></figure><figcaption>Bild</figcaption>"#;
        let body = body_html(&remove_video_sections(Document::from(html)));
        assert!(!body.contains("Cap"));
        assert!(body.contains("Bild"));
    }

    #[test]
    fn test_remove_site_anchors() {
        let html = r##"<p><a href="#top">Nach oben</a><a href="https://wien.orf.at/stories/1#c">Kommentar</a>
            <a href="https://orf.at/stories/2">Story</a><a>Leer</a></p>"##;
        let pattern = Regex::new(r"(?i)orf\.at.*#").unwrap();
        let body = body_html(&remove_site_anchors(Document::from(html), &base(), &pattern));

        assert!(!body.contains("Nach oben"));
        assert!(!body.contains("Kommentar"));
        assert!(body.contains("Story"));
        assert!(body.contains("Leer"));
    }

    #[test]
    fn test_inject_story_footer_keeps_original() {
        let original = Document::from(r#"<article><footer class="story-footer">Quelle: APA</footer></article>"#);
        let doc = inject_story_footer(Document::from("<p>Text</p>"), &original);

        assert_eq!(body_html(&doc), r#"<p>Text</p><footer class="story-footer">Quelle: APA</footer>"#);
        assert!(body_html(&original).contains("story-footer"));
    }

    #[test]
    fn test_no_footer_no_change() {
        let doc = inject_story_footer(Document::from("<p>Text</p>"), &Document::from("<p>Other</p>"));
        assert_eq!(body_html(&doc), "<p>Text</p>");
    }

    #[test]
    fn test_adjust_anchors_and_empty_items() {
        let html = r#"<ul><li><a href="https://orf.at">orf</a></li><li> </li><li></li></ul>"#;
        let doc = remove_empty_list_items(adjust_anchors(Document::from(html)));
        assert_eq!(
            body_html(&doc),
            r#"<ul><li><a href="https://orf.at" target="_blank" rel="noopener noreferrer">orf</a></li></ul>"#
        );
    }

    #[test]
    fn test_remove_navigation() {
        let doc = remove_navigation(Document::from("<nav><a href=\"/\">Home</a></nav><p>Text</p>"));
        assert_eq!(body_html(&doc), "<p>Text</p>");
    }
}
