//! Plain text rendition of an article for speech synthesis.

use lazy_static::lazy_static;
use regex::Regex;

use crate::dom::{Document, NodeRef, HEADINGS};

lazy_static! {
    static ref BOILERPLATE: Vec<Regex> = vec![
        Regex::new(r"(?i)^\d+\s*\.\s+[a-zäöü]+\s+\d+,\s+\d+\.\d+\s+uhr(\s*\(update.*\))?$").unwrap(),
        Regex::new(r"(?i)^online\s+seit").unwrap(),
    ];
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figure", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "section", "table", "td", "th", "tr", "ul",
];

fn is_boilerplate(text: &str, keyword: Option<&str>) -> bool {
    BOILERPLATE.iter().any(|pattern| pattern.is_match(text)) || keyword == Some(text)
}

fn ends_sentence(text: &str) -> bool {
    text.ends_with(['.', '!', '?'])
}

/// Text of `node` with a break around every block element, so adjacent
/// paragraphs do not run into each other.
fn spoken_text(node: &NodeRef<'_>, out: &mut String) {
    if node.is_text() {
        out.push_str(&node.text());
        return;
    }
    if node.has_name("script") || node.has_name("style") {
        return;
    }
    let block = BLOCK_ELEMENTS.iter().any(|name| node.has_name(name));
    if block {
        out.push(' ');
    }
    for child in node.children() {
        spoken_text(&child, out);
    }
    if block {
        out.push(' ');
    }
}

/// Drop datelines, the category keyword, galleries, captions and the
/// footer, close headings with a period and flatten whitespace.
pub fn text_for_speech(optimized: &Document, original: &Document) -> String {
    let keyword = original.select_single("div.keyword").text().trim().to_string();
    let keyword = Some(keyword.as_str()).filter(|keyword| !keyword.is_empty());

    let doc = optimized.clone();

    for paragraph in doc.select("p").iter() {
        if is_boilerplate(paragraph.text().trim(), keyword) {
            paragraph.remove();
        }
    }

    doc.select(".slideshow").parent().remove();
    doc.select("figcaption, .story-footer").remove();

    for heading in doc.select(HEADINGS).nodes() {
        let text = heading.text();
        let text = text.trim();
        if !text.is_empty() && !ends_sentence(text) {
            heading.append_child(&doc.tree.new_text("."));
        }
    }

    let mut text = String::new();
    for body in doc.select_single("body").nodes() {
        spoken_text(body, &mut text);
    }
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::body_html;

    #[test]
    fn test_boilerplate_removed() {
        let original = Document::from(r#"<div class="keyword">Ukraine</div>"#);
        let optimized = Document::from(
            "<div><p>12. März 2024, 14.30 Uhr (Update: 15.00 Uhr)</p><p>Online seit heute</p>\
             <p>Ukraine</p><p>Die Lage   bleibt\n angespannt.</p></div>",
        );
        assert_eq!(text_for_speech(&optimized, &original), "Die Lage bleibt angespannt.");
    }

    #[test]
    fn test_headings_get_periods() {
        let original = Document::from("");
        let optimized = Document::from("<h2>Neue Regeln</h2><p>Text</p><h3>Warum?</h3><p>Weil.</p>");
        assert_eq!(text_for_speech(&optimized, &original), "Neue Regeln. Text Warum? Weil.");
    }

    #[test]
    fn test_galleries_captions_and_footer_removed() {
        let original = Document::from("");
        let optimized = Document::from(
            r#"<p>Anfang</p><section><h3>Fotostrecke mit 2 Bildern</h3><div class="slideshow"><img src="a.jpg"></div></section>
               <figure><img src="b.jpg"><figcaption>Bildtext</figcaption></figure>
               <footer class="story-footer">Quelle: APA</footer><p>Ende</p>"#,
        );
        assert_eq!(text_for_speech(&optimized, &original), "Anfang Ende");
    }

    #[test]
    fn test_optimized_document_untouched() {
        let original = Document::from("");
        let optimized = Document::from("<h2>Titel</h2>");
        text_for_speech(&optimized, &original);
        assert_eq!(body_html(&optimized), "<h2>Titel</h2>");
    }

    #[test]
    fn test_adjacent_blocks_are_separated() {
        let original = Document::from("");
        let optimized = Document::from("<p>A</p><p>B</p><ul><li>C</li><li>D</li></ul>");
        assert_eq!(text_for_speech(&optimized, &original), "A B C D");
    }

    #[test]
    fn test_inline_elements_are_not_separated() {
        let original = Document::from("");
        let optimized = Document::from("<p>Wort<b>teil</b> <i>kursiv</i></p><script>x()</script>");
        assert_eq!(text_for_speech(&optimized, &original), "Wortteil kursiv");
    }
}
