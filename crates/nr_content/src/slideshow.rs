//! Re-inject photo galleries that readability drops.
//!
//! The original page carries `.oon-slideshow` containers with lazy images;
//! the extracted article only keeps their `Fotostrecke mit ...` headers.
//! Galleries and headers are paired by position when their counts agree.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::dom::{Document, Selection};

lazy_static! {
    static ref SLIDESHOW_HEADER: Regex = Regex::new(r"(?i)^fotostrecke mit").unwrap();
}

/// True when some `h3` under the header's parent is directly followed by a `div`.
fn has_injected_gallery(header: &Selection) -> bool {
    header
        .parent()
        .select("h3")
        .iter()
        .any(|h3| h3.next_sibling().is("div"))
}

fn prepare_gallery(list: &Selection) {
    list.set_attr("class", "slideshow");
    list.select("figure > footer").remove();

    for image in list.select("img").iter() {
        let src = image.attr("data-src").unwrap_or_default();
        let srcset = image.attr("data-srcset").unwrap_or_default();
        image.set_attr("src", &src);
        image.set_attr("srcset", &srcset);
        image.remove_attr("class");
        image.set_attr("loading", "lazy");
    }
}

pub fn inject_slideshows(optimized: Document, original: &Document) -> Document {
    inject(&optimized, original);
    optimized
}

fn inject(optimized: &Document, original: &Document) {
    let galleries = original.select(".oon-slideshow");
    let headers = optimized
        .select("h3")
        .iter()
        .filter(|h3| SLIDESHOW_HEADER.is_match(h3.text().trim()))
        .collect::<Vec<_>>();

    if galleries.length() != headers.len() {
        debug!(galleries = galleries.length(), headers = headers.len(), "Slideshow count mismatch");
        return;
    }

    for (gallery, header) in galleries.iter().zip(headers) {
        if has_injected_gallery(&header) {
            continue;
        }
        let list = gallery.select_single(".oon-slideshow-list");
        if !list.exists() {
            continue;
        }

        header.after_html(list.html());
        prepare_gallery(&header.next_sibling());
    }
}
