use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::is_valid_url;

/// Attributes an `<img>` element may carry its source in. `data-src` is the
/// common lazy-loading convention.
const SOURCE_ATTRS: [&str; 2] = ["src", "data-src"];

/// Extract every image URL referenced by the page body.
///
/// Values that are not already absolute `http`/`https` URLs are resolved
/// against `page_url` with standard relative-reference resolution. The result
/// is deduplicated on the resolved absolute string and keeps first-seen
/// document order, so downstream ordinals are deterministic for a given body.
pub fn extract_image_urls(body: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(body);
    let selector = match Selector::parse("img") {
        Ok(selector) => selector,
        Err(e) => {
            warn!("failed to build img selector: {e}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for element in document.select(&selector) {
        for attr in SOURCE_ATTRS {
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let Some(resolved) = resolve(value, page_url) else {
                continue;
            };
            if seen.insert(resolved.clone()) {
                urls.push(resolved);
            }
        }
    }

    urls
}

/// Resolve one attribute value to an absolute `http`/`https` URL, or skip it.
fn resolve(value: &str, page_url: &Url) -> Option<String> {
    if is_valid_url(value) {
        return Some(value.to_string());
    }

    match page_url.join(value) {
        Ok(resolved) if matches!(resolved.scheme(), "http" | "https") => {
            Some(resolved.into())
        }
        Ok(resolved) => {
            debug!("skipping non-http image source {resolved}");
            None
        }
        Err(e) => {
            warn!("cannot resolve image source {value:?} against {page_url}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn collects_distinct_sources() {
        let body = r#"
            <html><body>
                <img src="http://a.test/one.png">
                <img src="http://a.test/two.png">
                <img src="http://a.test/three.png">
            </body></html>
        "#;
        let urls = extract_image_urls(body, &page("http://a.test/"));
        assert_eq!(
            urls,
            vec![
                "http://a.test/one.png",
                "http://a.test/two.png",
                "http://a.test/three.png",
            ]
        );
    }

    #[test]
    fn duplicates_collapse_to_one_entry() {
        let body = r#"
            <img src="http://a.test/same.png">
            <img src="/same.png">
            <img data-src="http://a.test/same.png">
        "#;
        let urls = extract_image_urls(body, &page("http://a.test/page"));
        assert_eq!(urls, vec!["http://a.test/same.png"]);
    }

    #[test]
    fn resolves_dotdot_segments() {
        let body = r#"<img src="../img/a.png">"#;
        let urls = extract_image_urls(body, &page("https://x.test/dir/sub/page.html"));
        assert_eq!(urls, vec!["https://x.test/dir/img/a.png"]);
    }

    #[test]
    fn resolves_protocol_relative_references() {
        let body = r#"<img src="//cdn.test/logo.gif">"#;
        let urls = extract_image_urls(body, &page("https://x.test/page"));
        assert_eq!(urls, vec!["https://cdn.test/logo.gif"]);
    }

    #[test]
    fn reads_lazy_load_attribute() {
        let body = r#"<img data-src="lazy.webp" src="placeholder.png">"#;
        let urls = extract_image_urls(body, &page("http://a.test/dir/"));
        assert_eq!(
            urls,
            vec!["http://a.test/dir/placeholder.png", "http://a.test/dir/lazy.webp"]
        );
    }

    #[test]
    fn skips_empty_and_unresolvable_sources() {
        let body = r#"
            <img src="">
            <img src="data:image/png;base64,AAAA">
            <img>
            <img src="http://a.test/kept.png">
        "#;
        let urls = extract_image_urls(body, &page("http://a.test/"));
        assert_eq!(urls, vec!["http://a.test/kept.png"]);
    }

    #[test]
    fn garbage_markup_yields_empty() {
        let urls = extract_image_urls("%%% not markup <<<>", &page("http://a.test/"));
        assert!(urls.is_empty());
    }

    // The scenario from the end-to-end contract: absolute, page-relative and
    // lazy-load sources on one page.
    #[test]
    fn mixed_page_yields_three_references() {
        let body =
            r#"<img src="/a.png"><img data-src="b.gif"><img src="http://other/c.jpg">"#;
        let urls = extract_image_urls(body, &page("http://site/page"));
        let set: HashSet<_> = urls.iter().map(String::as_str).collect();
        assert_eq!(
            set,
            HashSet::from(["http://site/a.png", "http://site/b.gif", "http://other/c.jpg"])
        );
        assert_eq!(urls.len(), 3);
    }
}
