use scraper::ElementRef;

use super::collapse_ws;

/// Supplies text surrounding a record link, nearest first, to a probe that
/// looks for something in it (the update date). Markup-specific, so kept
/// swappable.
pub trait ContextText {
    fn scan(&self, anchor: ElementRef<'_>, probe: &dyn Fn(&str) -> Option<String>) -> Option<String>;
}

/// Walks up to `depth` ancestor elements. The parent is always scanned; higher
/// levels only while their collapsed text stays under `max_chars` characters,
/// so a link sitting in a page-wide container cannot pick up unrelated dates.
#[derive(Debug, Clone)]
pub struct AncestorText {
    pub depth: usize,
    pub max_chars: usize,
}

impl Default for AncestorText {
    fn default() -> Self {
        Self { depth: crate::config::DEFAULT_CONTEXT_DEPTH, max_chars: crate::config::DEFAULT_CONTEXT_MAX_CHARS }
    }
}

impl ContextText for AncestorText {
    fn scan(&self, anchor: ElementRef<'_>, probe: &dyn Fn(&str) -> Option<String>) -> Option<String> {
        let mut node = anchor.parent();
        for level in 1..=self.depth {
            let el = node.and_then(ElementRef::wrap)?;
            let text = collapse_ws(&el.text().collect::<String>());
            if level > 1 && text.chars().count() >= self.max_chars {
                return None;
            }
            if let Some(hit) = probe(&text) {
                return Some(hit);
            }
            node = el.parent();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn scan_first(html: &str, ctx: &AncestorText) -> Option<String> {
        let doc = Html::parse_document(html);
        let sel = Selector::parse("a").unwrap();
        let a = doc.select(&sel).next().unwrap();
        ctx.scan(a, &|t| Some(t.to_string()))
    }

    #[test]
    fn parent_text_is_collapsed() {
        let html = "<div><p>  <a href='#'>Title</a>\n\n  note  </p></div>";
        assert_eq!(scan_first(html, &AncestorText::default()).as_deref(), Some("Title note"));
    }

    #[test]
    fn stops_at_depth() {
        let ctx = AncestorText { depth: 1, max_chars: 1000 };
        let doc = Html::parse_document("<div>outer 2024-01-01<p><a href='#'>x</a></p></div>");
        let sel = Selector::parse("a").unwrap();
        let a = doc.select(&sel).next().unwrap();
        let seen = std::cell::RefCell::new(Vec::new());
        let hit = ctx.scan(a, &|t| {
            seen.borrow_mut().push(t.to_string());
            None
        });
        assert_eq!(hit, None);
        assert_eq!(seen.into_inner(), vec!["x".to_string()]);
    }
}
