
use scraper::{Html, Selector};

/// Pulls the text of every paragraph out of an HTML fragment
pub trait ParagraphExtractor {
    fn paragraphs(&self, html: &str) -> Vec<String>;
}

/// `scraper`-backed extractor. Never fails: markup the parser cannot make
/// sense of simply yields fewer paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParagraphs;

impl ParagraphExtractor for HtmlParagraphs {
    fn paragraphs(&self, html: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse("p") else {
            return Vec::new();
        };

        Html::parse_fragment(html)
            .select(&selector)
            .map(|paragraph| paragraph.text().collect::<String>())
            .collect()
    }
}
