// Document rendering
// Turns one solution record into the Markdown text that gets embedded


pub mod extractor;

pub use extractor::{HtmlParagraphs, ParagraphExtractor};

use crate::database::sql::SolutionRecord;

/// Placeholder for absent values, kept identical to what is already indexed
const MISSING: &str = "None";

/// Renders records into the fixed section layout used for embeddings
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer<P> {
    extractor: P,
}

impl<P: ParagraphExtractor> DocumentRenderer<P> {
    #[inline]
    pub fn new(extractor: P) -> Self {
        Self { extractor }
    }

    /// Values are substituted verbatim, without Markdown escaping.
    ///
    /// Note the trailing spaces after `Description` and `Sales Centers`.
    pub fn render(&self, record: &SolutionRecord) -> String {
        format!(
            "# {}\n\n\
             ## Abstract\n{}\n\n\
             ## Description \n{}\n\n\
             ## Keywords\n{}\n\n\
             ## Pricing Options\n{}\n\n\
             ## Customer Types\n{}\n\n\
             ## Solution Types\n{}\n\n\
             ## Country\n{}\n\n\
             ## Sales Centers \n{}\n\n\
             ## Link\n{}\n\n",
            record.display_title(),
            self.rich_text(record.abstract_html.as_deref()),
            self.rich_text(record.description_html.as_deref()),
            plain(record.keywords.as_deref()),
            plain(record.pricing_options.as_deref()),
            plain(record.customer_types.as_deref()),
            plain(record.solution_types.as_deref()),
            plain(record.country.as_deref()),
            plain(record.sales_centers.as_deref()),
            plain(record.link.as_deref()),
        )
    }

    fn rich_text(&self, html: Option<&str>) -> String {
        match html {
            None | Some("") => MISSING.to_string(),
            Some(html) => self.extractor.paragraphs(html).join("\n"),
        }
    }
}

#[inline]
fn plain(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING)
}

/// Render with the default HTML paragraph extractor
#[inline]
pub fn render_markdown(record: &SolutionRecord) -> String {
    DocumentRenderer::new(HtmlParagraphs).render(record)
}
