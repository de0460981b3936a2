//! Prioritized title/image extraction
//!
//! Extraction runs an ordered list of strategies over a parsed document. For
//! each field the first strategy that yields a present, non-blank value wins;
//! ties are broken by position in the list, never by how much a strategy
//! found.
//!
//! | Priority | Strategy       | Title                          | Image                          |
//! |----------|----------------|--------------------------------|--------------------------------|
//! | 1        | `open_graph`   | `og:title` meta content        | `og:image` meta content        |
//! | 2        | `twitter_card` | `twitter:title` meta content   | `twitter:image` meta content   |
//! | 3        | `json_ld`      | first `Product` record `name`  | that record's `image`          |
//! | 4        | `html`         | `<title>` text                 | first `<img>` `src`            |

use tracing::debug;

use crate::scrape::document::ParsedDocument;
use crate::scrape::error::ExtractError;
use crate::scrape::structured_data::{first_product, JSON_LD_SELECTOR};

/// Values one strategy found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Title candidate
    pub title: Option<String>,
    /// Image candidate
    pub image: Option<String>,
}

/// A named extraction rule
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    /// Name used in logs
    pub name: &'static str,
    /// Reads both fields from a document
    pub extract: fn(&ParsedDocument) -> Result<Candidates, ExtractError>,
}

/// Strategies in priority order
pub const STRATEGIES: [Strategy; 4] = [
    Strategy {
        name: "open_graph",
        extract: open_graph,
    },
    Strategy {
        name: "twitter_card",
        extract: twitter_card,
    },
    Strategy {
        name: "json_ld",
        extract: json_ld,
    },
    Strategy {
        name: "html",
        extract: html_fallback,
    },
];

/// Winning values; `None` means no strategy found the field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Selected title
    pub title: Option<String>,
    /// Selected image, not yet normalized
    pub image: Option<String>,
}

/// Per-field ordered candidates, kept only to pick winners
#[derive(Debug, Default)]
struct CandidateSet {
    title: Vec<(&'static str, Option<String>)>,
    image: Vec<(&'static str, Option<String>)>,
}

impl CandidateSet {
    fn push(&mut self, strategy: &'static str, found: Candidates) {
        self.title.push((strategy, found.title));
        self.image.push((strategy, found.image));
    }

    /// Both fields already have a winner, so lower priorities cannot matter
    fn is_settled(&self) -> bool {
        winner(&self.title).is_some() && winner(&self.image).is_some()
    }

    fn select(self) -> Extraction {
        let title = winner(&self.title).map(|(name, value)| {
            debug!(strategy = name, "Selected title");
            value.to_string()
        });
        let image = winner(&self.image).map(|(name, value)| {
            debug!(strategy = name, "Selected image");
            value.to_string()
        });
        Extraction { title, image }
    }
}

fn winner<'a>(
    candidates: &'a [(&'static str, Option<String>)],
) -> Option<(&'static str, &'a str)> {
    candidates.iter().find_map(|(name, value)| {
        value
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(|value| (*name, value))
    })
}

/// Run the default strategy chain
pub fn extract(document: &ParsedDocument) -> Result<Extraction, ExtractError> {
    extract_with(document, &STRATEGIES)
}

/// Run `strategies` left to right, stopping once every field has a winner
pub fn extract_with(
    document: &ParsedDocument,
    strategies: &[Strategy],
) -> Result<Extraction, ExtractError> {
    let mut candidates = CandidateSet::default();

    for strategy in strategies {
        if candidates.is_settled() {
            break;
        }
        let found = (strategy.extract)(document)?;
        debug!(
            strategy = strategy.name,
            title = ?found.title,
            image = ?found.image,
            "Strategy candidates"
        );
        candidates.push(strategy.name, found);
    }

    Ok(candidates.select())
}

fn meta_content(
    document: &ParsedDocument,
    selector: &str,
) -> Result<Option<String>, ExtractError> {
    Ok(document.first_attr(selector, "content")?.map(str::to_string))
}

fn open_graph(document: &ParsedDocument) -> Result<Candidates, ExtractError> {
    Ok(Candidates {
        title: meta_content(document, r#"meta[property="og:title"]"#)?,
        image: meta_content(document, r#"meta[property="og:image"]"#)?,
    })
}

fn twitter_card(document: &ParsedDocument) -> Result<Candidates, ExtractError> {
    Ok(Candidates {
        title: meta_content(document, r#"meta[name="twitter:title"]"#)?,
        image: meta_content(document, r#"meta[name="twitter:image"]"#)?,
    })
}

fn json_ld(document: &ParsedDocument) -> Result<Candidates, ExtractError> {
    let blocks = document.texts(JSON_LD_SELECTOR)?;
    Ok(match first_product(blocks) {
        Some(record) => Candidates {
            image: record.first_image().map(str::to_string),
            title: record.name,
        },
        None => Candidates::default(),
    })
}

fn html_fallback(document: &ParsedDocument) -> Result<Candidates, ExtractError> {
    Ok(Candidates {
        title: document.first_text("title")?,
        image: document.first_attr("img", "src")?.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN_GRAPH: &str = r#"<meta property="og:title" content="OG Title"><meta property="og:image" content="https://cdn.example/og.png">"#;
    const TWITTER: &str = r#"<meta name="twitter:title" content="Twitter Title"><meta name="twitter:image" content="https://cdn.example/tw.png">"#;
    const JSON_LD: &str = r#"<script type="application/ld+json">{"@type":"Product","name":"LD Title","image":["https://cdn.example/ld.png","https://cdn.example/ld2.png"]}</script>"#;
    const HTML_TITLE: &str = "<title>Html Title</title>";
    const HTML_IMAGE: &str = r#"<img src="https://cdn.example/html.png">"#;

    const EXPECTED: [(&str, &str); 4] = [
        ("OG Title", "https://cdn.example/og.png"),
        ("Twitter Title", "https://cdn.example/tw.png"),
        ("LD Title", "https://cdn.example/ld.png"),
        ("Html Title", "https://cdn.example/html.png"),
    ];

    /// Page carrying the given strategies' markup, priorities 1..=4
    fn page(strategies: &[usize]) -> String {
        let mut head = String::new();
        let mut body = String::new();
        for k in strategies {
            match *k {
                1 => head.push_str(OPEN_GRAPH),
                2 => head.push_str(TWITTER),
                3 => head.push_str(JSON_LD),
                4 => {
                    head.push_str(HTML_TITLE);
                    body.push_str(HTML_IMAGE);
                }
                _ => unreachable!(),
            }
        }
        format!("<html><head>{head}</head><body>{body}</body></html>")
    }

    fn run(markup: &str) -> Extraction {
        extract(&ParsedDocument::parse(markup)).unwrap()
    }

    #[test]
    fn test_each_strategy_alone() {
        for k in 1..=4 {
            let extraction = run(&page(&[k]));
            let (title, image) = EXPECTED[k - 1];
            assert_eq!(extraction.title.as_deref(), Some(title), "strategy {k}");
            assert_eq!(extraction.image.as_deref(), Some(image), "strategy {k}");
        }
    }

    #[test]
    fn test_highest_priority_wins() {
        for k in 1..=4 {
            let present: Vec<usize> = (k..=4).collect();
            let extraction = run(&page(&present));
            let (title, image) = EXPECTED[k - 1];
            assert_eq!(extraction.title.as_deref(), Some(title), "from {k}");
            assert_eq!(extraction.image.as_deref(), Some(image), "from {k}");
        }
    }

    #[test]
    fn test_priority_ignores_document_order() {
        // Fallback markup first, Open Graph last
        let markup = format!(
            "<html><head>{HTML_TITLE}{JSON_LD}{TWITTER}{OPEN_GRAPH}</head><body>{HTML_IMAGE}</body></html>"
        );
        let extraction = run(&markup);
        assert_eq!(extraction.title.as_deref(), Some("OG Title"));
        assert_eq!(extraction.image.as_deref(), Some("https://cdn.example/og.png"));
    }

    #[test]
    fn test_fields_are_selected_independently() {
        let markup = r#"<html><head>
            <meta property="og:title" content="Only OG Title">
            <meta name="twitter:image" content="https://cdn.example/tw-only.png">
            <title>Ignored</title>
        </head><body><img src="/ignored.png"></body></html>"#;
        let extraction = run(markup);
        assert_eq!(extraction.title.as_deref(), Some("Only OG Title"));
        assert_eq!(extraction.image.as_deref(), Some("https://cdn.example/tw-only.png"));
    }

    #[test]
    fn test_blank_values_fall_through() {
        let markup = r#"<html><head>
            <meta property="og:title" content="   ">
            <meta property="og:image" content="">
            <meta name="twitter:title" content="Real Title">
        </head><body><img src="/real.png"></body></html>"#;
        let extraction = run(markup);
        assert_eq!(extraction.title.as_deref(), Some("Real Title"));
        assert_eq!(extraction.image.as_deref(), Some("/real.png"));
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let extraction = run("<title>  Blue Mug \n</title>");
        assert_eq!(extraction.title.as_deref(), Some("  Blue Mug \n"));
    }

    #[test]
    fn test_nothing_found() {
        let extraction = run("<html><body><p>No metadata here</p></body></html>");
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn test_json_ld_partial_failure() {
        let markup = r#"<html><head>
            <script type="application/ld+json">{ "@type": "Product", "name": </script>
            <script type="application/ld+json">{"@type":"Product","name":"Valid Product","image":"https://cdn.example/valid.png"}</script>
        </head></html>"#;
        let extraction = run(markup);
        assert_eq!(extraction.title.as_deref(), Some("Valid Product"));
        assert_eq!(extraction.image.as_deref(), Some("https://cdn.example/valid.png"));
    }

    #[test]
    fn test_stops_once_settled() {
        fn failing(_: &ParsedDocument) -> Result<Candidates, ExtractError> {
            Err(ExtractError::Selector {
                selector: "never".into(),
                message: "should not run".into(),
            })
        }
        let strategies = [
            STRATEGIES[0],
            Strategy {
                name: "failing",
                extract: failing,
            },
        ];
        let document = ParsedDocument::parse(&page(&[1]));
        let extraction = extract_with(&document, &strategies).unwrap();
        assert_eq!(extraction.title.as_deref(), Some("OG Title"));

        let document = ParsedDocument::parse(&page(&[4]));
        assert!(extract_with(&document, &strategies).is_err());
    }
}
