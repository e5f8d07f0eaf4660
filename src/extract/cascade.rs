//! Selector cascade: ordered, first-match-wins selection
//!
//! Markup vocabulary is unknown ahead of time, so every lookup is expressed as
//! an ordered list of CSS queries going from specific to generic. The first
//! query that produces something wins and the rest are never evaluated.

use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// A compiled CSS query together with its source text
#[derive(Debug, Clone)]
pub struct QuerySpec {
    source: String,
    selector: Selector,
}

impl QuerySpec {
    /// Compiles a CSS selector
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
            selector: source.to_string(),
            message: format!("{:?}", e),
        })?;

        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }

    /// Compiles an ordered list of selectors, failing on the first invalid one
    pub fn parse_all(sources: &[String]) -> Result<Vec<Self>, ConfigError> {
        sources.iter().map(|s| Self::parse(s)).collect()
    }

    /// The selector text as configured
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// Something a query can be evaluated against: a whole document or one element
pub trait Scope<'a> {
    /// Returns every element matching the selector, in document order
    fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'a>>;
}

impl<'a> Scope<'a> for &'a Html {
    fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.select(selector).collect()
    }
}

impl<'a> Scope<'a> for ElementRef<'a> {
    fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.select(selector).collect()
    }
}

/// The winning query of a cascade and what it produced
#[derive(Debug)]
pub struct CascadeMatch<'q, T> {
    pub query: &'q QuerySpec,
    pub items: Vec<T>,
}

/// Evaluates queries in order and returns the first non-empty result
///
/// `eval` is called once per query until one returns at least one item. The
/// remaining queries are not evaluated. Returns None when nothing matched,
/// which callers treat as a signal (end of data, empty field) rather than an
/// error.
pub fn cascade<'q, T, F>(queries: &'q [QuerySpec], mut eval: F) -> Option<CascadeMatch<'q, T>>
where
    F: FnMut(&QuerySpec) -> Vec<T>,
{
    for query in queries {
        let items = eval(query);
        if !items.is_empty() {
            return Some(CascadeMatch { query, items });
        }
    }
    None
}

/// Returns the elements of the first query that matches anything in `scope`
pub fn first_match<'a, 'q, S>(
    scope: &S,
    queries: &'q [QuerySpec],
) -> Option<CascadeMatch<'q, ElementRef<'a>>>
where
    S: Scope<'a>,
{
    cascade(queries, |query| scope.select_all(query.selector()))
}

/// Returns the first non-empty value produced by any element of the first
/// query that produces one
///
/// `value_of` turns an element into a value; elements yielding None or an
/// empty string do not count as a match.
pub fn first_value<'a, S, F>(scope: &S, queries: &[QuerySpec], value_of: F) -> Option<String>
where
    S: Scope<'a>,
    F: Fn(ElementRef<'a>) -> Option<String>,
{
    cascade(queries, |query| {
        scope
            .select_all(query.selector())
            .into_iter()
            .filter_map(&value_of)
            .filter(|value| !value.is_empty())
            .take(1)
            .collect()
    })
    .and_then(|matched| matched.items.into_iter().next())
}

/// Returns the collapsed text of the first element with non-empty text
pub fn first_text<'a, S>(scope: &S, queries: &[QuerySpec]) -> Option<String>
where
    S: Scope<'a>,
{
    first_value(scope, queries, |el| Some(element_text(el)))
}

/// Returns the element's text with whitespace runs collapsed to single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(sources: &[&str]) -> Vec<QuerySpec> {
        sources.iter().map(|s| QuerySpec::parse(s).unwrap()).collect()
    }

    const PAGE: &str = r#"
        <html><body>
            <div class="promo">A</div>
            <div class="promo">B</div>
            <span>1</span><span>2</span><span>3</span><span>4</span><span>5</span>
        </body></html>
    "#;

    #[test]
    fn test_first_match_wins_over_most_matches() {
        let document = Html::parse_document(PAGE);
        let list = queries(&[".missing", ".promo", "span"]);

        let matched = first_match(&&document, &list).unwrap();
        assert_eq!(matched.query.as_str(), ".promo");
        assert_eq!(matched.items.len(), 2);
    }

    #[test]
    fn test_later_queries_not_evaluated() {
        let list = queries(&[".a", ".b", ".c"]);
        let mut evaluated = Vec::new();

        let matched = cascade(&list, |query| {
            evaluated.push(query.as_str().to_string());
            match query.as_str() {
                ".a" => vec![],
                ".b" => vec![1, 2],
                _ => vec![1, 2, 3, 4, 5],
            }
        })
        .unwrap();

        assert_eq!(matched.items, vec![1, 2]);
        assert_eq!(evaluated, vec![".a", ".b"]);
    }

    #[test]
    fn test_no_match() {
        let document = Html::parse_document(PAGE);
        let list = queries(&[".nothing", "table"]);
        assert!(first_match(&&document, &list).is_none());
    }

    #[test]
    fn test_empty_query_list() {
        let document = Html::parse_document(PAGE);
        assert!(first_match(&&document, &[]).is_none());
    }

    #[test]
    fn test_first_text_skips_empty_text() {
        let document = Html::parse_document(
            r#"<div><h2>   </h2><p class="title">  Toyota   Corolla </p></div>"#,
        );
        let list = queries(&["h2", ".title"]);
        let value = first_text(&&document, &list);
        assert_eq!(value.as_deref(), Some("Toyota Corolla"));
    }

    #[test]
    fn test_first_text_within_element_scope() {
        let document = Html::parse_document(
            r#"<ul>
                <li class="item"><span class="price">100</span></li>
                <li class="item"><span class="price">200</span></li>
            </ul>"#,
        );
        let items = queries(&["li.item"]);
        let price = queries(&[".price"]);

        let matched = first_match(&&document, &items).unwrap();
        let second = matched.items[1];
        let value = first_text(&second, &price);
        assert_eq!(value.as_deref(), Some("200"));
    }

    #[test]
    fn test_invalid_selector() {
        let result = QuerySpec::parse("div[[");
        assert!(matches!(result, Err(ConfigError::InvalidSelector { .. })));
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let document = Html::parse_document("<p>  2019 \n\t <b>Kia</b>   Rio </p>");
        let p = queries(&["p"]);
        let matched = first_match(&&document, &p).unwrap();
        assert_eq!(element_text(matched.items[0]), "2019 Kia Rio");
    }
}
