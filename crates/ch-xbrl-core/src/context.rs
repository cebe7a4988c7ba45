//! Context index: `id -> (period_start_text, period_end_text)`, built from
//! every `<context>` element's `<period>` child. Text is left unparsed here;
//! date parsing happens when a periodic row is assembled.

use std::collections::HashMap;

use roxmltree::Document;

/// Maps a context `id` to its raw period bounds. An instant period maps to
/// `(Some(text), Some(text))` with both endpoints equal; a duration period
/// maps to its `startDate`/`endDate` text only when *both* are present and
/// non-empty — if either is missing, the whole context collapses to
/// `(None, None)` rather than a half-populated bound.
#[derive(Debug, Default)]
pub struct ContextIndex {
    periods: HashMap<String, (Option<String>, Option<String>)>,
}

impl ContextIndex {
    pub fn build(doc: &Document) -> Self {
        let mut periods = HashMap::new();

        for node in doc.descendants() {
            if !node.is_element() || node.tag_name().name() != "context" {
                continue;
            }
            let Some(id) = node.attribute("id") else {
                continue;
            };
            let Some(period) = node
                .children()
                .find(|c| c.is_element() && c.tag_name().name() == "period")
            else {
                continue;
            };

            let has_instant_child = period
                .children()
                .any(|c| c.is_element() && c.tag_name().name() == "instant");

            let bounds = if has_instant_child {
                match child_text(period, "instant") {
                    Some(instant) => (Some(instant.clone()), Some(instant)),
                    None => (None, None),
                }
            } else {
                let start = child_text(period, "startDate");
                let end = child_text(period, "endDate");
                match (start, end) {
                    (Some(start), Some(end)) => (Some(start), Some(end)),
                    _ => (None, None),
                }
            };

            periods.insert(id.to_string(), bounds);
        }

        ContextIndex { periods }
    }

    /// Returns `None` for an unknown context id, `Some((None, None))` for a
    /// known one with no usable period bounds.
    pub fn get(&self, context_id: &str) -> Option<&(Option<String>, Option<String>)> {
        self.periods.get(context_id)
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

fn child_text(parent: roxmltree::Node, local_name: &str) -> Option<String> {
    parent
        .children()
        .find(|c| c.is_element() && c.tag_name().name() == local_name)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_period_maps_both_endpoints_to_same_text() {
        let xml = r#"<root><context id="c1"><period><instant>2022-12-31</instant></period></context></root>"#;
        let doc = Document::parse(xml).unwrap();
        let index = ContextIndex::build(&doc);
        assert_eq!(
            index.get("c1"),
            Some(&(Some("2022-12-31".to_string()), Some("2022-12-31".to_string())))
        );
    }

    #[test]
    fn duration_period_reads_start_and_end() {
        let xml = r#"<root><context id="c1"><period><startDate>2022-01-01</startDate><endDate>2022-12-31</endDate></period></context></root>"#;
        let doc = Document::parse(xml).unwrap();
        let index = ContextIndex::build(&doc);
        assert_eq!(
            index.get("c1"),
            Some(&(Some("2022-01-01".to_string()), Some("2022-12-31".to_string())))
        );
    }

    #[test]
    fn missing_endpoint_collapses_to_none_none() {
        let xml = r#"<root><context id="c1"><period><startDate>2022-01-01</startDate></period></context></root>"#;
        let doc = Document::parse(xml).unwrap();
        let index = ContextIndex::build(&doc);
        assert_eq!(index.get("c1"), Some(&(None, None)));
    }

    #[test]
    fn empty_instant_collapses_to_none_none() {
        let xml = r#"<root><context id="c1"><period><instant></instant></period></context></root>"#;
        let doc = Document::parse(xml).unwrap();
        let index = ContextIndex::build(&doc);
        assert_eq!(index.get("c1"), Some(&(None, None)));
    }

    #[test]
    fn unknown_context_id_is_none() {
        let xml = r#"<root><context id="c1"><period><instant>2022-12-31</instant></period></context></root>"#;
        let doc = Document::parse(xml).unwrap();
        let index = ContextIndex::build(&doc);
        assert_eq!(index.get("does-not-exist"), None);
    }
}
