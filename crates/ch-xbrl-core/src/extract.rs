//! The single-pass extraction traversal: one walk over every element in
//! document order, dispatching each element against the matcher tables and
//! updating general/periodic fact slots as it goes.

use std::collections::HashMap;

use roxmltree::{Document, Node};

use crate::catalog::{Candidate, ColumnKind, GeneralColumn, MatcherTables, PeriodicColumn, Rule};
use crate::context::ContextIndex;
use crate::value::Value;

pub type PeriodKey = (Option<String>, Option<String>);

/// Facts collected by one traversal: the best value seen so far for each
/// general column, and the best value seen so far for each
/// `(periodic column, period)` pair.
///
/// `periods_seen` is tracked independently of `periodic`: a period is a row
/// candidate as soon as *any* periodic-candidate element resolves to it via
/// a valid-dated context, even if every such element's text parses to null.
/// Otherwise a period whose only facts fail to parse would silently vanish
/// instead of producing an all-null row for that period.
#[derive(Debug, Default)]
pub struct Facts {
    general: HashMap<GeneralColumn, (u32, Value)>,
    periodic: HashMap<(PeriodicColumn, PeriodKey), (u32, Value)>,
    periods_seen: std::collections::HashSet<PeriodKey>,
}

impl Facts {
    pub fn general_value(&self, column: GeneralColumn) -> Option<&Value> {
        self.general.get(&column).map(|(_, v)| v)
    }

    pub fn periodic_value(&self, column: PeriodicColumn, period: &PeriodKey) -> Option<&Value> {
        self.periodic.get(&(column, period.clone())).map(|(_, v)| v)
    }

    /// Every distinct period reached by at least one periodic candidate with
    /// a valid-dated context, whether or not that candidate's text parsed.
    pub fn periods(&self) -> impl Iterator<Item = &PeriodKey> {
        self.periods_seen.iter()
    }
}

fn name_suffix(name_attr: Option<&str>) -> &str {
    match name_attr {
        Some(s) => match s.rfind(':') {
            Some(idx) => &s[idx + 1..],
            None => s,
        },
        None => "",
    }
}

/// Walks every element in `doc`, populating general and periodic fact slots
/// per the catalog's matcher tables.
pub fn extract_facts(doc: &Document, contexts: &ContextIndex) -> Facts {
    let tables = MatcherTables::global();
    let mut facts = Facts::default();

    for element in doc.descendants() {
        if !element.is_element() {
            continue;
        }

        let local_name = element.tag_name().name();
        let name_attr = element.attribute("name");
        let suffix = name_suffix(name_attr);
        let context_ref = element.attribute("contextRef").unwrap_or("");

        let mut indices: Vec<usize> = Vec::new();
        if let Some(hits) = tables.tag_name.get(local_name) {
            indices.extend(hits);
        }
        if !suffix.is_empty() {
            if let Some(hits) = tables.name_suffix.get(suffix) {
                indices.extend(hits);
            }
        }
        for &idx in &tables.custom {
            let candidate = &tables.candidates[idx];
            if let Rule::Custom(rule) = &candidate.rule {
                if (rule.matches)(local_name, suffix, context_ref) {
                    indices.push(idx);
                }
            }
        }

        for idx in indices {
            let candidate = &tables.candidates[idx];
            apply_candidate(candidate, element, contexts, &mut facts);
        }
    }

    facts
}

fn apply_candidate(candidate: &Candidate, anchor: Node, contexts: &ContextIndex, facts: &mut Facts) {
    let target = match &candidate.rule {
        Rule::TagName(_) | Rule::NameAttr(_) => Some(anchor),
        Rule::Custom(rule) => (rule.select)(anchor),
    };
    let Some(target) = target else {
        return;
    };
    let Some(text) = element_text(target) else {
        return;
    };

    match candidate.column {
        ColumnKind::General(column) => {
            apply_general(candidate, column, &text, target, facts);
        }
        ColumnKind::Periodic(column) => {
            apply_periodic(candidate, column, &text, target, anchor, contexts, facts);
        }
    }
}

fn apply_general(candidate: &Candidate, column: GeneralColumn, text: &str, target: Node, facts: &mut Facts) {
    let slot_priority = facts.general.get(&column).map(|(p, _)| *p).unwrap_or(u32::MAX);
    if candidate.priority > slot_priority {
        return;
    }
    let sign = target.attribute("sign");
    let scale = target.attribute("scale");
    if let Some(value) = candidate.parser.parse(text, sign, scale) {
        facts.general.insert(column, (candidate.priority, value));
    }
}

fn apply_periodic(
    candidate: &Candidate,
    column: PeriodicColumn,
    text: &str,
    target: Node,
    anchor: Node,
    contexts: &ContextIndex,
    facts: &mut Facts,
) {
    let context_ref = anchor.attribute("contextRef").unwrap_or("");
    if context_ref.is_empty() {
        return;
    }
    let Some(bounds) = contexts.get(context_ref) else {
        return;
    };
    if bounds.0.is_none() && bounds.1.is_none() {
        return;
    }

    facts.periods_seen.insert(bounds.clone());

    let key = (column, bounds.clone());
    let slot_priority = facts.periodic.get(&key).map(|(p, _)| *p).unwrap_or(u32::MAX);
    if candidate.priority >= slot_priority {
        return;
    }
    let sign = target.attribute("sign");
    let scale = target.attribute("scale");
    if let Some(value) = candidate.parser.parse(text, sign, scale) {
        facts.periodic.insert(key, (candidate.priority, value));
    }
}

/// Concatenates every descendant text node's content, trimmed. XBRL facts
/// are almost always single text-only elements, but inline-XBRL (`ix:*`)
/// facts can carry nested markup around the number or string.
pub fn element_text(node: Node) -> Option<String> {
    let mut buf = String::new();
    for descendant in node.descendants() {
        if descendant.is_text() {
            if let Some(t) = descendant.text() {
                buf.push_str(t);
            }
        }
    }
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
