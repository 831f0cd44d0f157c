use std::collections::HashMap;

use carbonflow_core::domain::{AggregationKey, EmissionRecord};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::aggregate::SCOPES;

/// One node of the flow graph; its position in `nodes` is its index.
#[derive(Debug, Clone, Serialize)]
pub struct FlowNode {
    pub name: String,
}

/// Weighted edge between two node indices.
#[derive(Debug, Clone, Serialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SankeyGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

/// Build the three-tier company → category → scope flow graph.
///
/// Node tiers are disjoint: companies first (in order of first appearance
/// after sorting records by company name), then categories, then the three
/// fixed scope nodes, which are present whether or not any record references
/// them. Duplicate `(company, scope, category)` entries are merged by
/// summing before links are emitted, so each merged entry produces exactly
/// one company→category and one category→scope link.
pub fn build(records: &[EmissionRecord]) -> SankeyGraph {
    if records.is_empty() {
        return SankeyGraph::default();
    }

    let mut records: Vec<&EmissionRecord> = records.iter().collect();
    records.sort_by(|a, b| a.company.cmp(&b.company));

    let mut nodes = Vec::new();

    let mut company_index: HashMap<String, usize> = HashMap::new();
    for record in &records {
        if !company_index.contains_key(&record.company) {
            company_index.insert(record.company.clone(), nodes.len());
            nodes.push(FlowNode { name: record.company.clone() });
        }
    }

    let mut category_index: HashMap<String, usize> = HashMap::new();
    for record in &records {
        if !category_index.contains_key(&record.category) {
            category_index.insert(record.category.clone(), nodes.len());
            nodes.push(FlowNode { name: record.category.clone() });
        }
    }

    let mut scope_index: HashMap<u8, usize> = HashMap::new();
    for scope in SCOPES {
        scope_index.insert(scope, nodes.len());
        nodes.push(FlowNode { name: format!("Scope {scope}") });
    }

    // Merge duplicate aggregation keys by summing; the map keeps first-seen
    // key order for link emission.
    let mut merged: IndexMap<AggregationKey, f64> = IndexMap::new();
    for record in &records {
        *merged.entry(AggregationKey::of(record)).or_insert(0.0) += record.value;
    }

    let mut links = Vec::new();
    for (key, value) in &merged {
        let (Some(&company), Some(&category), Some(&scope)) = (
            company_index.get(&key.company),
            category_index.get(&key.category),
            scope_index.get(&key.scope),
        ) else {
            // A record with a scope outside the fixed tier has no node; skip
            // its link pair rather than failing the whole graph.
            continue;
        };

        links.push(FlowLink { source: company, target: category, value: *value });
        links.push(FlowLink { source: category, target: scope, value: *value });
    }

    debug!("Built sankey graph: {} nodes, {} links", nodes.len(), links.len());
    SankeyGraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(company: &str, scope: u8, category: &str, value: f64) -> EmissionRecord {
        EmissionRecord {
            id: None,
            company: company.to_string(),
            scope,
            category: category.to_string(),
            value,
            year: 2023,
            created_at: Utc::now(),
        }
    }

    fn node_names(graph: &SankeyGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn empty_input_builds_an_empty_graph() {
        let graph = build(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn all_three_scope_nodes_exist_even_when_unreferenced() {
        let graph = build(&[record("Acme", 1, "Transport", 5.0)]);

        let names = node_names(&graph);
        assert!(names.contains(&"Scope 1"));
        assert!(names.contains(&"Scope 2"));
        assert!(names.contains(&"Scope 3"));
        assert_eq!(names.iter().filter(|n| n.starts_with("Scope ")).count(), 3);
    }

    #[test]
    fn tiers_are_ordered_companies_then_categories_then_scopes() {
        let records = vec![
            record("Zeta", 2, "Énergie", 1.0),
            record("Acme", 1, "Transport", 5.0),
        ];

        let graph = build(&records);
        // Companies sort by name before first-seen collection.
        assert_eq!(
            node_names(&graph),
            vec!["Acme", "Zeta", "Transport", "Énergie", "Scope 1", "Scope 2", "Scope 3"]
        );
    }

    #[test]
    fn duplicate_keys_merge_into_one_link_pair_with_summed_value() {
        let records = vec![record("A", 1, "X", 10.0), record("A", 1, "X", 5.0)];

        let graph = build(&records);
        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.links[0].value, 15.0);
        assert_eq!(graph.links[1].value, 15.0);

        // company → category → scope
        assert_eq!(graph.nodes[graph.links[0].source].name, "A");
        assert_eq!(graph.nodes[graph.links[0].target].name, "X");
        assert_eq!(graph.nodes[graph.links[1].source].name, "X");
        assert_eq!(graph.nodes[graph.links[1].target].name, "Scope 1");
    }

    #[test]
    fn distinct_keys_keep_separate_links_even_with_shared_endpoints() {
        // Same company and category, different scopes: two link pairs, and
        // the two company→category links stay separate entries.
        let records = vec![record("A", 1, "X", 10.0), record("A", 2, "X", 5.0)];

        let graph = build(&records);
        assert_eq!(graph.links.len(), 4);

        let company_to_category: Vec<&FlowLink> = graph
            .links
            .iter()
            .filter(|l| graph.nodes[l.source].name == "A")
            .collect();
        assert_eq!(company_to_category.len(), 2);
    }

    #[test]
    fn category_named_like_a_company_does_not_collide() {
        let records = vec![record("Acme", 1, "Acme", 3.0)];

        let graph = build(&records);
        assert_eq!(
            node_names(&graph),
            vec!["Acme", "Acme", "Scope 1", "Scope 2", "Scope 3"]
        );
        assert_eq!(graph.links[0].source, 0);
        assert_eq!(graph.links[0].target, 1);
    }
}
