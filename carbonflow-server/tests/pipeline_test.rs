use anyhow::Result;
use std::io::Cursor;
use std::sync::Arc;

use carbonflow_core::database::DatabaseManager;
use carbonflow_core::storage::{DatabaseStorage, EmissionStore};
use carbonflow_server::export::{excel, pdf};
use carbonflow_server::ingest::{normalize, tabular, validate};
use carbonflow_server::processing::{aggregate, sankey};

const SAMPLE_CSV: &str = "\
entreprise,annee,scope,categorie,emissions_co2
Acme,2023,1,Transport,10
Acme,2023,1,Transport,5
Beta,2023,2,Énergie,7.5
,2023,1,Transport,99
Gamma,2023,quatre,Achats,3
";

fn store() -> Result<DatabaseStorage> {
    let db = DatabaseManager::in_memory()?;
    db.run_migrations()?;
    Ok(DatabaseStorage::new(Arc::new(db)))
}

#[tokio::test]
async fn csv_upload_flows_through_to_aggregates_and_graph() -> Result<()> {
    let store = store()?;

    // Parse and validate the upload.
    let parsed = tabular::read_csv(Cursor::new(SAMPLE_CSV))?;
    validate::validate(&parsed).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // Normalize: the row without a company and the row with a bad scope drop.
    let mut records = normalize::normalize_rows(&parsed.rows);
    assert_eq!(records.len(), 3);

    store.insert_records(&mut records).await?;
    let stored = store.all_records().await?;
    assert_eq!(stored.len(), 3);

    // Aggregate: duplicate (Acme, 1, Transport) rows sum to 15.
    let totals = aggregate::aggregate(&stored);
    assert_eq!(totals.total, 22.5);
    assert_eq!(totals.by_scope[&1], 15.0);
    assert_eq!(totals.by_scope[&2], 7.5);
    assert_eq!(totals.by_scope[&3], 0.0);
    assert_eq!(totals.top_emitters[0].0, "Acme");

    // Flow graph: one merged link pair for the duplicate key.
    let graph = sankey::build(&stored);
    let scope_nodes: Vec<&str> = graph
        .nodes
        .iter()
        .map(|n| n.name.as_str())
        .filter(|n| n.starts_with("Scope "))
        .collect();
    assert_eq!(scope_nodes, vec!["Scope 1", "Scope 2", "Scope 3"]);

    // Two merged entries → two link pairs.
    assert_eq!(graph.links.len(), 4);
    let acme_link = &graph.links[0];
    assert_eq!(graph.nodes[acme_link.source].name, "Acme");
    assert_eq!(graph.nodes[acme_link.target].name, "Transport");
    assert_eq!(acme_link.value, 15.0);

    Ok(())
}

#[tokio::test]
async fn exports_render_from_stored_records() -> Result<()> {
    let store = store()?;

    let parsed = tabular::read_csv(Cursor::new(SAMPLE_CSV))?;
    let mut records = normalize::normalize_rows(&parsed.rows);
    store.insert_records(&mut records).await?;
    let stored = store.all_records().await?;

    let pdf_bytes = pdf::render_document(&stored).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(pdf_bytes.starts_with(b"%PDF"));

    let xlsx_bytes =
        excel::render_spreadsheet(&stored).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(xlsx_bytes.starts_with(b"PK"));

    Ok(())
}

#[tokio::test]
async fn upload_with_missing_columns_is_rejected_with_the_missing_names() -> Result<()> {
    let csv = "entreprise,annee\nAcme,2023\n";
    let parsed = tabular::read_csv(Cursor::new(csv))?;

    let err = validate::validate(&parsed).unwrap_err();
    assert_eq!(err.to_string(), "Colonnes manquantes: scope, categorie, emissions_co2");
    Ok(())
}
