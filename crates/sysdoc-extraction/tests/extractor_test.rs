//! Extraction over chunks as the chunker produces them.

use std::collections::BTreeSet;

use chrono::Utc;
use proptest::prelude::*;
use sysdoc_core::config::ExtractionConfig;
use sysdoc_core::models::{Chunk, ChunkMetadata, ContentType, EntityKind, EntityRef};
use sysdoc_extraction::normalize::normalize_endpoint;
use sysdoc_extraction::{extract, EntityExtractor};

fn chunk(content: &str, content_type: ContentType, section_path: &[&str]) -> Chunk {
    Chunk {
        chunk_id: Chunk::compute_id("doc", 0, content),
        document_id: "doc".to_string(),
        content: content.to_string(),
        content_type,
        section_path: section_path.iter().map(|s| s.to_string()).collect(),
        entities: BTreeSet::new(),
        dense_vector: None,
        overlap_chars: 0,
        metadata: ChunkMetadata::default(),
        created_at: Utc::now(),
    }
}

fn canonical(entities: &BTreeSet<EntityRef>) -> BTreeSet<(EntityKind, String)> {
    entities
        .iter()
        .map(|e| (e.entity_kind, e.canonical_name.clone()))
        .collect()
}

#[test]
fn endpoint_section_links_to_its_resource() {
    let c = chunk("Creates a user.", ContentType::Text, &["POST /api/users"]);
    let found = canonical(&extract(&c));
    assert_eq!(
        found,
        BTreeSet::from([
            (EntityKind::ApiEndpoint, "POST /api/users".to_string()),
            (EntityKind::TableName, "users".to_string()),
        ])
    );
}

#[test]
fn resource_linking_can_be_disabled() {
    let extractor = EntityExtractor::new(ExtractionConfig {
        link_endpoint_resources: false,
    });
    let c = chunk("Creates a user.", ContentType::Text, &["POST /api/users"]);
    let found = canonical(&extractor.extract(&c));
    assert_eq!(found.len(), 1);
}

#[test]
fn schema_table_yields_table_and_columns() {
    let c = chunk(
        "Table: users\n| Column | Type |\n|---|---|\n| email | varchar(255) |",
        ContentType::Table,
        &["Data Model", "users"],
    );
    let found = canonical(&extract(&c));
    assert!(found.contains(&(EntityKind::TableName, "users".to_string())));
    assert!(found.contains(&(EntityKind::Column, "users.email".to_string())));
}

#[test]
fn table_rules_do_not_apply_to_text() {
    let c = chunk("Table: users\n| Column |\n| email |", ContentType::Text, &[]);
    let found = canonical(&extract(&c));
    assert!(!found.iter().any(|(k, _)| *k == EntityKind::Column));
}

#[test]
fn code_block_ddl() {
    let c = chunk(
        "CREATE TABLE orders (id INT, total DECIMAL(10, 2));",
        ContentType::CodeBlock,
        &["Storage"],
    );
    let found = canonical(&extract(&c));
    assert!(found.contains(&(EntityKind::Column, "orders.total".to_string())));
    // Headings of code blocks still contribute domain entities.
    assert!(found.contains(&(EntityKind::DomainEntity, "Storage".to_string())));
}

#[test]
fn overlap_prefix_is_not_scanned() {
    let mut c = chunk("GET /api/a\nbody text", ContentType::Text, &[]);
    c.overlap_chars = "GET /api/a\n".chars().count();
    assert!(extract(&c).is_empty());
}

#[test]
fn duplicate_mentions_collapse() {
    let c = chunk(
        "POST /api/users creates one.\npost /api/Users/ again.",
        ContentType::Text,
        &[],
    );
    let endpoints: Vec<_> = extract(&c)
        .into_iter()
        .filter(|e| e.entity_kind == EntityKind::ApiEndpoint)
        .collect();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].canonical_name, "POST /api/users");
    assert_eq!(endpoints[0].raw_mention, "POST /api/users");
}

#[test]
fn extract_into_appends_only_new_entities() {
    let extractor = EntityExtractor::default();
    let mut c = chunk("GET /health", ContentType::Text, &[]);
    assert!(extractor.extract_into(&mut c) > 0);
    assert_eq!(extractor.extract_into(&mut c), 0);
}

proptest! {
    #[test]
    fn extraction_is_idempotent(body in "[A-Za-z /:{}|\n-]{0,200}", heading in "[A-Za-z /]{0,30}") {
        for content_type in [ContentType::Text, ContentType::Table, ContentType::CodeBlock] {
            let c = chunk(&body, content_type, &[heading.as_str()]);
            prop_assert_eq!(extract(&c), extract(&c));
        }
    }

    #[test]
    fn endpoint_normalization_ignores_case_and_trailing_slash(
        method in prop_oneof![Just("get"), Just("Post"), Just("DELETE")],
        segments in prop::collection::vec("[a-zA-Z]{1,8}", 1..4),
    ) {
        let path = format!("/{}", segments.join("/"));
        let shouted = format!("{}/", path.to_uppercase());
        prop_assert_eq!(
            normalize_endpoint(method, &path),
            normalize_endpoint(&method.to_uppercase(), &shouted)
        );
    }
}
