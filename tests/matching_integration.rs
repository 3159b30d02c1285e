//! End-to-end scenarios over the public umbrella API: catalog dump in,
//! per-line verdicts out.

use reqmatch::{
    match_lines, CatalogMatcher, LineItem, LineSource, MatchConfig, MatchReason, MatchStatus,
    Matcher, ProductFlatCodes, ProductRecord, QueryLine,
};

fn product(id: i64, header: &str, articul: Option<&str>) -> ProductRecord {
    ProductRecord {
        id,
        sync_uid: Some(format!("sync-{id}")),
        header: header.to_owned(),
        articul: articul.map(str::to_owned),
        unit_header: Some("м".into()),
        manufacturer_header: Some("Элком".into()),
        multiplicity_order: Some(1.0),
        analog_codes: Vec::new(),
        flat_codes: ProductFlatCodes {
            manufacturer: Some(format!("MNF-{id}")),
            ..Default::default()
        },
        updated_at: None,
        raw: serde_json::json!({ "id": id }),
    }
}

fn cable_catalog() -> Vec<ProductRecord> {
    vec![
        product(1, "Кабель ВВГнг 3x2.5", Some("ELC0100203802")),
        product(2, "Кабель ВВГнг 3x4", Some("ELC0100203803")),
    ]
}

fn item(line_no: usize, raw: &str, name: &str, qty: Option<f64>) -> QueryLine {
    QueryLine::from_item(LineItem {
        line_no,
        source: LineSource::EmailText,
        raw_line: raw.to_owned(),
        name_or_code: Some(name.to_owned()),
        qty,
        unit: None,
    })
}

#[test]
fn articul_query_resolves_by_code() {
    let matched = match_lines(
        cable_catalog(),
        vec![item(1, "ELC0100203802 2 шт", "ELC0100203802", Some(2.0))],
        MatchConfig::default(),
    )
    .expect("catalog is valid");

    let result = &matched[0].result;
    assert_eq!(result.status, MatchStatus::Ok);
    assert_eq!(result.reason, MatchReason::Code);
    assert_eq!(result.confidence, 0.99);
    assert_eq!(result.product.as_ref().map(|p| p.id), Some(1));
    assert_eq!(result.product.as_ref().and_then(|p| p.articul.as_deref()), Some("ELC0100203802"));
}

#[test]
fn truncated_size_goes_to_review() {
    let matched = match_lines(
        cable_catalog(),
        vec![item(2, "Кабель ВВГнг 3х", "Кабель ВВГнг 3х", Some(3.0))],
        MatchConfig::default(),
    )
    .expect("catalog is valid");

    let result = &matched[0].result;
    assert_eq!(result.status, MatchStatus::Review);
    assert!(!result.candidates.is_empty());
    // Both cable sizes are in play; the runner-up is exposed for audit.
    assert!(result.runner_up().is_some());
}

#[test]
fn unrelated_item_is_never_accepted() {
    let matched = match_lines(
        cable_catalog(),
        vec![item(3, "Совсем другой товар 5 шт", "Совсем другой товар", Some(5.0))],
        MatchConfig::default(),
    )
    .expect("catalog is valid");

    assert_ne!(matched[0].result.status, MatchStatus::Ok);
}

#[test]
fn shared_code_lists_both_candidates() {
    let mut catalog = cable_catalog();
    catalog[0].analog_codes = vec!["DUP1".into()];
    catalog[1].analog_codes = vec!["DUP1".into()];

    let matched = match_lines(
        catalog,
        vec![item(4, "DUP1", "DUP1", Some(1.0))],
        MatchConfig::default(),
    )
    .expect("catalog is valid");

    let result = &matched[0].result;
    assert_eq!(result.status, MatchStatus::Review);
    assert!(result.product.is_none());
    assert_eq!(result.candidates.len(), 2);
}

#[test]
fn custom_thresholds_change_the_verdict() {
    // With a permissive ok threshold and no gap requirement, the truncated
    // size resolves instead of going to review.
    let config = MatchConfig {
        ok_threshold: 0.5,
        review_threshold: 0.3,
        gap_threshold: 0.0,
    };
    let matcher = CatalogMatcher::new(cable_catalog(), config).expect("catalog is valid");

    let result = matcher.match_line(&item(5, "Кабель ВВГнг 3х", "Кабель ВВГнг 3х", Some(3.0)));
    assert_eq!(result.status, MatchStatus::Ok);
    assert_eq!(result.reason, MatchReason::Fuzzy);
}

#[test]
fn raw_email_lines_round_trip_through_parsing() {
    let lines = vec![
        QueryLine::parse(1, LineSource::EmailText, "ELC0100203803  5 шт"),
        QueryLine::parse(2, LineSource::EmailText, "Кабель ВВГнг 3x2.5 100 м"),
    ];

    let matched =
        match_lines(cable_catalog(), lines, MatchConfig::default()).expect("catalog is valid");

    assert_eq!(matched[0].result.reason, MatchReason::Code);
    assert_eq!(matched[0].result.product.as_ref().map(|p| p.id), Some(2));
    assert_eq!(matched[1].result.reason, MatchReason::Header);
    assert_eq!(matched[1].result.product.as_ref().map(|p| p.id), Some(1));
    assert_eq!(matched[1].line.qty, Some(100.0));
}
