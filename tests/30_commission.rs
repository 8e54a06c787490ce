mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Method;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use common::StubBackend;
use paynet_admin::api::ApiClient;
use paynet_admin::commission::{CascadeStatus, CommissionBoard, CommissionError, SaveState};
use paynet_admin::error::ConsoleError;
use paynet_admin::listing::SearchParams;
use paynet_admin::notify::LogNotifier;

fn merchant(id: u32, tiers: [u32; 3]) -> Value {
    json!({
        "id": id,
        "store_name": format!("Store {}", id),
        "upper_path": "HQ > Dist > Agency",
        "terminal_C": "20",
        "prime_AC": tiers[0], "prime_BC": tiers[1], "prime_CC": tiers[2],
        "store_wallet": { "terminal_commission": "3" },
        "settlement_commission": "1",
        "store_basic_info": { "join_date": "2024-01-05 12:00:00" }
    })
}

async fn board(backend: &StubBackend) -> Result<CommissionBoard<ApiClient>> {
    let mut board = CommissionBoard::new(
        backend.client(),
        common::partner_session(),
        Arc::new(LogNotifier),
        12,
        Duration::from_secs(2),
    );
    board.load(1, SearchParams::default()).await?;
    Ok(board)
}

#[tokio::test]
async fn table_query_carries_identity_and_paging() -> Result<()> {
    let backend = StubBackend::start().await?.with_commission_rows(vec![merchant(1, [10, 5, 5])]);
    let _board = board(&backend).await?;

    let seen = backend.requests_to(Method::GET, "/api/store/storeCommissionTable");
    let query = &seen[0].query;
    assert_eq!(query.get("classify").map(String::as_str), Some("1"));
    assert_eq!(query.get("rate").map(String::as_str), Some("p2"));
    assert_eq!(query.get("userId").map(String::as_str), Some("agency7"));
    assert_eq!(query.get("page").map(String::as_str), Some("1"));
    assert_eq!(query.get("page_size").map(String::as_str), Some("12"));
    Ok(())
}

#[tokio::test]
async fn cascades_are_classified_against_the_total() -> Result<()> {
    let backend = StubBackend::start().await?.with_commission_rows(vec![
        merchant(1, [10, 5, 5]),
        merchant(2, [10, 5, 4]),
        merchant(3, [10, 5, 6]),
    ]);
    let board = board(&backend).await?;

    assert_eq!(board.check("1")?.status, CascadeStatus::Balanced);
    assert_eq!(board.check("2")?.status, CascadeStatus::Under(Decimal::ONE));
    assert_eq!(board.check("3")?.status, CascadeStatus::Over(Decimal::ONE));
    assert_eq!(board.merchant("1").and_then(|m| m.created_date.clone()).as_deref(), Some("2024-01-05"));
    Ok(())
}

#[tokio::test]
async fn over_allocation_is_never_submitted() -> Result<()> {
    let backend = StubBackend::start().await?.with_commission_rows(vec![merchant(3, [10, 5, 6])]);
    let mut board = board(&backend).await?;

    let err = board.save("3").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Commission(CommissionError::Over { .. })));
    assert!(backend.writes().is_empty());
    Ok(())
}

#[tokio::test]
async fn terminal_above_tier_sum_is_refused() -> Result<()> {
    let backend = StubBackend::start().await?.with_commission_rows(vec![merchant(1, [10, 5, 5])]);
    let mut board = board(&backend).await?;

    board.set_terminal_input("1", "25")?;
    let err = board.save("1").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Commission(CommissionError::TerminalExceedsTiers { .. })));
    assert!(backend.writes().is_empty());
    Ok(())
}

#[tokio::test]
async fn balanced_save_posts_payload_and_refreshes() -> Result<()> {
    let backend = StubBackend::start().await?.with_commission_rows(vec![merchant(1, [10, 5, 4])]);
    let mut board = board(&backend).await?;

    board.set_tier_input("1", 2, "5.00")?;
    board.save("1").await?;

    let sent = backend.requests_to(Method::POST, "/api/store/storeCommissionTable/commissionEdit/1");
    assert_eq!(sent.len(), 1);
    let body = &sent[0].body;
    assert_eq!(body["classify"], "1");
    assert_eq!(body["userId"], "agency7");
    assert_eq!(body["commissionData"]["store_settlement_id"], 1);
    assert_eq!(body["commissionData"]["store_settlement_CC"], 5.0);
    assert_eq!(body["commissionData"]["store_settlement_DC"], 0.0);
    assert_eq!(body["commissionData"]["store_settlement_terminal"], 3.0);
    assert_eq!(body["editData"]["ip"], "unknown");
    assert!(body["editData"]["url"]
        .as_str()
        .unwrap_or_default()
        .ends_with("/api/store/storeCommissionTable/commissionEdit/1"));

    assert!(matches!(board.save_state("1"), SaveState::Saved { .. }));
    assert_eq!(backend.requests_to(Method::GET, "/api/LeftMenu").len(), 1);
    assert_eq!(backend.requests_to(Method::GET, "/api/store/storeCommissionTable").len(), 2);
    assert_eq!(board.menu().map(|m| m.terminal_count), Some(7));
    Ok(())
}

#[tokio::test]
async fn rejected_save_keeps_server_message() -> Result<()> {
    let backend = StubBackend::start()
        .await?
        .with_commission_rows(vec![merchant(1, [10, 5, 5])])
        .reject_writes("Settlement period is closed");
    let mut board = board(&backend).await?;

    let err = board.save("1").await.unwrap_err();
    assert_eq!(err.user_message(), "Settlement period is closed");
    assert_eq!(board.save_state("1"), SaveState::Idle);
    Ok(())
}
