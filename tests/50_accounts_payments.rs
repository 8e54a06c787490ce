mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::Method;
use serde_json::json;

use common::StubBackend;
use paynet_admin::account::{AccountEditor, AccountError, AccountForm, Registrar};
use paynet_admin::api::{DuplicateField, Role};
use paynet_admin::confirm::FixedAnswer;
use paynet_admin::error::ConsoleError;
use paynet_admin::notify::LogNotifier;
use paynet_admin::payment::{CancelOutcome, CancelTarget, PaymentCanceller};

fn store_form() -> Result<AccountForm> {
    Ok(AccountForm::from_value(json!({
        "upperPath": "HQ > Dist",
        "upperId": "dist01",
        "user_id": "cafe01",
        "store_pass": "s3cret!",
        "store_pass_check": "s3cret!",
        "store_name": "Corner Cafe",
        "store_ceo_name": "J. Park",
        "keyin_state": "1",
        "terminal_state": "0",
        "terminal_Tid": "TT-77",
        "T_catId_date": "2024-05-01",
        "terminal_commission": "3",
        "settlementCommision": "2.5",
    }))?)
}

#[tokio::test]
async fn duplicate_check_hits_the_typed_path() -> Result<()> {
    let backend = StubBackend::start().await?.with_taken_value("TT-77");
    let mut registrar = Registrar::new(backend.client(), common::admin_session(), Arc::new(LogNotifier));

    registrar.check_duplicate(DuplicateField::KeyinTid, "KT-1").await?;
    assert_eq!(registrar.confirmed(DuplicateField::KeyinTid), Some("KT-1"));

    let err = registrar.check_duplicate(DuplicateField::TerminalTid, "TT-77").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Account(AccountError::Duplicated(DuplicateField::TerminalTid))));

    let seen = backend.requests_to(Method::GET, "/api/store/writeOk/duplicateCheck/keyinTid/KT-1");
    assert_eq!(seen.len(), 1);
    Ok(())
}

#[tokio::test]
async fn taken_terminal_tid_stops_store_registration() -> Result<()> {
    let backend = StubBackend::start().await?.with_taken_value("TT-77");
    let mut registrar = Registrar::new(backend.client(), common::partner_session(), Arc::new(LogNotifier));

    let err = registrar.register(Role::Store, &store_form()?).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Account(AccountError::Duplicated(DuplicateField::TerminalTid))));
    assert!(backend.writes().is_empty());
    Ok(())
}

#[tokio::test]
async fn store_registration_posts_the_form() -> Result<()> {
    let backend = StubBackend::start().await?;
    let mut registrar = Registrar::new(backend.client(), common::partner_session(), Arc::new(LogNotifier));

    let message = registrar.register(Role::Store, &store_form()?).await?;
    assert_eq!(message.as_deref(), Some("Saved"));

    let posted = backend.requests_to(Method::POST, "/api/store/writeOk");
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].body["terminal_Tid"], "TT-77");
    assert_eq!(backend.requests_to(Method::GET, "/api/store/writeOk/duplicateCheck/user_id/cafe01").len(), 1);
    Ok(())
}

#[tokio::test]
async fn bank_details_unlock_after_password_recheck() -> Result<()> {
    let backend = StubBackend::start().await?.with_password("hunter2");
    let mut editor = AccountEditor::new(backend.client(), common::partner_session(), Arc::new(LogNotifier));
    let form = AccountForm::from_value(json!({ "user_id": "agency7", "account_name": "Agency Seven" }))?;

    assert!(editor.verify_password("nope").await.is_err());
    assert!(editor.edit(Role::Partner, &form).await.is_err());
    assert!(backend.requests_to(Method::POST, "/api/partner/editOk/sr_23346").is_empty());

    editor.verify_password("hunter2").await?;
    editor.edit(Role::Partner, &form).await?;

    let checks = backend.requests_to(Method::POST, "/api/store/editOk/passCheck");
    assert_eq!(checks[1].body, json!({ "userId": "agency7", "password": "hunter2", "classify": "1" }));
    assert_eq!(backend.requests_to(Method::POST, "/api/partner/editOk/sr_23346").len(), 1);
    Ok(())
}

#[tokio::test]
async fn three_d_cancel_posts_track_id() -> Result<()> {
    let backend = StubBackend::start().await?;
    let canceller = PaymentCanceller::new(backend.client(), common::partner_session(), Arc::new(LogNotifier));
    let target = CancelTarget { track_id: "TRK-5".into(), pay_type: "4".into(), cancel_state: "N".into() };

    let outcome = canceller.cancel(&target, &FixedAnswer(true)).await?;
    assert_eq!(outcome, CancelOutcome::Cancelled(Some("Cancellation complete".to_string())));

    let posted = backend.requests_to(Method::POST, "/api/kwon/payment/3dPay/cancel");
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].body, json!({ "trackId": "TRK-5" }));
    Ok(())
}

#[tokio::test]
async fn cancelled_payment_is_not_sent_again() -> Result<()> {
    let backend = StubBackend::start().await?;
    let canceller = PaymentCanceller::new(backend.client(), common::admin_session(), Arc::new(LogNotifier));
    let target = CancelTarget { track_id: "TRK-6".into(), pay_type: "1".into(), cancel_state: "Y".into() };

    assert!(canceller.cancel(&target, &FixedAnswer(true)).await.is_err());
    assert!(backend.requests().is_empty());
    Ok(())
}
