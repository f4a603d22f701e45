use crate::session;
use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::json;

use super::setup_test_db;

#[tokio::test]
async fn test_upsert_then_find() -> Result<()> {
    let db = setup_test_db().await?;
    let exp = Utc::now() + Duration::days(5);

    session::upsert(&db, "a", exp, json!({"user": "benny"})).await?;
    let found = session::find(&db, "a").await?.expect("row");
    assert_eq!(found.id, "a");
    assert_eq!(found.payload, json!({"user": "benny"}));
    assert_eq!(found.expiration.timestamp_millis(), exp.timestamp_millis());

    assert!(session::find(&db, "missing").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_upsert_replaces_existing_row() -> Result<()> {
    let db = setup_test_db().await?;
    let exp = Utc::now() + Duration::hours(1);

    session::upsert(&db, "a", exp, json!({"v": 1})).await?;
    session::upsert(&db, "a", exp + Duration::hours(1), json!({"v": 2})).await?;

    assert_eq!(session::count(&db).await?, 1);
    let found = session::find(&db, "a").await?.expect("row");
    assert_eq!(found.payload, json!({"v": 2}));
    Ok(())
}

#[tokio::test]
async fn test_replace_matches_upsert() -> Result<()> {
    let db = setup_test_db().await?;
    let exp = Utc::now() + Duration::hours(1);

    session::replace(&db, "a", exp, json!({"v": 1})).await?;
    session::replace(&db, "a", exp, json!({"v": 2})).await?;

    assert_eq!(session::count(&db).await?, 1);
    assert_eq!(session::find(&db, "a").await?.expect("row").payload, json!({"v": 2}));
    Ok(())
}

#[tokio::test]
async fn test_delete_reports_existence() -> Result<()> {
    let db = setup_test_db().await?;
    session::upsert(&db, "a", Utc::now(), json!(null)).await?;

    assert!(session::delete(&db, "a").await?);
    assert!(!session::delete(&db, "a").await?);
    assert!(session::find(&db, "a").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_delete_expired_is_inclusive() -> Result<()> {
    let db = setup_test_db().await?;
    let now = Utc::now();

    session::upsert(&db, "past", now - Duration::minutes(1), json!({})).await?;
    session::upsert(&db, "edge", now, json!({})).await?;
    session::upsert(&db, "future", now + Duration::minutes(1), json!({})).await?;

    assert_eq!(session::delete_expired(&db, now).await?, 2);
    assert_eq!(session::delete_expired(&db, now).await?, 0);
    assert!(session::find(&db, "future").await?.is_some());
    assert!(session::find(&db, "edge").await?.is_none());
    Ok(())
}
