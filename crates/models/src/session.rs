//! Persisted session row and the row-level queries the store adapters build on.
//!
//! Every query is generic over [`ConnectionTrait`] so it runs the same on a
//! pool handle or inside a transaction.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expiration: DateTimeUtc,
    pub payload: Json,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

fn active_model(id: &str, expiration: DateTime<Utc>, payload: serde_json::Value) -> ActiveModel {
    ActiveModel {
        id: Set(id.to_string()),
        expiration: Set(expiration),
        payload: Set(payload),
        updated_at: Set(Utc::now()),
    }
}

/// Point lookup by primary key.
pub async fn find<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id.to_string()).one(db).await?)
}

/// Native insert-or-replace keyed by `id`.
pub async fn upsert<C: ConnectionTrait>(
    db: &C,
    id: &str,
    expiration: DateTime<Utc>,
    payload: serde_json::Value,
) -> Result<(), ModelError> {
    Entity::insert(active_model(id, expiration, payload))
        .on_conflict(
            OnConflict::column(Column::Id)
                .update_columns([Column::Expiration, Column::Payload, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Lookup, delete any existing row, then insert. Only atomic when `db` is a
/// transaction; callers own that scope.
pub async fn replace<C: ConnectionTrait>(
    db: &C,
    id: &str,
    expiration: DateTime<Utc>,
    payload: serde_json::Value,
) -> Result<(), ModelError> {
    if find(db, id).await?.is_some() {
        Entity::delete_by_id(id.to_string()).exec(db).await?;
    }
    Entity::insert(active_model(id, expiration, payload))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Delete by primary key; returns whether a row existed.
pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id.to_string()).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Range delete of every row with `expiration <= now`.
pub async fn delete_expired<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Expiration.lte(now))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, ModelError> {
    Ok(Entity::find().count(db).await?)
}
