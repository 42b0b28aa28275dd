//! Request-symptom link entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Link row between a request and a catalog symptom, unique per
/// (request, symptom) pair. Mutable only while the parent request is in
/// draft state.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request_symptom")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub request_id: String,

    pub symptom_id: String,

    /// Patient-reported intensity, bounded 1..=10.
    #[sea_orm(nullable)]
    pub intensity: Option<i32>,

    /// Whether this is the main presenting symptom.
    #[sea_orm(default_value = false)]
    pub is_main: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dehydration_request::Entity",
        from = "Column::RequestId",
        to = "super::dehydration_request::Column::Id",
        on_delete = "Cascade"
    )]
    Request,

    #[sea_orm(
        belongs_to = "super::symptom::Entity",
        from = "Column::SymptomId",
        to = "super::symptom::Column::Id",
        on_delete = "Restrict"
    )]
    Symptom,
}

impl Related<super::dehydration_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl Related<super::symptom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Symptom.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
