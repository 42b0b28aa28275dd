//! Symptom catalog entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "symptom")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub title: String,

    pub category: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Free-text severity tier label ("mild", "moderate", "severe").
    pub severity: String,

    /// Textual weight-loss range for this tier.
    pub weight_loss: String,

    /// Textual fluid-need range for this tier.
    pub fluid_need: String,

    /// Textual recovery-time range for this tier.
    pub recovery_time: String,

    /// Object-store key of the illustration image.
    #[sea_orm(nullable)]
    pub image_key: Option<String>,

    /// Inactive symptoms are hidden from the catalog but remain
    /// referenced by historical request links.
    #[sea_orm(default_value = true)]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::request_symptom::Entity")]
    RequestLinks,
}

impl Related<super::request_symptom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
