//! Dehydration request entity and its lifecycle states.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request lifecycle status.
///
/// `draft → formed → {completed, rejected}`; any state may additionally be
/// marked `deleted` by the owner. All transitions go through
/// [`RequestStatus::can_transition_to`] — handlers never compare raw
/// status strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum RequestStatus {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,
    #[sea_orm(string_value = "formed")]
    Formed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

impl RequestStatus {
    /// Whether a transition from `self` to `to` is legal.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        match (self, to) {
            // Owner soft-delete is allowed from any live state
            (Self::Draft | Self::Formed | Self::Completed | Self::Rejected, Self::Deleted) => true,
            (Self::Draft, Self::Formed) => true,
            (Self::Formed, Self::Completed | Self::Rejected) => true,
            _ => false,
        }
    }

    /// Whether the request contents may still be edited by the owner.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Whether the request is a terminal, moderator-resolved verdict.
    #[must_use]
    pub const fn is_verdict(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dehydration_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning user; exclusive, set at creation.
    pub user_id: String,

    pub status: RequestStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub formed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeWithTimeZone>,

    /// Moderator who completed or rejected the request.
    #[sea_orm(nullable)]
    pub moderator_id: Option<String>,

    /// Patient weight in kilograms.
    #[sea_orm(nullable)]
    pub patient_weight: Option<f64>,

    /// Dehydration percentage, explicit or estimated at completion.
    #[sea_orm(nullable)]
    pub dehydration_percent: Option<f64>,

    /// Fluid deficit in liters: weight * percent * 0.01.
    #[sea_orm(nullable)]
    pub fluid_deficit: Option<f64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub doctor_comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Owner,

    #[sea_orm(has_many = "super::request_symptom::Entity")]
    SymptomLinks,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::request_symptom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SymptomLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
