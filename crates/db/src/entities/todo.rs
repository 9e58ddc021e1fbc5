//! Todo entity: maintenance-request detail row paired with an inquiry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Todo priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum TodoPriority {
    #[sea_orm(string_value = "highest")]
    Highest,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "low")]
    Low,
}

/// Todo lifecycle status.
///
/// `new -> in-progress -> in-review -> completed`, with a reject transition
/// from in-review back to in-progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum TodoStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "inProgress")]
    InProgress,
    #[sea_orm(string_value = "inReview")]
    InReview,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Todo category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum TodoCategory {
    #[sea_orm(string_value = "plumbing")]
    Plumbing,
    #[sea_orm(string_value = "electrical")]
    Electrical,
    #[sea_orm(string_value = "repair")]
    Repair,
    #[sea_orm(string_value = "elevator")]
    Elevator,
    #[sea_orm(string_value = "commonArea")]
    CommonArea,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todo")]
pub struct Model {
    /// Same as inquiry.id (base/derived pairing)
    #[sea_orm(primary_key, auto_increment = false)]
    pub inquiry_id: String,

    pub priority: TodoPriority,

    pub status: TodoStatus,

    pub category: TodoCategory,

    /// Set null when the assigned user is deleted or the task completes.
    #[sea_orm(nullable)]
    pub assignee_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inquiry::Entity",
        from = "Column::InquiryId",
        to = "super::inquiry::Column::Id",
        on_delete = "Cascade"
    )]
    Inquiry,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssigneeId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Assignee,
}

impl Related<super::inquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiry.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
