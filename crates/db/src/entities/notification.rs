//! Notification entity: per-recipient detail row paired with an inquiry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "billing")]
    Billing,
    #[sea_orm(string_value = "meterReadings")]
    MeterReadings,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    /// Same as inquiry.id (base/derived pairing)
    #[sea_orm(primary_key, auto_increment = false)]
    pub inquiry_id: String,

    /// The user receiving the notification.
    #[sea_orm(indexed)]
    pub recipient_id: String,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub category: NotificationCategory,
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
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl Related<super::inquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiry.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
