//! Announcement entity: resident notice detail row paired with an inquiry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Announcement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum AnnouncementCategory {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "rental")]
    Rental,
    #[sea_orm(string_value = "repair")]
    Repair,
    #[sea_orm(string_value = "utilityOutage")]
    UtilityOutage,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "announcement")]
pub struct Model {
    /// Same as inquiry.id (base/derived pairing)
    #[sea_orm(primary_key, auto_increment = false)]
    pub inquiry_id: String,

    /// Whether the creator has published the announcement.
    pub is_visible: bool,

    /// Date after which the announcement stops being shown to non-creators.
    #[sea_orm(nullable)]
    pub auto_invisible_date: Option<Date>,

    pub category: AnnouncementCategory,
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
}

impl Related<super::inquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
