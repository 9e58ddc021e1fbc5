//! Poll entity: vote detail row paired with an inquiry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    /// Same as inquiry.id (base/derived pairing)
    #[sea_orm(primary_key, auto_increment = false)]
    pub inquiry_id: String,

    /// Date voting closes.
    pub deadline: Date,

    /// Whether running totals are shown before the deadline.
    pub preliminary_results: bool,
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

    #[sea_orm(has_many = "super::vote_option::Entity")]
    VoteOptions,
}

impl Related<super::inquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inquiry.def()
    }
}

impl Related<super::vote_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteOptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
