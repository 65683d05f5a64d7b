use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer role record keyed 1:1 by profile id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_name: String,
    #[sea_orm(nullable)]
    pub tax_number: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit_limit: Decimal,
    /// Payment terms in days.
    pub payment_terms: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub discount_rate: Decimal,
    #[sea_orm(nullable)]
    pub delivery_address: Option<String>,
    #[sea_orm(nullable)]
    pub billing_address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::Id",
        to = "super::profile::Column::Id"
    )]
    Profile,
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
