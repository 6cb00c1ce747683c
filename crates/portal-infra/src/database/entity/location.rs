//! Location entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use portal_core::domain::Location;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub opening_hours: Option<String>,
    pub is_active: bool,
    pub category_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Location {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            description: model.description,
            image_url: model.image_url,
            latitude: model.latitude,
            longitude: model.longitude,
            phone: model.phone,
            email: model.email,
            website: model.website,
            opening_hours: model.opening_hours,
            is_active: model.is_active,
            category_id: model.category_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Location> for ActiveModel {
    fn from(location: Location) -> Self {
        Self {
            id: Set(location.id),
            name: Set(location.name),
            address: Set(location.address),
            description: Set(location.description),
            image_url: Set(location.image_url),
            latitude: Set(location.latitude),
            longitude: Set(location.longitude),
            phone: Set(location.phone),
            email: Set(location.email),
            website: Set(location.website),
            opening_hours: Set(location.opening_hours),
            is_active: Set(location.is_active),
            category_id: Set(location.category_id),
            created_at: Set(location.created_at.into()),
            updated_at: Set(location.updated_at.into()),
        }
    }
}
