//! Category entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use portal_core::domain::{Category, CategoryType};

/// Stored form of `CategoryType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum CategoryKind {
    #[sea_orm(string_value = "LOCATION")]
    Location,
    #[sea_orm(string_value = "POST")]
    Post,
}

impl From<CategoryKind> for CategoryType {
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Location => CategoryType::Location,
            CategoryKind::Post => CategoryType::Post,
        }
    }
}

impl From<CategoryType> for CategoryKind {
    fn from(category_type: CategoryType) -> Self {
        match category_type {
            CategoryType::Location => CategoryKind::Location,
            CategoryType::Post => CategoryKind::Post,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub kind: CategoryKind,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::location::Entity")]
    Location,
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category_type: model.kind.into(),
            description: model.description,
            icon: model.icon,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Category> for ActiveModel {
    fn from(category: Category) -> Self {
        Self {
            id: Set(category.id),
            name: Set(category.name),
            kind: Set(category.category_type.into()),
            description: Set(category.description),
            icon: Set(category.icon),
            created_at: Set(category.created_at.into()),
            updated_at: Set(category.updated_at.into()),
        }
    }
}
