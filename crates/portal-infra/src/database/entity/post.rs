//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use portal_core::domain::Post;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    pub thumbnail_url: Option<String>,
    pub author: String,
    pub is_featured: bool,
    pub is_urgent: bool,
    pub view_count: i32,
    pub published_at: DateTimeWithTimeZone,
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

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            summary: model.summary,
            thumbnail_url: model.thumbnail_url,
            author: model.author,
            is_featured: model.is_featured,
            is_urgent: model.is_urgent,
            view_count: model.view_count,
            published_at: model.published_at.into(),
            category_id: model.category_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            summary: Set(post.summary),
            thumbnail_url: Set(post.thumbnail_url),
            author: Set(post.author),
            is_featured: Set(post.is_featured),
            is_urgent: Set(post.is_urgent),
            view_count: Set(post.view_count),
            published_at: Set(post.published_at.into()),
            category_id: Set(post.category_id),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
