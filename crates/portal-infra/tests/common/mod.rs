#![allow(dead_code)]

use std::sync::Arc;

use portal_core::domain::{Category, CategoryInput, CategoryType, NewLocation, NewPost};
use portal_core::{CategoryService, LocationService, PostService};
use portal_infra::InMemoryStore;
use uuid::Uuid;

pub struct Services {
    pub categories: CategoryService,
    pub locations: LocationService,
    pub posts: PostService,
}

pub fn services() -> Services {
    let store = Arc::new(InMemoryStore::new());
    Services {
        categories: CategoryService::new(store.clone()),
        locations: LocationService::new(store.clone(), store.clone()),
        posts: PostService::new(store.clone(), store),
    }
}

pub fn category_input(name: &str, category_type: CategoryType) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        category_type,
        description: None,
        icon: None,
    }
}

pub async fn category(services: &Services, name: &str, category_type: CategoryType) -> Category {
    services
        .categories
        .create(category_input(name, category_type))
        .await
        .unwrap()
}

pub fn new_location(name: &str, category_id: Uuid) -> NewLocation {
    NewLocation {
        name: name.to_string(),
        address: format!("{name}, Móng Cái"),
        category_id,
        description: None,
        image_url: None,
        latitude: None,
        longitude: None,
        phone: None,
        email: None,
        website: None,
        opening_hours: None,
        is_active: None,
    }
}

pub fn located(name: &str, category_id: Uuid, lat: f64, lng: f64) -> NewLocation {
    NewLocation {
        latitude: Some(lat),
        longitude: Some(lng),
        ..new_location(name, category_id)
    }
}

pub fn new_post(title: &str, category_id: Uuid) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: format!("Nội dung {title}"),
        category_id,
        summary: None,
        thumbnail_url: None,
        author: None,
        is_featured: None,
        is_urgent: None,
        published_at: None,
    }
}
