use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::require_category;
use crate::domain::{
    CategoryType, GeoBounds, Location, LocationFilter, LocationPatch, LocationSort, NewLocation,
    Page, PageRequest, Patch, Sort,
};
use crate::error::{DomainError, DomainResult};
use crate::ports::{CategoryRepository, LocationRepository};

/// Points of interest. Listings only ever show active locations.
#[derive(Clone)]
pub struct LocationService {
    locations: Arc<dyn LocationRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl LocationService {
    pub fn new(
        locations: Arc<dyn LocationRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            locations,
            categories,
        }
    }

    pub async fn list_active(
        &self,
        request: PageRequest<LocationSort>,
    ) -> DomainResult<Page<Location>> {
        Ok(self.locations.page(&LocationFilter::active(), request).await?)
    }

    pub async fn list_active_all(&self) -> DomainResult<Vec<Location>> {
        self.list_all(LocationFilter::active()).await
    }

    /// Fetch by id regardless of the active flag.
    pub async fn get(&self, id: Uuid) -> DomainResult<Location> {
        self.locations
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Location", id))
    }

    pub async fn list_by_category(
        &self,
        category_id: Uuid,
        request: PageRequest<LocationSort>,
    ) -> DomainResult<Page<Location>> {
        let filter = LocationFilter::active().in_category(category_id);
        Ok(self.locations.page(&filter, request).await?)
    }

    pub async fn list_by_category_all(&self, category_id: Uuid) -> DomainResult<Vec<Location>> {
        self.list_all(LocationFilter::active().in_category(category_id))
            .await
    }

    /// Name/address search over active locations, optionally within one
    /// category. A blank query falls back to the plain listing.
    pub async fn search(
        &self,
        query: &str,
        category_id: Option<Uuid>,
        request: PageRequest<LocationSort>,
    ) -> DomainResult<Page<Location>> {
        let filter = Self::search_filter(query, category_id);
        Ok(self.locations.page(&filter, request).await?)
    }

    pub async fn search_all(
        &self,
        query: &str,
        category_id: Option<Uuid>,
    ) -> DomainResult<Vec<Location>> {
        self.list_all(Self::search_filter(query, category_id)).await
    }

    /// Active locations inside the inclusive box, ordered by name.
    pub async fn within_bounds(&self, bounds: GeoBounds) -> DomainResult<Vec<Location>> {
        self.list_all(LocationFilter::active().within(bounds)).await
    }

    pub async fn with_phone(&self) -> DomainResult<Vec<Location>> {
        let filter = LocationFilter {
            with_phone: true,
            ..LocationFilter::active()
        };
        self.list_all(filter).await
    }

    pub async fn with_coordinates(&self) -> DomainResult<Vec<Location>> {
        let filter = LocationFilter {
            with_coordinates: true,
            ..LocationFilter::active()
        };
        self.list_all(filter).await
    }

    pub async fn count_by_category(&self, category_id: Uuid) -> DomainResult<u64> {
        let filter = LocationFilter::active().in_category(category_id);
        Ok(self.locations.count(&filter).await?)
    }

    pub async fn create(&self, input: NewLocation) -> DomainResult<Location> {
        require_category(self.categories.as_ref(), input.category_id, CategoryType::Location)
            .await?;

        let location = Location::new(input);
        location.validate()?;
        let location = self.locations.insert(location).await?;
        info!(location_id = %location.id, name = %location.name, "Location created");
        Ok(location)
    }

    pub async fn update(&self, id: Uuid, mut patch: LocationPatch) -> DomainResult<Location> {
        let mut location = self.get(id).await?;

        match std::mem::take(&mut patch.category_id) {
            Patch::Absent => {}
            Patch::Null => {
                return Err(DomainError::validation("categoryId cannot be null"));
            }
            Patch::Value(category_id) => {
                require_category(self.categories.as_ref(), category_id, CategoryType::Location)
                    .await?;
                location.category_id = category_id;
            }
        }

        patch.apply_to(&mut location)?;
        location.validate()?;
        let location = self.locations.update(location).await?;
        info!(location_id = %id, "Location updated");
        Ok(location)
    }

    /// Mark inactive. The row stays retrievable by id.
    pub async fn soft_delete(&self, id: Uuid) -> DomainResult<()> {
        let mut location = self.get(id).await?;
        location.is_active = false;
        location.updated_at = Utc::now();
        self.locations.update(location).await?;
        info!(location_id = %id, "Location deactivated");
        Ok(())
    }

    pub async fn delete_permanently(&self, id: Uuid) -> DomainResult<()> {
        if !self.locations.delete(id).await? {
            return Err(DomainError::not_found("Location", id));
        }
        info!(location_id = %id, "Location deleted");
        Ok(())
    }

    pub async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.locations.exists(id).await?)
    }

    fn search_filter(query: &str, category_id: Option<Uuid>) -> LocationFilter {
        let filter = LocationFilter::active().matching(Some(query));
        match category_id {
            Some(category_id) => filter.in_category(category_id),
            None => filter,
        }
    }

    async fn list_all(&self, filter: LocationFilter) -> DomainResult<Vec<Location>> {
        Ok(self
            .locations
            .list(&filter, Sort::asc(LocationSort::Name))
            .await?)
    }
}
