use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patch::Patch;
use super::validate::{in_range, max_len, not_blank};
use crate::error::DomainError;

/// Location entity - a point of interest shown on the portal map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub is_active: bool,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    pub const MAX_NAME_LEN: usize = 200;
    pub const MAX_IMAGE_URL_LEN: usize = 500;
    pub const MAX_PHONE_LEN: usize = 20;
    pub const MAX_EMAIL_LEN: usize = 100;
    pub const MAX_WEBSITE_LEN: usize = 200;

    pub fn new(input: NewLocation) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            address: input.address.trim().to_string(),
            description: input.description,
            image_url: input.image_url,
            latitude: input.latitude,
            longitude: input.longitude,
            phone: input.phone,
            email: input.email,
            website: input.website,
            opening_hours: input.opening_hours,
            is_active: input.is_active.unwrap_or(true),
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Check field-level invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        not_blank("name", &self.name)?;
        not_blank("address", &self.address)?;
        max_len("name", Some(&self.name), Self::MAX_NAME_LEN)?;
        max_len("imageUrl", self.image_url.as_deref(), Self::MAX_IMAGE_URL_LEN)?;
        max_len("phone", self.phone.as_deref(), Self::MAX_PHONE_LEN)?;
        max_len("email", self.email.as_deref(), Self::MAX_EMAIL_LEN)?;
        max_len("website", self.website.as_deref(), Self::MAX_WEBSITE_LEN)?;
        in_range("latitude", self.latitude, -90.0, 90.0)?;
        in_range("longitude", self.longitude, -180.0, 180.0)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                return Err(DomainError::validation("email is not a valid address"));
            }
        }
        Ok(())
    }
}

/// Create payload for a location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    pub name: String,
    pub address: String,
    pub category_id: Uuid,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial update for a location.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationPatch {
    pub name: Patch<String>,
    pub address: Patch<String>,
    pub category_id: Patch<Uuid>,
    pub description: Patch<String>,
    pub image_url: Patch<String>,
    pub latitude: Patch<f64>,
    pub longitude: Patch<f64>,
    pub phone: Patch<String>,
    pub email: Patch<String>,
    pub website: Patch<String>,
    pub opening_hours: Patch<String>,
    pub is_active: Patch<bool>,
}

impl LocationPatch {
    /// Apply every field except `category_id`, which the service resolves.
    pub fn apply_to(self, location: &mut Location) -> Result<(), DomainError> {
        self.name.apply_required(&mut location.name, "name")?;
        self.address.apply_required(&mut location.address, "address")?;
        self.is_active.apply_required(&mut location.is_active, "isActive")?;
        self.description.apply(&mut location.description);
        self.image_url.apply(&mut location.image_url);
        self.latitude.apply(&mut location.latitude);
        self.longitude.apply(&mut location.longitude);
        self.phone.apply(&mut location.phone);
        self.email.apply(&mut location.email);
        self.website.apply(&mut location.website);
        self.opening_hours.apply(&mut location.opening_hours);
        location.updated_at = Utc::now();
        Ok(())
    }
}

/// Inclusive latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Result<Self, DomainError> {
        if min_lat > max_lat || min_lng > max_lng {
            return Err(DomainError::validation(
                "Bounds minimum must not exceed maximum",
            ));
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Sortable location columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationSort {
    #[default]
    Name,
    Address,
    CreatedAt,
    UpdatedAt,
}

impl std::str::FromStr for LocationSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(LocationSort::Name),
            "address" => Ok(LocationSort::Address),
            "createdAt" => Ok(LocationSort::CreatedAt),
            "updatedAt" => Ok(LocationSort::UpdatedAt),
            other => Err(DomainError::validation(format!(
                "Cannot sort locations by '{other}'"
            ))),
        }
    }
}

/// Filter applied by location queries. All set criteria must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFilter {
    pub active_only: bool,
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of name or address.
    pub search: Option<String>,
    pub bounds: Option<GeoBounds>,
    pub with_phone: bool,
    pub with_coordinates: bool,
}

impl LocationFilter {
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Blank queries are ignored.
    pub fn matching(mut self, query: Option<&str>) -> Self {
        self.search = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        self
    }

    pub fn within(mut self, bounds: GeoBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// In-memory evaluation of the filter, mirroring the SQL predicates.
    pub fn matches(&self, location: &Location) -> bool {
        if self.active_only && !location.is_active {
            return false;
        }
        if self.category_id.is_some_and(|id| id != location.category_id) {
            return false;
        }
        if let Some(query) = &self.search {
            let query = query.to_lowercase();
            if !location.name.to_lowercase().contains(&query)
                && !location.address.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        if let Some(bounds) = &self.bounds {
            match (location.latitude, location.longitude) {
                (Some(lat), Some(lng)) if bounds.contains(lat, lng) => {}
                _ => return false,
            }
        }
        if self.with_phone && !location.has_phone() {
            return false;
        }
        if self.with_coordinates && !location.has_coordinates() {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Location {
        Location::new(NewLocation {
            name: "Chợ Trung tâm".to_string(),
            address: "Đường Trần Phú".to_string(),
            category_id: Uuid::new_v4(),
            description: None,
            image_url: None,
            latitude: Some(21.52),
            longitude: Some(107.96),
            phone: None,
            email: None,
            website: None,
            opening_hours: None,
            is_active: None,
        })
    }

    #[test]
    fn test_new_location_defaults_to_active() {
        assert!(sample().is_active);
    }

    #[test]
    fn test_validate_rejects_out_of_range_latitude() {
        let mut location = sample();
        location.latitude = Some(91.0);
        assert!(location.validate().is_err());
        location.latitude = Some(-90.0);
        assert!(location.validate().is_ok());
    }

    #[test]
    fn test_filter_search_matches_address_case_insensitively() {
        let location = sample();
        let filter = LocationFilter::active().matching(Some("trần"));
        assert!(filter.matches(&location));
        let filter = LocationFilter::active().matching(Some("bến"));
        assert!(!filter.matches(&location));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = GeoBounds::new(21.52, 21.6, 107.9, 107.96).unwrap();
        assert!(bounds.contains(21.52, 107.96));
        assert!(!bounds.contains(21.51, 107.96));
    }

    #[test]
    fn test_bounds_reject_inverted_box() {
        assert!(GeoBounds::new(22.0, 21.0, 107.0, 108.0).is_err());
    }
}
