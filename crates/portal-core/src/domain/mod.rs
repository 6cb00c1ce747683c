//! Domain entities - the core business objects.

mod actor;
mod category;
mod location;
mod page;
mod patch;
mod post;
mod user;
mod validate;

pub use actor::Actor;
pub use category::{Category, CategoryInput, CategoryType, DeletePolicy};
pub use location::{GeoBounds, Location, LocationFilter, LocationPatch, LocationSort, NewLocation};
pub use page::{Page, PageRequest, Sort, SortDirection, row_offset};
pub use patch::Patch;
pub use post::{DEFAULT_AUTHOR, NewPost, Post, PostFilter, PostPatch, PostSort, PostStats};
pub use user::{NewUser, User, UserPatch, UserRole};
pub(crate) use user::validate_password;
