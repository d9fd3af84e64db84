//! User identity models, re-exported from `pumpfiction_models`.

pub use pumpfiction_models::users::{
    NewUser, PaginatedUsersResponse, UpdateProfileDto, UpdateUserRoleDto, UpdateUserRoleResponse,
    UserFilter, UserFilterParams, UserIdentity,
};
