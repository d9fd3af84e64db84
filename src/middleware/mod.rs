//! Request authentication and authorization.
//!
//! 1. The client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the token's signature, expiry and audience
//! 3. [`auth::CurrentUser`] loads the caller from the role store
//! 4. [`role::require_admin`] gates admin route groups on the stored role
//!
//! ```ignore
//! async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserIdentity> {
//!     Json(user)
//! }
//! ```

pub mod auth;
pub mod role;
