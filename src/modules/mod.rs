pub mod role_applications;
pub mod users;
