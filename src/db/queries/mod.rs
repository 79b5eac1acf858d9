pub mod applications;
pub mod permit_offices;
pub mod reviews;
pub mod users;
