pub mod application;
pub mod document;
pub mod permit_office;
pub mod review;
pub mod user;
