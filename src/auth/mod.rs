pub mod google;
pub mod guard;
pub mod jwt;
