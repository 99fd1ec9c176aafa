pub mod attraction;
pub mod dashboard;
pub mod opening_hours;
pub mod ticket;
pub mod user;
