pub mod attraction_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use attraction_repo::AttractionRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
