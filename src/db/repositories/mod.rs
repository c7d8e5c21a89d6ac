pub mod card;
pub mod order;
pub mod profile;
pub mod restaurant;
pub mod user;
