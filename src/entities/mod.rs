pub mod prelude;

pub mod cards;
pub mod dishes;
pub mod order_items;
pub mod orders;
pub mod profiles;
pub mod restaurants;
pub mod users;
