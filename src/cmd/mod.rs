pub mod budget;
pub mod perks;
pub mod search;
