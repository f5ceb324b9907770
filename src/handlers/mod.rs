pub mod category;
pub mod gacha;
pub mod quiz;
pub mod user;
