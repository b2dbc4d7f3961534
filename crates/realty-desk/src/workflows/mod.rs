pub mod location;
pub mod map;
pub mod moderation;
pub mod mortgage;
