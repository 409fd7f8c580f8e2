//! Table definitions and queries, one module per resource.

pub mod ai_images;
pub mod images;
pub mod liuma_media;
pub mod lucky_draw;
pub mod messages;
