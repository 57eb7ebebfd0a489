pub mod photos;
pub mod relay;
pub mod view;
