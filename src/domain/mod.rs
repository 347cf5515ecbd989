pub mod ids;
pub mod images;
pub mod model;
