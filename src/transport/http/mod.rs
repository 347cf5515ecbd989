pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod debug;
    pub mod health;
    pub mod inquiries;
    pub mod products;
}

pub use router::{create_router, ApiDoc};
pub use types::{AppState, Diagnostics, RouterOptions};
