pub mod controller;
pub mod router;
pub mod service;
pub mod store;

pub use service::UserCore;
pub use store::UserStore;
