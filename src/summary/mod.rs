pub mod audit;
pub mod config;
pub mod extract;
pub mod history;
pub mod models;
pub mod paths;
pub mod request;
pub mod session;
pub mod util;
