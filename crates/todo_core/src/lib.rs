pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod page;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;
