pub mod health_route;
pub mod info_route;
pub mod query_route;
