pub mod config;
pub mod domain;
pub mod errors;

pub use domain::query::Query;
pub use domain::response::{
    AgentResponse, AggregateResponse, NOT_FOUND_MESSAGE, NO_PRODUCTS_SENTINEL,
};
pub use domain::routing::{AgentKind, Category, KeywordRegistry, KeywordRoute};
pub use errors::{ApplicationError, DomainError, InterfaceError};
