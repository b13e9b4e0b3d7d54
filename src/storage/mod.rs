pub mod models;
pub mod store;

pub use models::{
    ClickEvent, CreateMappingRequest, MappingRecord, RequestContext, compute_expires_at,
    parse_validity,
};
pub use store::MappingStore;
