// Resume storage: upsert/list/fetch/delete handlers over a one-row-per-user
// JSONB store, plus the aggregation queries behind the analytics endpoint.

pub mod handlers;
pub mod store;
