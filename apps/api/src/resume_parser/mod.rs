// Resume parser page: structured resume fields extracted by a cloud
// service bound to a fixed schema.

pub mod cloud;
pub mod handlers;
pub mod schema;
