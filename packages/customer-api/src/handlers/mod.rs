//! HTTP endpoint implementations.

mod customer_handlers;
mod request_utils;

pub use customer_handlers::{
    create_customer, delete_customer, list_customers, read_customer, update_customer,
};
pub use request_utils::{decode_customer_fields, parse_customer_id};

use hyper::{body::Bytes, Response};

use crate::router::RouterError;
use request_utils::build_text_response;

/// Endpoint overview served at the root path.
pub const WELCOME_TEXT: &str = "\
Welcome to the Customer API

Available endpoints:
  GET    /customers             - list customers
  POST   /customers             - create customer (JSON body: name, role, email, phone, contacted)
  GET    /customers/{id}        - get customer by id
  PUT    /customers/{id}        - update customer (JSON body: name, role, email, phone, contacted)
  DELETE /customers/{id}        - delete customer by id
";

/// Describes the available endpoints.
///
/// # Endpoint
/// `GET /`
///
/// # Response
/// - **200 OK**: Plain-text endpoint list
///
/// Only the exact root path is routed here; every other unmatched path is
/// answered 404 by the router.
pub fn welcome() -> Result<Response<Bytes>, RouterError> {
    build_text_response(200, WELCOME_TEXT)
}
