//! Customer CRUD (Create, Read, Update, Delete) handlers.

use std::fmt::Display;

use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_empty_response, build_json_response, decode_customer_fields, parse_customer_id,
    read_request_body_with_timeout,
};

/// Lists every customer.
///
/// # Endpoint
/// `GET /customers`
///
/// # Response
/// - **200 OK**: JSON array of records in insertion order
/// ```json
/// [
///   {"id": 1, "name": "Alice Johnson", "role": "Manager",
///    "email": "alice@example.com", "phone": "555-0101", "contacted": true}
/// ]
/// ```
///
/// # Example
/// ```bash
/// curl http://localhost:8080/customers
/// ```
pub fn list_customers(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let customers = state.store.list()?;
    build_json_response(200, &customers)
}

/// Creates a new customer.
///
/// # Endpoint
/// `POST /customers`
///
/// # Request Body
/// ```json
/// {"name": "Zed", "role": "", "email": "", "phone": "", "contacted": false}
/// ```
///
/// # Response
/// - **201 Created**: The stored record with its assigned id
///
/// # Errors
/// - **400 Bad Request**: Body is not valid JSON, or name is blank
///   (a `null` body counts as blank)
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:8080/customers \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Zed"}'
/// ```
pub async fn create_customer<B>(
    req: Request<B>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: Display,
{
    let body_bytes = read_request_body_with_timeout(req, state.config.read_timeout()).await?;
    let fields = decode_customer_fields(&body_bytes)?;

    if !fields.has_name() {
        return Err(RouterError::BadRequest("name required".to_string()));
    }

    let customer = state.store.create(fields)?;

    build_json_response(201, &customer)
}

/// Reads a customer by id.
///
/// # Endpoint
/// `GET /customers/{id}`
///
/// # Response
/// - **200 OK**: The record as JSON
///
/// # Errors
/// - **400 Bad Request**: `id` is not an integer
/// - **404 Not Found**: No customer with that id (empty body)
///
/// # Example
/// ```bash
/// curl http://localhost:8080/customers/1
/// ```
pub fn read_customer(segment: &str, state: AppState) -> Result<Response<Bytes>, RouterError> {
    let id = parse_customer_id(segment)?;
    let customer = state.store.get(id)?;
    build_json_response(200, &customer)
}

/// Replaces every field of a customer.
///
/// # Endpoint
/// `PUT /customers/{id}`
///
/// # Request Body
/// ```json
/// {"name": "Bobby", "contacted": true}
/// ```
///
/// # Response
/// - **200 OK**: The updated record as JSON
///
/// # Errors
/// - **400 Bad Request**: `id` is not an integer, or body is not valid JSON
/// - **404 Not Found**: No customer with that id (empty body)
///
/// # Notes
/// - Full replace: fields missing from the body become empty, and a
///   `null` body clears every field
/// - The name is not checked for blankness, unlike create
///
/// # Example
/// ```bash
/// curl -X PUT http://localhost:8080/customers/2 \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Bobby", "contacted": true}'
/// ```
pub async fn update_customer<B>(
    req: Request<B>,
    segment: &str,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: Display,
{
    let id = parse_customer_id(segment)?;

    let body_bytes = read_request_body_with_timeout(req, state.config.read_timeout()).await?;
    let fields = decode_customer_fields(&body_bytes)?;

    let customer = state.store.update(id, fields)?;

    build_json_response(200, &customer)
}

/// Deletes a customer by id.
///
/// # Endpoint
/// `DELETE /customers/{id}`
///
/// # Response
/// - **204 No Content**: Customer removed
///
/// # Errors
/// - **400 Bad Request**: `id` is not an integer
/// - **404 Not Found**: No customer with that id
///
/// # Example
/// ```bash
/// curl -X DELETE http://localhost:8080/customers/1
/// ```
pub fn delete_customer(segment: &str, state: AppState) -> Result<Response<Bytes>, RouterError> {
    let id = parse_customer_id(segment)?;
    state.store.delete(id)?;
    build_empty_response(204)
}
