//! Lock-guarded in-memory customer store.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::customer::{Customer, CustomerFields, CustomerId};
use crate::error::StoreError;

/// Records and the identifier counter, guarded together by one lock.
#[derive(Debug)]
struct StoreState {
    /// Records in insertion order
    customers: Vec<Customer>,
    /// Next identifier to hand out; greater than every id ever assigned
    next_id: CustomerId,
}

impl StoreState {
    fn position(&self, id: CustomerId) -> Option<usize> {
        self.customers.iter().position(|c| c.id == id)
    }
}

/// Authoritative in-memory holder of all customer records.
///
/// Reads (`list`, `get`) take the lock in shared mode and may run
/// concurrently. Writes (`create`, `update`, `delete`) take it in exclusive
/// mode, so no reader observes a partially applied mutation.
#[derive(Debug)]
pub struct CustomerStore {
    state: RwLock<StoreState>,
}

impl CustomerStore {
    /// Creates an empty store whose first identifier is 1.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                customers: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Creates a store holding the three demo records, with the counter at 4.
    pub fn seeded() -> Self {
        let seed = vec![
            seed_customer(1, "Alice Johnson", "Manager", "alice@example.com", "555-0101", true),
            seed_customer(2, "Bob Smith", "Engineer", "bob@example.com", "555-0202", false),
            seed_customer(3, "Eve Davis", "Support", "eve@example.com", "555-0303", false),
        ];
        Self {
            state: RwLock::new(StoreState {
                customers: seed,
                next_id: 4,
            }),
        }
    }

    /// Creates a store from existing records.
    ///
    /// The counter starts one past the highest identifier present.
    ///
    /// # Errors
    /// `StoreError::DuplicateId` if two records share an identifier.
    pub fn with_customers(customers: Vec<Customer>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(customers.len());
        for customer in &customers {
            if !seen.insert(customer.id) {
                return Err(StoreError::DuplicateId { id: customer.id });
            }
        }
        let next_id = customers.iter().map(|c| c.id).max().map_or(1, |max| max + 1);
        Ok(Self {
            state: RwLock::new(StoreState { customers, next_id }),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Returns a copy of every record in insertion order.
    pub fn list(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.read()?.customers.clone())
    }

    /// Appends a new record and returns it.
    ///
    /// Identifier assignment and insertion happen under one exclusive lock,
    /// so concurrent creates never share an identifier. The name is not
    /// validated here.
    pub fn create(&self, fields: CustomerFields) -> Result<Customer, StoreError> {
        let mut state = self.write()?;
        let customer = Customer::from_fields(state.next_id, fields);
        state.next_id += 1;
        state.customers.push(customer.clone());
        tracing::info!(id = customer.id, "customer created");
        Ok(customer)
    }

    /// Returns a copy of the record with the given identifier.
    pub fn get(&self, id: CustomerId) -> Result<Customer, StoreError> {
        let state = self.read()?;
        state
            .customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::CustomerNotFound { id })
    }

    /// Replaces all mutable fields of a record in place.
    ///
    /// Full replace, not merge: fields absent from `fields` become empty.
    /// The name is not re-validated.
    pub fn update(&self, id: CustomerId, fields: CustomerFields) -> Result<Customer, StoreError> {
        let mut state = self.write()?;
        let index = state
            .position(id)
            .ok_or(StoreError::CustomerNotFound { id })?;
        let customer = &mut state.customers[index];
        customer.replace_fields(fields);
        tracing::info!(id, "customer updated");
        Ok(customer.clone())
    }

    /// Removes a record, keeping the relative order of the rest.
    pub fn delete(&self, id: CustomerId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let index = state
            .position(id)
            .ok_or(StoreError::CustomerNotFound { id })?;
        state.customers.remove(index);
        tracing::info!(id, "customer deleted");
        Ok(())
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.customers.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Returns the identifier the next create will receive.
    pub fn next_id(&self) -> Result<CustomerId, StoreError> {
        Ok(self.read()?.next_id)
    }
}

impl Default for CustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_customer(
    id: CustomerId,
    name: &str,
    role: &str,
    email: &str,
    phone: &str,
    contacted: bool,
) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        role: role.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        contacted,
    }
}
