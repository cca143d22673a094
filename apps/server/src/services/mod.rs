//! Service layer: orchestration between HTTP handlers, till-core and till-db.

pub mod checkout;
