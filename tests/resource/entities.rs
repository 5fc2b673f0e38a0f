use keel::{Entity, Record, Snapshot};
use rust_decimal::Decimal;
use time::PrimitiveDateTime;

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[keel(table = "users", partial_update, find_by = "email")]
pub struct User {
    #[keel(primary)]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[keel(sensitive)]
    pub password: String,
    pub age: u8,
    /// Computed by the database
    #[keel(omit)]
    pub display_name: String,
    #[keel(auto_timestamp_on_update)]
    pub updated_at: Option<PrimitiveDateTime>,
    #[keel(snapshot)]
    pub snapshot: Snapshot,
}

/// Same table, no partial update.
#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[keel(table = "users")]
pub struct PlainUser {
    #[keel(primary)]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[keel(sensitive)]
    pub password: String,
    #[keel(snapshot)]
    pub snapshot: Snapshot,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[keel(sensitive)]
    pub zip: String,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Contact {
    pub phone: String,
    #[keel(column = "contact_email")]
    pub email: String,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[keel(table = "customers", partial_update)]
pub struct Customer {
    #[keel(primary)]
    pub id: i64,
    pub name: String,
    #[keel(embed)]
    pub address: Address,
    #[keel(embed)]
    pub contact: Option<Contact>,
    #[keel(snapshot)]
    pub snapshot: Snapshot,
    #[keel(skip)]
    pub cached_score: u32,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[keel(table = "enrollments", find_by = "student_id")]
pub struct Enrollment {
    #[keel(role = "composite:enrollment")]
    pub student_id: i32,
    #[keel(role = "composite:enrollment")]
    pub course_id: i32,
    pub grade: Option<String>,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[keel(table = "orders", read_only)]
pub struct OrderView {
    #[keel(primary)]
    pub id: i64,
    pub total: Decimal,
    #[keel(column = "customers.name")]
    pub customer_name: String,
}

/// Append only, declares no key and is rejected at registration.
#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[keel(table = "audit_log")]
pub struct AuditLine {
    pub message: String,
    pub level: u8,
}
