//! Human-facing order numbers.

use uuid::Uuid;

/// Prefix shared by every order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

/// Produces the human-facing identifier printed on receipts and notifications.
pub trait OrderNumberGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates `ORD-` followed by the 32 uppercase hex digits of a random v4 UUID.
///
/// The 122 random bits make collisions negligible without consulting the
/// order store; the store's unique constraint on order numbers still rejects
/// a duplicate if one ever occurs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderNumberGenerator;

impl OrderNumberGenerator for RandomOrderNumberGenerator {
    fn generate(&self) -> String {
        let mut buf = Uuid::encode_buffer();
        let hex = Uuid::new_v4().simple().encode_upper(&mut buf);
        format!("{ORDER_NUMBER_PREFIX}{hex}")
    }
}
