//! Transaction ID type definition.

use uuid::Uuid;

/// Alias for the string type used for mapping to transaction IDs.
///
/// IDs are random UUIDs rendered in their hyphenated form.
pub type TransactionId = String;

/// Generate a fresh, random transaction ID.
pub fn new_transaction_id() -> TransactionId {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod transaction_id_tests {
    use super::new_transaction_id;

    #[test]
    fn ids_are_unique() {
        let first = new_transaction_id();
        let second = new_transaction_id();

        assert_ne!(first, second);
    }

    #[test]
    fn ids_are_hyphenated_uuids() {
        let id = new_transaction_id();

        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }
}
