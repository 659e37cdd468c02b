//! In-memory payout store, keyed by id and indexed by transfer id.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use remit_types::domain::{Payout, PayoutId, TransferId};
use remit_types::error::StoreError;
use remit_types::ports::PayoutStore;

/// Payout persistence with a secondary transfer-id index.
///
/// Insertion claims the transfer-id index entry first, so two racing
/// initiations for the same transfer resolve to one insert and one
/// `Conflict` - never a duplicate payout.
#[derive(Default)]
pub struct InMemoryPayoutStore {
    payouts: DashMap<PayoutId, Payout>,
    by_transfer: DashMap<TransferId, PayoutId>,
}

impl InMemoryPayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty()
    }
}

#[async_trait::async_trait]
impl PayoutStore for InMemoryPayoutStore {
    async fn insert(&self, payout: &Payout) -> Result<(), StoreError> {
        match self.by_transfer.entry(payout.transfer_id) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "payout already exists for transfer {}",
                payout.transfer_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(payout.id);
                self.payouts.insert(payout.id, payout.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, payout: &Payout) -> Result<(), StoreError> {
        match self.payouts.get_mut(&payout.id) {
            None => Err(StoreError::NotFound),
            Some(mut existing) => {
                *existing = payout.clone();
                Ok(())
            }
        }
    }

    async fn get(&self, id: PayoutId) -> Result<Payout, StoreError> {
        self.payouts
            .get(&id)
            .map(|p| p.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_transfer(&self, transfer_id: TransferId) -> Result<Payout, StoreError> {
        let id = self
            .by_transfer
            .get(&transfer_id)
            .map(|id| *id)
            .ok_or(StoreError::NotFound)?;
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_types::domain::{CurrencyCode, Money, PayoutMethod, RecipientDetails};
    use rust_decimal_macros::dec;

    fn payout(transfer_id: TransferId) -> Payout {
        Payout::new(
            transfer_id,
            PayoutMethod::BankAccount,
            Money::new(CurrencyCode::parse("PHP").unwrap(), dec!(5000)),
            RecipientDetails::BankAccount {
                bank_name: "BDO".into(),
                bank_code: "010530667".into(),
                account_number: "001234567890".into(),
                account_name: "Maria Santos".into(),
            },
        )
    }

    #[tokio::test]
    async fn test_insert_and_lookup_by_both_keys() {
        let store = InMemoryPayoutStore::new();
        let transfer_id = TransferId::new();
        let created = payout(transfer_id);
        store.insert(&created).await.unwrap();

        assert_eq!(store.get(created.id).await.unwrap().id, created.id);
        assert_eq!(
            store.find_by_transfer(transfer_id).await.unwrap().id,
            created.id
        );
    }

    #[tokio::test]
    async fn test_duplicate_transfer_id_conflicts() {
        let store = InMemoryPayoutStore::new();
        let transfer_id = TransferId::new();
        store.insert(&payout(transfer_id)).await.unwrap();

        let result = store.insert(&payout(transfer_id)).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_payout_is_not_found() {
        let store = InMemoryPayoutStore::new();
        let result = store.update(&payout(TransferId::new())).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let store = InMemoryPayoutStore::new();
        let mut created = payout(TransferId::new());
        store.insert(&created).await.unwrap();

        created.begin_processing().unwrap();
        store.update(&created).await.unwrap();
        assert_eq!(
            store.get(created.id).await.unwrap().status,
            created.status
        );
    }
}
