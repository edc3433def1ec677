//! Integration flows over a real data directory.

pub mod flows;
pub mod resume;

#[cfg(test)]
pub(crate) mod fixtures {
    use shared_types::{Address, InMemoryEventSource, TransferEvent, U256};

    pub const DEPOSIT: Address = Address([0xdc; 20]);
    pub const ALICE: Address = Address([0xa1; 20]);
    pub const BOB: Address = Address([0xb0; 20]);

    pub fn claim(block: u64, to: Address, value: u64) -> TransferEvent {
        TransferEvent::new(block, DEPOSIT, to, U256::from(value))
    }

    /// Two validators over 30 blocks.
    ///
    /// Alice claims exactly what she withdrew; Bob's second claim is 40 over.
    pub fn chain() -> InMemoryEventSource {
        InMemoryEventSource::new(30)
            .with_withdrawal(3, ALICE, 100, 0)
            .with_withdrawal(4, BOB, 70, 1)
            .with_withdrawal(8, ALICE, 200, 2)
            .with_withdrawal(12, BOB, 90, 3)
            .with_withdrawal(17, ALICE, 50, 4)
            .with_withdrawal(22, BOB, 110, 5)
            .with_transfer(claim(1, ALICE, 0))
            .with_transfer(claim(2, BOB, 0))
            .with_transfer(claim(10, ALICE, 300))
            .with_transfer(claim(20, ALICE, 50))
            .with_transfer(claim(25, BOB, 200))
            .with_balance(ALICE, U256::from(350u64))
            .with_balance(BOB, U256::from(200u64))
    }
}
