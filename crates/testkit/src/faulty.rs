//! Inventory handle that fails on demand.

use keepinv_core::{ContainerKind, InventoryError, InventoryHandle, ItemStack, PlayerInventory};

/// Wraps a [`PlayerInventory`] and rejects selected operations.
#[derive(Debug, Clone, Default)]
pub struct FaultyInventory {
    /// The real contents.
    pub inner: PlayerInventory,
    /// Reads from this container fail.
    pub fail_reads_in: Option<ContainerKind>,
    /// Writes succeed this many times, then fail.
    pub writes_before_failure: Option<usize>,
    writes: usize,
}

impl FaultyInventory {
    /// Wrap `inner` with no faults armed.
    pub fn new(inner: PlayerInventory) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Fail every read from `kind`.
    pub fn failing_reads(mut self, kind: ContainerKind) -> Self {
        self.fail_reads_in = Some(kind);
        self
    }

    /// Fail every write after the first `count`.
    pub fn failing_writes_after(mut self, count: usize) -> Self {
        self.writes_before_failure = Some(count);
        self
    }
}

impl InventoryHandle for FaultyInventory {
    fn capacity(&self, kind: ContainerKind) -> Option<usize> {
        self.inner.capacity(kind)
    }

    fn slot(&self, kind: ContainerKind, slot: usize) -> Result<Option<ItemStack>, InventoryError> {
        if self.fail_reads_in == Some(kind) {
            return Err(InventoryError::Rejected {
                kind,
                slot,
                reason: "read fault injected".into(),
            });
        }
        self.inner.slot(kind, slot)
    }

    fn set_slot(
        &mut self,
        kind: ContainerKind,
        slot: usize,
        stack: Option<ItemStack>,
    ) -> Result<(), InventoryError> {
        if let Some(limit) = self.writes_before_failure {
            if self.writes >= limit {
                return Err(InventoryError::Rejected {
                    kind,
                    slot,
                    reason: "write fault injected".into(),
                });
            }
        }
        self.writes += 1;
        self.inner.set_slot(kind, slot, stack)
    }

    fn active_hotbar_slot(&self) -> u8 {
        self.inner.active_hotbar_slot()
    }

    fn set_active_hotbar_slot(&mut self, slot: u8) -> Result<(), InventoryError> {
        self.inner.set_active_hotbar_slot(slot)
    }

    fn clear_all(&mut self) {
        self.inner.clear_all();
    }

    fn mark_changed(&mut self) {
        self.inner.mark_changed();
    }

    fn send_to_client(&mut self) {
        self.inner.send_to_client();
    }
}
