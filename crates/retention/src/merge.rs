//! Stack-merging insertion for restores without a known target slot.
//!
//! Items are offered to slots in ascending order. An empty slot takes the
//! whole stack; a stackable, non-full stack absorbs what fits and the scan
//! continues with the rest. Whatever is left after the last slot is handed
//! back to the caller.

use keepinv_core::{Container, ContainerKind, InventoryError, InventoryHandle, ItemStack};
use std::convert::Infallible;

/// Linear slot view the merge scan runs against.
pub trait SlotContainer {
    /// Error raised by slot access.
    type Error;

    /// Number of addressable slots.
    fn slot_count(&self) -> usize;

    /// Copy of the stack in `index`, if any.
    fn stack_at(&self, index: usize) -> Result<Option<ItemStack>, Self::Error>;

    /// Overwrite `index` with `stack`.
    fn put_stack(&mut self, index: usize, stack: ItemStack) -> Result<(), Self::Error>;
}

impl SlotContainer for Container {
    type Error = Infallible;

    fn slot_count(&self) -> usize {
        self.capacity()
    }

    fn stack_at(&self, index: usize) -> Result<Option<ItemStack>, Infallible> {
        Ok(self.get(index).cloned())
    }

    fn put_stack(&mut self, index: usize, stack: ItemStack) -> Result<(), Infallible> {
        self.set(index, Some(stack));
        Ok(())
    }
}

/// Insert `stack`, returning the quantity that did not fit.
///
/// `None` means the stack was fully absorbed.
pub fn insert_stack<C: SlotContainer + ?Sized>(
    container: &mut C,
    mut stack: ItemStack,
) -> Result<Option<ItemStack>, C::Error> {
    if stack.is_empty() {
        return Ok(None);
    }

    for index in 0..container.slot_count() {
        match container.stack_at(index)? {
            None => {
                container.put_stack(index, stack)?;
                return Ok(None);
            }
            Some(existing) if existing.is_empty() => {
                container.put_stack(index, stack)?;
                return Ok(None);
            }
            Some(mut existing) if existing.can_stack_with(&stack) && !existing.is_full() => {
                let remainder = existing.add(stack.quantity);
                container.put_stack(index, existing)?;
                if remainder == 0 {
                    return Ok(None);
                }
                stack.quantity = remainder;
            }
            Some(_) => {}
        }
    }

    Ok(Some(stack))
}

/// Every container of a live inventory seen as one slot pool.
///
/// Slots are numbered storage first, then hotbar, utility, armor and the
/// backpack if present, mirroring how a live inventory absorbs picked-up items.
pub struct CombinedSlots<'a, H: InventoryHandle + ?Sized> {
    inventory: &'a mut H,
    segments: Vec<(ContainerKind, usize)>,
    total: usize,
}

impl<'a, H: InventoryHandle + ?Sized> CombinedSlots<'a, H> {
    /// Build the pool over whatever containers `inventory` currently has.
    pub fn new(inventory: &'a mut H) -> Self {
        let segments: Vec<_> = ContainerKind::ABSORB_ORDER
            .iter()
            .filter_map(|&kind| inventory.capacity(kind).map(|cap| (kind, cap)))
            .filter(|&(_, cap)| cap > 0)
            .collect();
        let total = segments.iter().map(|&(_, cap)| cap).sum();
        Self {
            inventory,
            segments,
            total,
        }
    }

    fn locate(&self, mut index: usize) -> Option<(ContainerKind, usize)> {
        for &(kind, capacity) in &self.segments {
            if index < capacity {
                return Some((kind, index));
            }
            index -= capacity;
        }
        None
    }

    fn out_of_range(&self, index: usize) -> InventoryError {
        InventoryError::SlotOutOfRange {
            kind: ContainerKind::Storage,
            slot: index,
            capacity: self.total,
        }
    }
}

impl<H: InventoryHandle + ?Sized> SlotContainer for CombinedSlots<'_, H> {
    type Error = InventoryError;

    fn slot_count(&self) -> usize {
        self.total
    }

    fn stack_at(&self, index: usize) -> Result<Option<ItemStack>, InventoryError> {
        let (kind, slot) = self.locate(index).ok_or_else(|| self.out_of_range(index))?;
        self.inventory.slot(kind, slot)
    }

    fn put_stack(&mut self, index: usize, stack: ItemStack) -> Result<(), InventoryError> {
        let (kind, slot) = self.locate(index).ok_or_else(|| self.out_of_range(index))?;
        self.inventory.set_slot(kind, slot, Some(stack))
    }
}
