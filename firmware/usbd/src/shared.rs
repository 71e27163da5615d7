//! Controller storage shared by the USB interrupt and the main loop

use core::cell::RefCell;

use critical_section::Mutex;

use crate::{port::Port, vendor::Vendor, Controller};

/// Interrupt-safe home for a value shared between the USB interrupt and the main loop
///
/// Every access happens inside a critical section so a multi-step read-modify-write from the
/// main loop can't be interleaved with the interrupt handler
pub struct Shared<C> {
    inner: Mutex<RefCell<Option<C>>>,
}

impl<C> Shared<C> {
    /// Creates an empty slot; suitable for a `static`
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Moves `value` into the slot, returning the previous value
    pub fn init(&self, value: C) -> Option<C> {
        critical_section::with(|cs| self.inner.borrow(cs).replace(Some(value)))
    }

    /// Runs `f` on the value with interrupts masked
    ///
    /// Returns `None` if the slot is empty or already borrowed further up the stack
    pub fn lock<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
    }

    /// Moves the value out of the slot
    pub fn take(&self) -> Option<C> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().take())
    }
}

impl<P, V> Shared<Controller<'static, P, V>>
where
    P: Port,
    V: Vendor,
{
    /// Entry point for the USB interrupt vector
    pub fn on_interrupt(&self) {
        if self.lock(|usb| usb.on_interrupt()).is_none() {
            log::error!("USB interrupt before the controller was initialized");
        }
    }
}
