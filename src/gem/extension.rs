//! Threading of `i915_user_extension` records into a kernel argument's
//! `extensions` field.
//!
//! The kernel walks these lists through 64-bit integers that alias user pointers.
//! Those conversions happen only in this module.

use crate::drm::ioctl::{ContextCreateExtSetparam, UserExtensionBase};
use std::marker::PhantomData;
use std::ptr;

/// A record the kernel can reach through an extension link.
///
/// # Safety
/// Implementors must be `#[repr(C)]` with a [`UserExtensionBase`] as their first field,
/// and `base_mut` must return that field.
pub unsafe trait UserExtension {
    fn base_mut(&mut self) -> &mut UserExtensionBase;
}

unsafe impl UserExtension for UserExtensionBase {
    fn base_mut(&mut self) -> &mut UserExtensionBase {
        self
    }
}

unsafe impl UserExtension for ContextCreateExtSetparam {
    fn base_mut(&mut self) -> &mut UserExtensionBase {
        &mut self.base
    }
}

/// A null-terminated, singly linked list of extension records hanging off `head`.
///
/// Records stay owned by the caller. They are mutably borrowed for `'a`, so they can
/// neither move nor be linked twice while the chain is alive, and the chain never
/// allocates or frees anything.
pub struct ExtensionChain<'a> {
    head: &'a mut u64,
    _records: PhantomData<&'a mut UserExtensionBase>,
}

impl<'a> ExtensionChain<'a> {
    /// Starts an empty chain at `head`, dropping whatever it pointed to before.
    pub fn new(head: &'a mut u64) -> Self {
        *head = 0;
        Self {
            head,
            _records: PhantomData,
        }
    }

    /// Appends `ext` at the tail of the chain, tagged with extension type `name`.
    pub fn push<E: UserExtension>(&mut self, name: u32, ext: &'a mut E) {
        let base = ext.base_mut();
        base.next_extension = 0;
        base.name = name;

        let tail = self.tail();
        unsafe { *tail = ptr::from_mut(base) as u64 };
    }

    /// Number of records linked so far.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut link = *self.head;
        while link != 0 {
            count += 1;
            link = unsafe { (*(link as *const UserExtensionBase)).next_extension };
        }
        count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self.head == 0
    }

    /// The zero link terminating the chain.
    fn tail(&mut self) -> *mut u64 {
        let mut link: *mut u64 = ptr::from_mut(self.head);
        // Every non-zero link was written by `push` from a record borrowed for `'a`.
        unsafe {
            while *link != 0 {
                link = &raw mut (*(*link as *mut UserExtensionBase)).next_extension;
            }
        }
        link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drm::ioctl::I915_CONTEXT_CREATE_EXT_SETPARAM;

    fn addr<T>(record: &T) -> u64 {
        ptr::from_ref(record) as u64
    }

    #[test]
    fn links_records_in_order() {
        let mut head = 0u64;
        let mut r1 = UserExtensionBase::default();
        let mut r2 = ContextCreateExtSetparam::default();
        let mut r3 = UserExtensionBase::default();

        {
            let mut chain = ExtensionChain::new(&mut head);
            assert!(chain.is_empty());
            chain.push(7, &mut r1);
            chain.push(I915_CONTEXT_CREATE_EXT_SETPARAM, &mut r2);
            chain.push(9, &mut r3);
            assert_eq!(chain.len(), 3);
        }

        assert_eq!(head, addr(&r1));
        assert_eq!(r1.next_extension, addr(&r2));
        assert_eq!(r2.base.next_extension, addr(&r3));
        assert_eq!(r3.next_extension, 0);

        assert_eq!(r1.name, 7);
        assert_eq!(r2.base.name, I915_CONTEXT_CREATE_EXT_SETPARAM);
        assert_eq!(r3.name, 9);
    }

    #[test]
    fn new_chain_starts_empty_and_clears_stale_links() {
        let mut head = 0x1000u64;
        let mut record = UserExtensionBase {
            next_extension: 0x2000,
            ..Default::default()
        };

        {
            let mut chain = ExtensionChain::new(&mut head);
            assert_eq!(chain.len(), 0);
            chain.push(1, &mut record);
            assert_eq!(chain.len(), 1);
        }

        assert_eq!(head, addr(&record));
        assert_eq!(record.next_extension, 0);
    }
}
