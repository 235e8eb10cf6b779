//! Machine address

use {crate::utils::impl_display, core::ops};

/// 16-bit memory address, arithmetic wraps around the address space
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u16);
impl Address {
    /// A null address, where execution starts
    pub const NULL: Self = Self(0);

    /// Construct new address
    #[inline(always)]
    pub const fn new(val: u16) -> Self {
        Self(val)
    }

    /// Get inner value
    #[inline(always)]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Index into a byte array covering the whole address space
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl_display!(for Address =>
    |Address(a)| "{a:#06x}"
);

impl core::fmt::Debug for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{:04x}]", self.0)
    }
}

impl<T: AddressOp> ops::Add<T> for Address {
    type Output = Self;

    #[inline]
    fn add(self, rhs: T) -> Self::Output {
        Self(self.0.wrapping_add(rhs.cast_u16()))
    }
}

impl<T: AddressOp> ops::AddAssign<T> for Address {
    #[inline]
    fn add_assign(&mut self, rhs: T) {
        self.0 = self.0.wrapping_add(rhs.cast_u16())
    }
}

/// Can perform address operations with
pub trait AddressOp {
    /// Cast to u16, truncating or extending
    fn cast_u16(self) -> u16;
}

macro_rules! impl_address_ops(($($ty:ty),* $(,)?) => {
    $(impl AddressOp for $ty {
        #[inline(always)]
        fn cast_u16(self) -> u16 { self as _ }
    })*
});

impl_address_ops!(u8, u16, usize);
