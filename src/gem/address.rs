//! Conversions between 48-bit GPU virtual addresses and their canonical form.
//!
//! From the Broadwell PRM, MI_LOAD_REGISTER_MEM::MemoryAddress: GraphicsAddress
//! bits [63:48] are ignored by the hardware and assumed to be in canonical form,
//! [63:48] == [47].

const SHIFT: u32 = 63 - 47;

/// Sign-extends bit 47 of `v` into bits [63:48].
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub const fn canonical_address(v: u64) -> u64 {
    (((v << SHIFT) as i64) >> SHIFT) as u64
}

/// Returns `v` with bits [63:48] zeroed. The inverse of [`canonical_address`].
#[must_use]
pub const fn address_48b(v: u64) -> u64 {
    (v << SHIFT) >> SHIFT
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LOW_48: u64 = (1 << 48) - 1;

    #[test]
    fn known_values() {
        assert_eq!(canonical_address(0x0000_7fff_ffff_f000), 0x0000_7fff_ffff_f000);
        assert_eq!(canonical_address(0x0000_8000_0000_0000), 0xffff_8000_0000_0000);
        assert_eq!(canonical_address(0x1234_8000_0000_1000), 0xffff_8000_0000_1000);
        assert_eq!(canonical_address(0xffff_0000_0000_1000), 0x0000_0000_0000_1000);
        assert_eq!(address_48b(0xffff_8000_0000_1000), 0x0000_8000_0000_1000);
        assert_eq!(address_48b(u64::MAX), LOW_48);
    }

    proptest! {
        #[test]
        fn round_trip_keeps_low_bits(v in any::<u64>()) {
            prop_assert_eq!(address_48b(canonical_address(v)), v & LOW_48);
        }

        #[test]
        fn canonical_high_bits_follow_bit_47(x in 0u64..=LOW_48) {
            let high = canonical_address(x) >> 48;
            let expected = if x & (1 << 47) != 0 { 0xffff } else { 0 };
            prop_assert_eq!(high, expected);
            prop_assert_eq!(canonical_address(x) & LOW_48, x);
        }

        #[test]
        fn canonical_values_are_fixed_points(v in any::<u64>()) {
            let c = canonical_address(v);
            prop_assert_eq!(canonical_address(address_48b(c)), c);
        }
    }
}
