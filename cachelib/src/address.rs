/// A 32-bit address split into the fields used to index the cache
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub tag: u32,
    pub set: u32,
    pub offset: u32,
}

/// Splits addresses into tag, set and offset using precomputed masks and shifts
///
/// Line size and set count must both be powers of two. This isn't checked here, the decoder is
/// only ever built from a validated `CacheGeometry`, so the masks are always exact
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressDecoder {
    offset_bits: u32,
    set_bits: u32,
    offset_bit_mask: u32,
    set_selection_bit_mask: u32,
}

impl AddressDecoder {
    pub fn new(line_size: u32, num_sets: u32) -> Self {
        debug_assert!(line_size.is_power_of_two() && num_sets.is_power_of_two());
        let offset_bits = line_size.trailing_zeros();
        let set_bits = num_sets.trailing_zeros();
        Self {
            offset_bits,
            set_bits,
            offset_bit_mask: line_size - 1,
            set_selection_bit_mask: num_sets - 1,
        }
    }

    /// Splits an address into its tag, set and offset
    ///
    /// # Examples
    ///
    /// ```
    /// use cachelib::address::AddressDecoder;
    /// // 16 byte lines, 4 sets
    /// let decoder = AddressDecoder::new(16, 4);
    /// let decoded = decoder.decode(0x1234);
    /// assert_eq!((decoded.tag, decoded.set, decoded.offset), (0x48, 3, 4));
    /// ```
    pub fn decode(&self, address: u32) -> DecodedAddress {
        let line_number = address >> self.offset_bits;
        DecodedAddress {
            tag: line_number >> self.set_bits,
            set: line_number & self.set_selection_bit_mask,
            offset: address & self.offset_bit_mask,
        }
    }

    /// The address of the first byte of the line containing `address`
    pub fn line_address(&self, address: u32) -> u32 {
        address & !self.offset_bit_mask
    }

    pub fn line_size(&self) -> u32 {
        self.offset_bit_mask + 1
    }

    pub fn num_sets(&self) -> u32 {
        self.set_selection_bit_mask + 1
    }
}
