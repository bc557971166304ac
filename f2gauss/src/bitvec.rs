use rand::Rng;
use ref_cast::RefCast;
use std::ops::{BitXorAssign, Deref, DerefMut, Index, IndexMut, Range};

/// A block of bits. This is an alias for [`u64`]
pub type BitBlock = u64;

/// Number of bits in a [`BitBlock`]
pub const BLOCKSIZE: usize = 64;

/// Bitwise OR with this constant to set most signficant bit to one
pub const MSB_ON: BitBlock = 0x8000000000000000;

/// Returns the minimum number of [`BitBlock`]s required to store the given number of bits.
///
/// If `bits` is not a multiple of [`BLOCKSIZE`], the result is rounded up to ensure all bits fit.
#[inline]
pub fn min_blocks(bits: usize) -> usize {
    bits / BLOCKSIZE + if bits % BLOCKSIZE == 0 { 0 } else { 1 }
}

/// Mask selecting the first `bits` bits of a block, counting from the most significant bit.
#[inline]
pub fn leading_mask(bits: usize) -> BitBlock {
    if bits == 0 {
        0
    } else {
        BitBlock::MAX << (BLOCKSIZE - bits.min(BLOCKSIZE))
    }
}

/// A vector of bits, stored as a vector of [`BitBlock`]s.
///
/// Bit `i` lives in block `i / BLOCKSIZE`, counting from the most significant bit of that block.
/// Most of the functionality comes from dereferencing to [`BitSlice`].
///
/// # Examples
///
/// ```
/// use f2gauss::bitvec::*;
///
/// let mut bv = BitVec::zeros(2);
/// bv.set_bit(70, true);
/// assert!(bv.bit(70));
/// assert_eq!(bv.first_one(), Some(70));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BitVec(Vec<BitBlock>);

/// A borrowed run of [`BitBlock`]s, e.g. a single row of an [`F2Matrix`](crate::F2Matrix).
#[derive(RefCast, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub struct BitSlice([BitBlock]);

/// Iterator over the bits in a [`BitSlice`], starting from the most significant bit of the first
/// block.
pub struct BitIter<'a> {
    inner: std::slice::Iter<'a, BitBlock>,
    c: usize,
    block: BitBlock,
}

impl Iterator for BitIter<'_> {
    type Item = bool;
    fn next(&mut self) -> Option<Self::Item> {
        if self.c == BLOCKSIZE {
            self.block = self.inner.next().copied()?;
            self.c = 0;
        }
        let bit = self.block & MSB_ON == MSB_ON;
        self.block <<= 1;
        self.c += 1;
        Some(bit)
    }
}

impl BitSlice {
    #[inline]
    pub fn block_iter(&self) -> impl Iterator<Item = BitBlock> + '_ {
        self.0.iter().copied()
    }

    #[inline]
    pub fn block_iter_mut(&mut self) -> impl Iterator<Item = &mut BitBlock> {
        self.0.iter_mut()
    }

    /// Returns an iterator over all bits in the slice, including any padding in the last block
    #[inline]
    pub fn iter(&self) -> BitIter<'_> {
        BitIter {
            inner: self.0.iter(),
            c: BLOCKSIZE,
            block: 0,
        }
    }

    #[inline]
    pub fn count_ones(&self) -> u32 {
        self.block_iter().fold(0, |c, bits| c + bits.count_ones())
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&bits| bits == 0)
    }

    /// Returns the value of the bit at the given index
    ///
    /// # Panics
    ///
    /// Panics if the index is beyond the last block.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        let block = self.0[index / BLOCKSIZE];
        block & (MSB_ON >> (index % BLOCKSIZE)) != 0
    }

    /// Sets the bit at the given index
    ///
    /// # Panics
    ///
    /// Panics if the index is beyond the last block.
    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        let mask = MSB_ON >> (index % BLOCKSIZE);
        let block = &mut self.0[index / BLOCKSIZE];
        if value {
            *block |= mask;
        } else {
            *block &= !mask;
        }
    }

    #[inline]
    pub fn flip_bit(&mut self, index: usize) {
        self.0[index / BLOCKSIZE] ^= MSB_ON >> (index % BLOCKSIZE);
    }

    /// Returns the position of the first 1-bit, if any
    pub fn first_one(&self) -> Option<usize> {
        self.0
            .iter()
            .position(|&bits| bits != 0)
            .map(|i| i * BLOCKSIZE + self.0[i].leading_zeros() as usize)
    }

    /// Returns the bits in positions `from..to` packed into the leading bits of one block
    ///
    /// Bits of the block past `to - from` are zero.
    ///
    /// # Panics
    ///
    /// Panics if the range is wider than [`BLOCKSIZE`] or extends past the last block.
    #[inline]
    pub fn bits_u64(&self, from: usize, to: usize) -> BitBlock {
        let width = to - from;
        assert!(width <= BLOCKSIZE, "bit range wider than a block");
        if width == 0 {
            return 0;
        }
        let block = from / BLOCKSIZE;
        let offset = from % BLOCKSIZE;
        let mut bits = self.0[block] << offset;
        if offset + width > BLOCKSIZE {
            bits |= self.0[block + 1] >> (BLOCKSIZE - offset);
        }
        bits & leading_mask(width)
    }

    /// Copies the bits in positions `from..to` into a new [`BitVec`], starting at bit 0
    pub fn extract_bits(&self, from: usize, to: usize) -> BitVec {
        (from..to)
            .step_by(BLOCKSIZE)
            .map(|start| self.bits_u64(start, usize::min(start + BLOCKSIZE, to)))
            .collect()
    }

    /// XORs the `len` blocks starting at `source` into the `len` blocks starting at `target`
    ///
    /// The two ranges must either coincide, in which case the target is cleared, or not overlap.
    #[inline]
    pub fn xor_range(&mut self, source: usize, target: usize, len: usize) {
        if source == target {
            self.0[target..target + len].fill(0);
            return;
        }
        if source < target {
            let (head, tail) = self.0.split_at_mut(target);
            xor_blocks(&mut tail[..len], &head[source..source + len]);
        } else {
            let (head, tail) = self.0.split_at_mut(source);
            xor_blocks(&mut head[target..target + len], &tail[..len]);
        }
    }

    #[inline]
    pub fn swap_range(&mut self, source: usize, target: usize, len: usize) {
        for i in 0..len {
            self.0.swap(source + i, target + i);
        }
    }

    /// Number of blocks in the slice
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn num_bits(&self) -> usize {
        self.0.len() * BLOCKSIZE
    }
}

#[inline]
fn xor_blocks(target: &mut [BitBlock], source: &[BitBlock]) {
    for (bits0, bits1) in target.iter_mut().zip(source.iter()) {
        *bits0 ^= bits1;
    }
}

impl Index<Range<usize>> for BitSlice {
    type Output = BitSlice;

    #[inline]
    fn index(&self, index: Range<usize>) -> &Self::Output {
        BitSlice::ref_cast(&self.0[index])
    }
}

impl IndexMut<Range<usize>> for BitSlice {
    #[inline]
    fn index_mut(&mut self, index: Range<usize>) -> &mut Self::Output {
        BitSlice::ref_cast_mut(&mut self.0[index])
    }
}

impl Index<usize> for BitSlice {
    type Output = BitBlock;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for BitSlice {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl BitXorAssign<&Self> for BitSlice {
    #[inline]
    fn bitxor_assign(&mut self, rhs: &BitSlice) {
        xor_blocks(&mut self.0, &rhs.0);
    }
}

impl BitVec {
    #[inline]
    pub fn zeros(num_blocks: usize) -> Self {
        BitVec(vec![0; num_blocks])
    }

    #[inline]
    pub fn ones(num_blocks: usize) -> Self {
        BitVec(vec![BitBlock::MAX; num_blocks])
    }

    #[inline]
    pub fn random(rng: &mut impl Rng, num_blocks: usize) -> Self {
        (0..num_blocks).map(|_| rng.random::<BitBlock>()).collect()
    }

    #[inline]
    pub fn as_bit_slice(&self) -> &BitSlice {
        BitSlice::ref_cast(&self.0)
    }

    #[inline]
    pub fn as_bit_slice_mut(&mut self) -> &mut BitSlice {
        BitSlice::ref_cast_mut(&mut self.0)
    }
}

impl From<Vec<BitBlock>> for BitVec {
    fn from(value: Vec<BitBlock>) -> Self {
        BitVec(value)
    }
}

impl FromIterator<BitBlock> for BitVec {
    fn from_iter<T: IntoIterator<Item = BitBlock>>(iter: T) -> Self {
        BitVec(Vec::from_iter(iter))
    }
}

/// Packs bools into blocks, padding the last block with 0s
impl FromIterator<bool> for BitVec {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut v = vec![];
        let mut c = 0;
        let mut block: BitBlock = 0;
        for bit in iter {
            if bit {
                block |= MSB_ON >> c;
            }
            c += 1;
            if c == BLOCKSIZE {
                v.push(block);
                block = 0;
                c = 0;
            }
        }

        if c != 0 {
            v.push(block);
        }

        BitVec(v)
    }
}

impl From<Vec<bool>> for BitVec {
    fn from(value: Vec<bool>) -> Self {
        value.into_iter().collect()
    }
}

impl Deref for BitVec {
    type Target = BitSlice;
    fn deref(&self) -> &Self::Target {
        self.as_bit_slice()
    }
}

impl DerefMut for BitVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_bit_slice_mut()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn bit_get_set() {
        let sz = 4;
        let bits = vec![0, 3, 100, 201, 255];

        let mut vec0 = BitVec::zeros(sz);
        for &b in &bits {
            vec0.set_bit(b, true);
        }
        for i in 0..(sz * BLOCKSIZE) {
            assert_eq!(vec0.bit(i), bits.contains(&i));
        }

        let mut vec1 = BitVec::ones(sz);
        for &b in &bits {
            vec1.set_bit(b, false);
        }
        for i in 0..(sz * BLOCKSIZE) {
            assert_eq!(vec1.bit(i), !bits.contains(&i));
        }

        vec1.flip_bit(3);
        assert!(vec1.bit(3));
    }

    #[test]
    fn bool_vec() {
        let mut rng = SmallRng::seed_from_u64(1);
        let bool_vec: Vec<bool> = (0..300).map(|_| rng.random()).collect();
        let vec: BitVec = bool_vec.clone().into();

        assert_eq!(vec.len(), min_blocks(300));
        for (i, &b) in bool_vec.iter().enumerate() {
            assert_eq!((i, vec.bit(i)), (i, b));
        }
        // padding past the last bool is zero
        for i in bool_vec.len()..vec.num_bits() {
            assert_eq!((i, vec.bit(i)), (i, false));
        }
        assert_eq!(vec.iter().take(300).collect::<Vec<_>>(), bool_vec);
    }

    #[test]
    fn xor_range() {
        let i = BitBlock::MAX;
        let vec0: BitVec = vec![0, i, 0, i, 0, 0, i, i, 0, 0].into();

        let mut vec1 = vec0.clone();
        vec1.xor_range(1, 5, 3);
        let vec2: BitVec = vec![0, i, 0, i, 0, i, i, 0, 0, 0].into();
        assert_eq!(vec1, vec2);

        // xor back from a higher source into a lower target
        vec1.xor_range(5, 1, 3);
        let vec3: BitVec = vec![0, 0, i, i, 0, i, i, 0, 0, 0].into();
        assert_eq!(vec1, vec3);
    }

    #[test]
    fn bits_across_blocks() {
        let mut vec = BitVec::zeros(3);
        for &b in &[60, 62, 64, 65, 130] {
            vec.set_bit(b, true);
        }

        assert_eq!(vec.bits_u64(60, 66), 0b101011 << 58);
        assert_eq!(vec.bits_u64(0, 0), 0);
        assert_eq!(vec.bits_u64(64, 128), MSB_ON | (MSB_ON >> 1));

        let ext = vec.extract_bits(60, 131);
        assert_eq!(ext.len(), 2);
        for i in 0..71 {
            assert_eq!(ext.bit(i), vec.bit(60 + i), "bit {i}");
        }
        for i in 71..128 {
            assert!(!ext.bit(i));
        }
    }

    #[test]
    fn first_one_and_count() {
        let mut vec = BitVec::zeros(3);
        assert_eq!(vec.first_one(), None);
        assert!(vec.is_zero());
        vec.set_bit(150, true);
        vec.set_bit(129, true);
        assert_eq!(vec.first_one(), Some(129));
        assert_eq!(vec.count_ones(), 2);
    }

    #[test]
    fn block_index() {
        let mut rng = SmallRng::seed_from_u64(1);
        let vec: BitVec = BitVec::random(&mut rng, 10);
        let r1: &BitSlice = &vec[4..9];

        for i in 0..r1.len() {
            assert_eq!(vec[4 + i], r1[i]);
        }
    }
}
