use crate::codec::{Address, Quantity, Word};

/// The device's holding-register image: one 16-bit cell per absolute address,
/// with address == index.
///
/// The block is owned by the polling engine for the lifetime of a run and is
/// borrowed by the components that read or fill it. Capacity must cover the
/// full addressable window used by all tasks; indexing outside of it is a
/// programming error and panics rather than returning a recoverable error.
#[derive(Debug, Clone)]
pub struct RegisterBlock {
    words: Vec<Word>,
}

impl RegisterBlock {
    /// Create a zero-initialized block covering addresses `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Single register value at `addr`.
    pub fn get(&self, addr: Address) -> Word {
        self.words(addr, 1)[0]
    }

    /// Set a single register value at `addr`.
    pub fn set(&mut self, addr: Address, value: Word) {
        self.words_mut(addr, 1)[0] = value;
    }

    /// Borrow `cnt` consecutive registers starting at `addr`.
    pub fn words(&self, addr: Address, cnt: Quantity) -> &[Word] {
        self.check_range(addr, cnt);
        &self.words[addr as usize..addr as usize + cnt as usize]
    }

    /// Mutably borrow `cnt` consecutive registers starting at `addr`.
    pub fn words_mut(&mut self, addr: Address, cnt: Quantity) -> &mut [Word] {
        self.check_range(addr, cnt);
        &mut self.words[addr as usize..addr as usize + cnt as usize]
    }

    fn check_range(&self, addr: Address, cnt: Quantity) {
        let end = addr as usize + cnt as usize;
        assert!(
            cnt > 0 && end <= self.words.len(),
            "register range {addr}..{end} outside block capacity {}",
            self.words.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_equals_index() {
        let mut block = RegisterBlock::new(400);
        block.words_mut(200, 2).copy_from_slice(&[100, 0]);
        assert_eq!(block.get(200), 100);
        assert_eq!(block.get(201), 0);
        assert_eq!(block.words(199, 3), &[0, 100, 0]);
    }

    #[test]
    #[should_panic(expected = "outside block capacity")]
    fn out_of_range_panics() {
        let block = RegisterBlock::new(400);
        let _ = block.words(399, 2);
    }

    #[test]
    #[should_panic]
    fn empty_range_panics() {
        let block = RegisterBlock::new(400);
        let _ = block.words(0, 0);
    }
}
