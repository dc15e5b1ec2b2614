//! A dense, hashable bit set over token indices. Lookahead sets take part
//! in state identity under canonical-LR construction, so the set must hash
//! consistently; the block vector always has `ceil(len / 64)` entries for a
//! fixed universe, which keeps equal sets bit-identical.

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct TokenSet {
  blocks: Vec<u64>,
}

impl TokenSet {
  /// the empty set over a universe of `len` token indices.
  pub fn new(len: usize) -> Self {
    Self {
      blocks: vec![0; (len + 63) / 64],
    }
  }

  pub fn from_token(len: usize, token: u32) -> Self {
    let mut set = Self::new(len);
    set.insert(token);
    set
  }

  pub fn insert(&mut self, token: u32) -> bool {
    let (block, bit) = (token as usize / 64, token as usize % 64);
    let old = self.blocks[block];
    self.blocks[block] = old | 1 << bit;
    old & 1 << bit == 0
  }

  pub fn contains(&self, token: u32) -> bool {
    let (block, bit) = (token as usize / 64, token as usize % 64);
    self
      .blocks
      .get(block)
      .map_or(false, |b| b & 1 << bit != 0)
  }

  /// unions `other` into `self`; true if `self` grew.
  pub fn union_with(&mut self, other: &TokenSet) -> bool {
    let mut changed = false;
    for (a, b) in self.blocks.iter_mut().zip(&other.blocks) {
      let old = *a;
      *a |= b;
      changed |= *a != old;
    }
    changed
  }

  pub fn clear(&mut self) {
    self.blocks.iter_mut().for_each(|b| *b = 0);
  }

  pub fn is_empty(&self) -> bool {
    self.blocks.iter().all(|&b| b == 0)
  }

  pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
    self.blocks.iter().enumerate().flat_map(|(i, &block)| {
      (0..64)
        .filter(move |bit| block & 1 << bit != 0)
        .map(move |bit| (i * 64 + bit) as u32)
    })
  }
}

impl std::fmt::Debug for TokenSet {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn insert_and_iterate() {
    let mut set = TokenSet::new(130);
    assert!(set.insert(0));
    assert!(set.insert(65));
    assert!(set.insert(129));
    assert!(!set.insert(65));

    assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 65, 129]);
    assert!(set.contains(65));
    assert!(!set.contains(64));
  }

  #[test]
  fn union_reports_growth() {
    let mut a = TokenSet::from_token(10, 1);
    let b = TokenSet::from_token(10, 3);

    assert!(a.union_with(&b));
    assert!(!a.union_with(&b));
    assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 3]);
  }

  #[test]
  fn equal_sets_regardless_of_insertion_order() {
    let mut a = TokenSet::new(100);
    let mut b = TokenSet::new(100);
    a.insert(7);
    a.insert(93);
    b.insert(93);
    b.insert(7);

    assert_eq!(a, b);
  }
}
