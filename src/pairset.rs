use std::{hash::*, ops::Deref};

use crate::pairmap::PairMap;

/// A set of pairs, see [PairMap]
#[derive(Debug, Clone)]
pub struct PairSet<T, U = T> {
	inner: PairMap<T, U, ()>,
}

impl<T, U> Deref for PairSet<T, U> {
	type Target = PairMap<T, U, ()>;

	fn deref(&self) -> &Self::Target {
		&self.inner
	}
}

impl<T, U> PairSet<T, U> {
	pub fn new() -> Self {
		Self { inner: PairMap::new() }
	}

	/// Returns whether the pair was newly inserted
	pub fn insert(&mut self, left: T, right: U) -> bool
	where
		T: Hash + Eq,
		U: Hash + Eq,
	{
		self.inner.insert(left, right, ()).is_none()
	}
}

impl<T, U> Default for PairSet<T, U> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Hash + Eq, U: Hash + Eq> FromIterator<(T, U)> for PairSet<T, U> {
	fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
		let mut set = Self::new();
		for (left, right) in iter {
			set.insert(left, right);
		}
		set
	}
}
