//! a map keyed by a pair of owned values that can be queried with a pair of
//! borrowed values, e.g. `(String, String)` keys looked up by `(&str, &str)`
use std::{borrow::Borrow, hash::*};

use hashbrown::HashMap;

/// `Borrow<(&Left, &Right)>` can't be implemented for `(Left, Right)`, so a
/// plain [HashMap] would force us to allocate a key pair for every lookup.
/// This goes through the raw entry api of [hashbrown] instead.
#[derive(Debug, Clone)]
pub struct PairMap<T, U, V> {
	/// the map object we're wrapping
	inner: HashMap<(T, U), V>,
}

impl<T, U, V> PairMap<T, U, V> {
	/// Creates an empty `PairMap`
	pub fn new() -> Self {
		Self { inner: HashMap::new() }
	}

	/// Number of key pairs in the map
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Inserts a key-value pair into the `PairMap`
	pub fn insert(&mut self, left: T, right: U, v: V) -> Option<V>
	where
		T: Hash + Eq,
		U: Hash + Eq,
	{
		self.inner.insert((left, right), v)
	}

	/// Returns a reference to the value corresponding to the key pair
	pub fn get<Q, R>(&self, left: &Q, right: &R) -> Option<&V>
	where
		T: Borrow<Q>,
		U: Borrow<R>,
		Q: ?Sized + Hash + Eq,
		R: ?Sized + Hash + Eq,
	{
		// hashes the same as the owned `(T, U)` tuple since `Borrow` requires equal hashes
		let mut hasher = self.inner.hasher().build_hasher();
		(left, right).hash(&mut hasher);
		let hash = hasher.finish();
		self.inner
			.raw_entry()
			.from_hash(hash, |(l, r)| (l.borrow(), r.borrow()) == (left, right))
			.map(|(_, v)| v)
	}

	/// Returns true if the map contains a value for the specified key pair
	pub fn contains<Q, R>(&self, left: &Q, right: &R) -> bool
	where
		T: Borrow<Q>,
		U: Borrow<R>,
		Q: ?Sized + Hash + Eq,
		R: ?Sized + Hash + Eq,
	{
		self.get(left, right).is_some()
	}
}

impl<T, U, V> Default for PairMap<T, U, V> {
	fn default() -> Self {
		Self::new()
	}
}
