//! Parent/child index over one owner's notes.
//!
//! Notes reference their parent by id. The index is built on demand from `(id, parent)` edges
//! and only answers structural questions; it never owns note data.

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ParentIndex {
	children: HashMap<Uuid, Vec<Uuid>>,
}
impl ParentIndex {
	pub fn from_edges<I>(edges: I) -> Self
	where
		I: IntoIterator<Item = (Uuid, Option<Uuid>)>,
	{
		let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();

		for (id, parent) in edges {
			if let Some(parent) = parent {
				children.entry(parent).or_default().push(id);
			}
		}

		for ids in children.values_mut() {
			ids.sort_unstable();
		}

		Self { children }
	}

	pub fn children_of(&self, id: Uuid) -> &[Uuid] {
		self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Descendant closure of `root`, `root` first, in breadth-first order.
	///
	/// Every node appears after its parent, so iterating the result in reverse visits children
	/// before parents. Pre-existing cycles are tolerated: each id is emitted once.
	pub fn closure(&self, root: Uuid) -> Vec<Uuid> {
		let mut out = Vec::new();
		let mut seen = HashSet::new();
		let mut queue = VecDeque::from([root]);

		while let Some(id) = queue.pop_front() {
			if !seen.insert(id) {
				continue;
			}

			out.push(id);

			for child in self.children_of(id) {
				if !seen.contains(child) {
					queue.push_back(*child);
				}
			}
		}

		out
	}

	/// Whether making `new_parent` the parent of `id` would close a cycle, i.e. whether
	/// `new_parent` is `id` itself or one of its descendants.
	pub fn would_cycle(&self, id: Uuid, new_parent: Uuid) -> bool {
		self.closure(id).contains(&new_parent)
	}
}
