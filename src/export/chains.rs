//! Greedy coreference chain construction for one topic group.
//!
//! Pairwise decisions arrive one at a time, in input order. A `yes` unions
//! every chain touching either mention; a `no` only makes sure both mentions
//! exist somewhere. A `no` never splits a chain that earlier decisions built.
//!
//! ```rust
//! use cdcr::export::chains::{build_chains, ChainTask};
//!
//! let chains = build_chains([
//!     ChainTask::new("n1", "s1", true),
//!     ChainTask::new("n2", "s1", true),
//!     ChainTask::new("n3", "s2", false),
//! ]);
//!
//! assert_eq!(chains.len(), 3);
//! assert_eq!(chains.chain_of(&"n1"), chains.chain_of(&"n2"));
//! assert_ne!(chains.chain_of(&"n3"), chains.chain_of(&"s2"));
//! ```

use cdcr_core::DocType;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::boundary::OwnerId;

/// Identity of a mention inside one topic group.
///
/// After boundary resolution a mention is named by the document side it sits
/// on and the record that owns its surviving span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MentionKey {
    /// News or science side of the pair.
    pub doc_type: DocType,
    /// Owning record after merging.
    pub owner: OwnerId,
}

impl MentionKey {
    /// Create a key.
    #[must_use]
    pub fn new(doc_type: DocType, owner: OwnerId) -> Self {
        Self { doc_type, owner }
    }
}

impl fmt::Display for MentionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc_type, self.owner)
    }
}

/// One pairwise decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTask<M> {
    /// News-side mention.
    pub news: M,
    /// Science-side mention.
    pub science: M,
    /// Whether the two mentions corefer.
    pub is_coref: bool,
}

impl<M> ChainTask<M> {
    /// Create a task.
    pub fn new(news: M, science: M, is_coref: bool) -> Self {
        Self {
            news,
            science,
            is_coref,
        }
    }
}

/// Open chains for one topic group.
///
/// Chains live in creation order. A union retires the chains it absorbs and
/// appends the combined chain at the end, so iteration order is the order in
/// which each current chain last changed shape.
#[derive(Debug, Clone)]
pub struct ChainSet<M> {
    chains: Vec<Option<Vec<M>>>,
    index: HashMap<M, usize>,
}

impl<M> Default for ChainSet<M> {
    fn default() -> Self {
        Self {
            chains: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<M: Clone + Eq + Hash> ChainSet<M> {
    /// Empty chain set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of the chain currently holding `mention`.
    #[must_use]
    pub fn chain_of(&self, mention: &M) -> Option<usize> {
        self.index.get(mention).copied()
    }

    /// True if the mention is in some chain.
    #[must_use]
    pub fn contains(&self, mention: &M) -> bool {
        self.index.contains_key(mention)
    }

    /// Apply one decision.
    pub fn apply(&mut self, task: &ChainTask<M>) {
        // Both lookups happen independently: two earlier decisions may have
        // placed the mentions in different chains.
        let news_chain = self.chain_of(&task.news);
        let science_chain = self.chain_of(&task.science);

        if task.is_coref {
            let mut related: Vec<usize> = news_chain.into_iter().chain(science_chain).collect();
            related.sort_unstable();
            related.dedup();

            let mut members = Vec::new();
            for slot in related {
                if let Some(chain) = self.chains[slot].take() {
                    members.extend(chain);
                }
            }
            for mention in [&task.news, &task.science] {
                if !members.contains(mention) {
                    members.push(mention.clone());
                }
            }
            self.push(members);
        } else {
            if news_chain.is_none() {
                self.push(vec![task.news.clone()]);
            }
            if science_chain.is_none() && !self.contains(&task.science) {
                self.push(vec![task.science.clone()]);
            }
        }
    }

    fn push(&mut self, members: Vec<M>) {
        let slot = self.chains.len();
        for mention in &members {
            self.index.insert(mention.clone(), slot);
        }
        self.chains.push(Some(members));
    }

    /// Number of live chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.iter().filter(|c| c.is_some()).count()
    }

    /// True if no mention has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of mentions across all chains.
    #[must_use]
    pub fn mention_count(&self) -> usize {
        self.index.len()
    }

    /// Live chains in order.
    pub fn chains(&self) -> impl Iterator<Item = &[M]> {
        self.chains.iter().filter_map(|c| c.as_deref())
    }

    /// Consume into live chains in order.
    #[must_use]
    pub fn into_chains(self) -> Vec<Vec<M>> {
        self.chains.into_iter().flatten().collect()
    }
}

/// Run every decision through a fresh [`ChainSet`].
pub fn build_chains<M, I>(tasks: I) -> ChainSet<M>
where
    M: Clone + Eq + Hash,
    I: IntoIterator<Item = ChainTask<M>>,
{
    let mut set = ChainSet::new();
    for task in tasks {
        set.apply(&task);
    }
    set
}

/// Hands out file-wide cluster ids.
///
/// One allocator is threaded through an export run; groups are numbered in
/// the order they are passed in, chains within a group in chain order.
#[derive(Debug, Clone, Default)]
pub struct ClusterIdAllocator {
    next: u64,
}

impl ClusterIdAllocator {
    /// Allocator whose first id is `first`.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Take the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next call to [`Self::next_id`] will return.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Give every chain a fresh id and map each member to it.
    pub fn assign<M: Clone + Eq + Hash>(&mut self, chains: &[Vec<M>]) -> HashMap<M, u64> {
        let mut ids = HashMap::new();
        for chain in chains {
            let id = self.next_id();
            for mention in chain {
                ids.insert(mention.clone(), id);
            }
        }
        ids
    }
}
