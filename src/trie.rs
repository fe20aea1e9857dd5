use tracing::trace;

use crate::error::TrieError;
use crate::node::{letters, suffix_masks, Node, NodeArena, NodeId, SENTINEL};

/// R-way trie over lowercase ASCII words with per-node letter masks.
#[derive(Debug)]
pub struct Trie {
    nodes: NodeArena,
    root: NodeId,
    size: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        let (nodes, root) = NodeArena::with_root();
        Self {
            nodes,
            root,
            size: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of live nodes, root and sentinels included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts `key` and returns its depth (number of letters).
    ///
    /// Adding a key that is already stored leaves the trie unchanged.
    pub fn add(&mut self, key: &str) -> Result<usize, TrieError> {
        let letters = letters(key)?;
        self.insert(&letters);
        Ok(letters.len())
    }

    /// Inserts every key, or none of them if any key is invalid.
    ///
    /// Returns how many of the keys were not already stored.
    pub fn add_all<I, S>(&mut self, keys: I) -> Result<usize, TrieError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let validated = keys
            .into_iter()
            .map(|key| letters(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(validated.iter().filter(|key| self.insert(key)).count())
    }

    /// Inserts already validated letters; returns false if the key was stored.
    pub(crate) fn insert(&mut self, letters: &[char]) -> bool {
        let remaining = suffix_masks(letters);
        self.nodes.union_mask(self.root, remaining[0]);

        let mut node = self.root;
        for (i, &c) in letters.iter().enumerate() {
            let child = match self.nodes[node].child(c) {
                Some(child) => child,
                None => self.nodes.new_child(node, c, remaining[i], c, false),
            };
            self.nodes.union_mask(child, remaining[i]);
            node = child;
        }

        if self.nodes[node].child(SENTINEL).is_some() {
            return false;
        }
        self.nodes.new_child(node, SENTINEL, 0, SENTINEL, true);
        self.size += 1;
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        letters(key)
            .ok()
            .and_then(|letters| self.find_node(&letters))
            .is_some_and(|node| self.nodes[node].child(SENTINEL).is_some())
    }

    /// Removes `key`, pruning the branch of nodes only it was using.
    pub fn remove(&mut self, key: &str) -> Result<(), TrieError> {
        let letters = letters(key)?;
        let not_found = || TrieError::KeyNotFound(key.to_owned());
        let last = self.find_node(&letters).ok_or_else(not_found)?;
        let mut edge = self.nodes[last].child(SENTINEL).ok_or_else(not_found)?;

        // Climb the single-child chain above the sentinel; the edge to cut hangs
        // off the first ancestor that branches, or off the root.
        while let Some(parent) = self.nodes[edge].parent() {
            if parent == self.root || self.nodes[parent].children().len() > 1 {
                let character = self.nodes[edge].character();
                let released = self.nodes.remove_child(parent, character);
                trace!(key, released, "removed key");
                break;
            }
            edge = parent;
        }

        self.size -= 1;
        Ok(())
    }

    /// Every stored key, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.size);
        self.collect(self.root, String::new(), &mut keys);
        keys
    }

    /// Every stored key starting with `prefix`, in no particular order.
    ///
    /// Callers that need a stable order sort the result themselves; only
    /// [`Trie::fuzzy_search`] sorts.
    pub fn prefix_search(&self, prefix: &str) -> Result<Vec<String>, TrieError> {
        let letters = letters(prefix)?;
        let mut keys = Vec::new();
        if let Some(node) = self.find_node(&letters) {
            self.collect(node, prefix.to_owned(), &mut keys);
        }
        Ok(keys)
    }

    /// Keys whose letters contain `pattern` as an ordered subsequence,
    /// sorted ascending.
    pub fn fuzzy_search(&self, pattern: &str) -> Result<Vec<String>, TrieError> {
        let pattern = letters(pattern)?;
        let required = suffix_masks(&pattern);
        let mut keys = Vec::new();

        let mut stack = vec![(self.root, String::new(), 0)];
        while let Some((node, matched, pos)) = stack.pop() {
            if pos == pattern.len() {
                self.collect(node, matched, &mut keys);
                continue;
            }

            let needed = required[pos];
            for (&c, &child) in self.nodes[node].children() {
                // Every remaining pattern letter must occur somewhere below.
                if self.nodes[child].mask() & needed != needed {
                    continue;
                }
                let next = if c == pattern[pos] { pos + 1 } else { pos };
                let mut path = matched.clone();
                path.push(c);
                stack.push((child, path, next));
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }

    /// Letter set of every stored key.
    pub fn mask(&self) -> u64 {
        self.nodes[self.root].mask()
    }

    fn find_node(&self, letters: &[char]) -> Option<NodeId> {
        letters
            .iter()
            .try_fold(self.root, |node, &c| self.nodes[node].child(c))
    }

    fn collect(&self, start: NodeId, prefix: String, keys: &mut Vec<String>) {
        let mut stack = vec![(start, prefix)];
        while let Some((node, path)) = stack.pop() {
            for (&c, &child) in self.nodes[node].children() {
                if self.nodes[child].is_terminal() {
                    keys.push(path.clone());
                    continue;
                }
                let mut next = path.clone();
                next.push(c);
                stack.push((child, next));
            }
        }
    }
}
