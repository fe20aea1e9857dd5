//! Trie vertices and the arena that owns them.
//!
//! Every node lives in a [`NodeArena`] slot and is addressed by a [`NodeId`].
//! Child mappings and parent links store ids, so the tree has a single owner
//! (the arena) and no reference cycles.

use std::collections::HashMap;
use std::ops::Index;

use crate::error::TrieError;

/// Character of the synthetic child that marks "a key ends here".
pub const SENTINEL: char = '\0';

/// Handle to a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
pub struct Node {
    character: char,
    terminal: bool,
    mask: u64,
    parent: Option<NodeId>,
    children: HashMap<char, NodeId>,
}

impl Node {
    fn new(parent: Option<NodeId>, character: char, mask: u64, terminal: bool) -> Self {
        Self {
            character,
            terminal,
            mask,
            parent,
            children: HashMap::new(),
        }
    }

    pub fn character(&self) -> char {
        self.character
    }

    /// True only for sentinel children.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Letters found on this node or anywhere below it.
    pub fn mask(&self) -> u64 {
        self.mask
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &HashMap<char, NodeId> {
        &self.children
    }

    pub fn child(&self, key: char) -> Option<NodeId> {
        self.children.get(&key).copied()
    }
}

/// Flat store of trie nodes with slot reuse.
#[derive(Debug)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
    live: usize,
}

impl NodeArena {
    /// Creates an arena holding a single zero-valued root node.
    pub fn with_root() -> (Self, NodeId) {
        let arena = Self {
            slots: vec![Some(Node::new(None, SENTINEL, 0, false))],
            free: Vec::new(),
            live: 1,
        };
        (arena, NodeId(0))
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("dangling node id {}", id.0),
        }
    }

    /// Creates a node owned by `parent` and registers it under `key`.
    ///
    /// Mask propagation to ancestors is left to the caller.
    pub fn new_child(
        &mut self,
        parent: NodeId,
        key: char,
        mask: u64,
        value: char,
        terminal: bool,
    ) -> NodeId {
        let node = Node::new(Some(parent), value, mask, terminal);
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };
        self.live += 1;
        self.get_mut(parent).children.insert(key, id);
        id
    }

    /// ORs `bits` into the node's mask.
    pub fn union_mask(&mut self, id: NodeId, bits: u64) {
        self.get_mut(id).mask |= bits;
    }

    /// Detaches the child stored under `key` and releases its subtree, then
    /// recomputes masks from `node` up to the root.
    ///
    /// Returns the number of nodes released (zero if there was no such child).
    pub fn remove_child(&mut self, node: NodeId, key: char) -> usize {
        let Some(child) = self.get_mut(node).children.remove(&key) else {
            return 0;
        };
        let released = self.release(child);

        self.recalculate_mask(node);
        let mut ancestor = self[node].parent;
        while let Some(id) = ancestor {
            self.recalculate_mask(id);
            ancestor = self[id].parent;
        }
        released
    }

    /// Sets the mask to the node's own letter plus every child's letter and mask.
    pub fn recalculate_mask(&mut self, id: NodeId) {
        let node = &self[id];
        let mask = node
            .children
            .iter()
            .fold(letter_bit(node.character), |mask, (&key, &child)| {
                mask | letter_bit(key) | self[child].mask
            });
        self.get_mut(id).mask = mask;
    }

    fn release(&mut self, root: NodeId) -> usize {
        let mut stack = vec![root];
        let mut released = 0;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.slots[id.0].take() {
                stack.extend(node.children.into_values());
                self.free.push(id);
                self.live -= 1;
                released += 1;
            }
        }
        released
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("dangling node id {}", id.0),
        }
    }
}

/// Bit for a letter `a`-`z`; zero for anything else (the sentinel included).
pub fn letter_bit(c: char) -> u64 {
    match c {
        'a'..='z' => 1 << (c as u32 - 'a' as u32),
        _ => 0,
    }
}

pub fn mask_of(letters: &[char]) -> u64 {
    letters.iter().fold(0, |mask, &c| mask | letter_bit(c))
}

/// `result[i]` is the mask of `letters[i..]`; the trailing entry is zero.
pub fn suffix_masks(letters: &[char]) -> Vec<u64> {
    let mut masks = vec![0; letters.len() + 1];
    for (i, &c) in letters.iter().enumerate().rev() {
        masks[i] = masks[i + 1] | letter_bit(c);
    }
    masks
}

/// Renders a mask as the letters it contains, in alphabetical order.
pub fn mask_letters(mask: u64) -> String {
    ('a'..='z').filter(|&c| mask & letter_bit(c) != 0).collect()
}

/// Splits a key into letters, rejecting anything outside `a`-`z`.
pub fn letters(key: &str) -> Result<Vec<char>, TrieError> {
    key.chars()
        .enumerate()
        .map(|(position, character)| match character {
            'a'..='z' => Ok(character),
            _ => Err(TrieError::UnsupportedCharacter {
                character,
                position,
            }),
        })
        .collect()
}
