//! `ReliableList<T>`: a doubly linked chain of nodes in the raw map.

use crate::{IdAllocator, RawMap};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use tstore_core::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node<T> {
    data: T,
    prev: Option<u64>,
    next: Option<u64>,
}

/// A doubly linked list persisted atop a [`RawMap`]. Each node is
/// addressed by a ref obtained from a dedicated [`IdAllocator`]; the list
/// maintains head and tail pointers and a length counter.
pub struct ReliableList<T> {
    path: String,
    raw_map: Arc<dyn RawMap>,
    ref_gen: Arc<IdAllocator>,
    _marker: PhantomData<T>,
}

impl<T> ReliableList<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Open (or create) a list rooted at `path`, using `ref_gen` to mint
    /// node refs.
    pub fn open(path: impl Into<String>, raw_map: Arc<dyn RawMap>, ref_gen: Arc<IdAllocator>) -> Self {
        ReliableList {
            path: path.into(),
            raw_map,
            ref_gen,
            _marker: PhantomData,
        }
    }

    /// Append `item` as the new tail.
    pub fn append(&self, item: T) -> Result<()> {
        let node_ref = self.ref_gen.next_id()?;
        let old_tail = self.read_pointer("tail")?;

        let node = Node {
            data: item,
            prev: old_tail,
            next: None,
        };
        self.write_node(node_ref, &node)?;

        match old_tail {
            Some(tail_ref) => {
                let mut tail_node: Node<T> = self.read_node(tail_ref)?.expect("tail node must exist");
                tail_node.next = Some(node_ref);
                self.write_node(tail_ref, &tail_node)?;
            }
            None => self.write_pointer("head", Some(node_ref))?,
        }

        self.write_pointer("tail", Some(node_ref))?;
        let length = self.length()?;
        self.write_length(length + 1)
    }

    /// The tail item, without removing it.
    pub fn peek(&self) -> Result<Option<T>> {
        match self.read_pointer("tail")? {
            Some(tail_ref) => Ok(self.read_node(tail_ref)?.map(|n| n.data)),
            None => Ok(None),
        }
    }

    /// The number of items currently in the list.
    pub fn length(&self) -> Result<u64> {
        Ok(self.read_length()?.unwrap_or(0))
    }

    /// Remove and return the tail item.
    pub fn pop(&self) -> Result<Option<T>> {
        let tail_ref = match self.read_pointer("tail")? {
            Some(r) => r,
            None => return Ok(None),
        };
        let node: Node<T> = self.read_node(tail_ref)?.expect("tail node must exist");

        self.write_pointer("tail", node.prev)?;
        match node.prev {
            Some(prev_ref) => {
                let mut prev_node: Node<T> = self.read_node(prev_ref)?.expect("prev node must exist");
                prev_node.next = None;
                self.write_node(prev_ref, &prev_node)?;
            }
            None => self.write_pointer("head", None)?,
        }

        let length = self.length()?;
        self.write_length(length.saturating_sub(1))?;
        self.delete_node(tail_ref)?;
        Ok(Some(node.data))
    }

    /// Remove the node addressed by `node_ref`, rewiring its neighbors.
    /// A no-op if the ref is not a current node.
    pub fn delete(&self, node_ref: u64) -> Result<()> {
        let node: Node<T> = match self.read_node(node_ref)? {
            Some(n) => n,
            None => return Ok(()),
        };

        match node.prev {
            Some(prev_ref) => {
                let mut prev_node: Node<T> = self.read_node(prev_ref)?.expect("prev node must exist");
                prev_node.next = node.next;
                self.write_node(prev_ref, &prev_node)?;
            }
            None => self.write_pointer("head", node.next)?,
        }

        match node.next {
            Some(next_ref) => {
                let mut next_node: Node<T> = self.read_node(next_ref)?.expect("next node must exist");
                next_node.prev = node.prev;
                self.write_node(next_ref, &next_node)?;
            }
            None => self.write_pointer("tail", node.prev)?,
        }

        let length = self.length()?;
        self.write_length(length.saturating_sub(1))?;
        self.delete_node(node_ref)
    }

    /// Every item, head to tail.
    pub fn items(&self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor = self.read_pointer("head")?;
        while let Some(node_ref) = cursor {
            let node: Node<T> = self.read_node(node_ref)?.expect("linked node must exist");
            items.push(node.data);
            cursor = node.next;
        }
        Ok(items)
    }

    fn node_path(&self, node_ref: u64) -> String {
        format!("{}/nodes/{node_ref}", self.path)
    }

    fn pointer_path(&self, which: &str) -> String {
        format!("{}/{which}", self.path)
    }

    fn length_path(&self) -> String {
        format!("{}/length", self.path)
    }

    fn read_node(&self, node_ref: u64) -> Result<Option<Node<T>>> {
        match self.raw_map.get(&self.node_path(node_ref))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_node(&self, node_ref: u64, node: &Node<T>) -> Result<()> {
        self.raw_map.set(&self.node_path(node_ref), serde_json::to_vec(node)?)
    }

    fn delete_node(&self, node_ref: u64) -> Result<()> {
        self.raw_map.delete(&self.node_path(node_ref))
    }

    fn read_pointer(&self, which: &str) -> Result<Option<u64>> {
        match self.raw_map.get(&self.pointer_path(which))? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(None),
        }
    }

    fn write_pointer(&self, which: &str, value: Option<u64>) -> Result<()> {
        self.raw_map.set(&self.pointer_path(which), serde_json::to_vec(&value)?)
    }

    fn read_length(&self) -> Result<Option<u64>> {
        match self.raw_map.get(&self.length_path())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_length(&self, length: u64) -> Result<()> {
        self.raw_map.set(&self.length_path(), serde_json::to_vec(&length)?)
    }
}
