use std::{
    cmp::{Ordering},
    fmt::{Display, Formatter, Result as FmtResult},
};

use crate::{
    display::{OrderedDisplay, PreOrderDisplay},
    results::{DictionaryError, DictionaryResult, Operation},
};

struct Node<K: Ord, V> {
    key: K,
    value: V,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
}

/// An ordered key-value dictionary backed by an unbalanced binary search tree.
///
/// Nodes live in a dense arena and reference each other through indices;
/// parent links are navigational only, ownership stays with the arena. The
/// tree is never rebalanced, so adversarial insertion order degrades lookups
/// to linear time.
///
/// Besides the usual map operations, the dictionary carries a single
/// traversal cursor over its in-order key sequence, moved with [`begin`],
/// [`end`], [`next`] and [`prev`]. Removing the pair under the cursor
/// undefines the cursor; every other mutation leaves it where it was.
///
/// [`begin`]: OrderedDictionary::begin
/// [`end`]: OrderedDictionary::end
/// [`next`]: OrderedDictionary::next
/// [`prev`]: OrderedDictionary::prev
pub struct OrderedDictionary<K: Ord, V> {
    arena: Vec<Node<K, V>>,
    root: Option<usize>,
    cursor: Option<usize>,
}
impl<K: Ord, V> OrderedDictionary<K, V> {
    /// Creates an empty dictionary with an undefined cursor.
    pub fn new() -> OrderedDictionary<K, V> {
        OrderedDictionary::<K, V> {
            arena: Vec::<Node<K, V>>::new(),
            root: None,
            cursor: None,
        }
    }
    /// Returns the number of stored pairs.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.arena.len()
    }
    /// Returns `true` if the dictionary stores no pairs.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
    /// Returns `true` if a pair with the given key exists.
    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }
    /// Returns the value associated to the given key, or a lookup error if
    /// the key is absent.
    pub fn get_value(&self, key: &K) -> DictionaryResult<&V> {
        match self.search(key) {
            Some(index) => Ok(&self.arena[index].value),
            None => Err(DictionaryError::Lookup(Operation::GetValue)),
        }
    }
    /// Returns the value associated to the given key for in-place mutation,
    /// or a lookup error if the key is absent.
    pub fn get_value_mut(&mut self, key: &K) -> DictionaryResult<&mut V> {
        match self.search(key) {
            Some(index) => Ok(&mut self.arena[index].value),
            None => Err(DictionaryError::Lookup(Operation::GetValue)),
        }
    }
    /// If a pair with the given key exists, overwrites its value in place;
    /// the tree structure and the cursor are unaffected. Otherwise inserts
    /// the new pair at a leaf position.
    pub fn set_value(&mut self, key: K, value: V) {
        let next = self.arena.len();
        let parent = match self.descend(&key) {
            Some(pindex) => {
                let node = &mut self.arena[pindex];
                match key.cmp(&node.key) {
                    Ordering::Equal => {
                        node.value = value;
                        return;
                    },
                    Ordering::Less => node.left = Some(next),
                    Ordering::Greater => node.right = Some(next),
                }
                Some(pindex)
            },
            None => {
                self.root = Some(next);
                None
            },
        };
        self.arena.push(Node::<K, V> {
            key: key,
            value: value,
            parent: parent,
            left: None,
            right: None,
        });
    }
    /// Removes the pair with the given key, or fails with a precondition
    /// error if the key is absent. If the removed pair was under the
    /// cursor, the cursor becomes undefined.
    pub fn remove(&mut self, key: &K) -> DictionaryResult<()> {
        let target = match self.search(key) {
            Some(index) => index,
            None => return Err(DictionaryError::Precondition(Operation::Remove)),
        };
        if self.cursor == Some(target) {
            self.cursor = None;
        }
        let parent = self.arena[target].parent;
        let left = self.arena[target].left;
        let right = self.arena[target].right;
        let replacement = match (left, right) {
            (None, _) => right,
            (_, None) => left,
            (Some(lindex), Some(rindex)) => {
                let successor = self.subtree_min(rindex);
                if successor != rindex {
                    // the successor is a left descendant of the right child:
                    // detach it, re-attaching its right subtree in its place,
                    // and hand it the target's right subtree
                    let sparent = self.arena[successor].parent;
                    let sright = self.arena[successor].right;
                    self.replace_child(sparent, successor, sright);
                    self.arena[successor].right = Some(rindex);
                    self.arena[rindex].parent = Some(successor);
                }
                self.arena[successor].left = Some(lindex);
                self.arena[lindex].parent = Some(successor);
                Some(successor)
            },
        };
        self.replace_child(parent, target, replacement);
        self.release(target);
        Ok(())
    }
    /// Resets the dictionary to the empty state with an undefined cursor.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.cursor = None;
    }
    /// Returns `true` if the cursor is defined.
    #[inline(always)]
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }
    /// Returns the key under the cursor, or a precondition error if the
    /// cursor is undefined.
    pub fn current_key(&self) -> DictionaryResult<&K> {
        match self.cursor {
            Some(index) => Ok(&self.arena[index].key),
            None => Err(DictionaryError::Precondition(Operation::CurrentKey)),
        }
    }
    /// Returns the value under the cursor, or a precondition error if the
    /// cursor is undefined.
    pub fn current_value(&self) -> DictionaryResult<&V> {
        match self.cursor {
            Some(index) => Ok(&self.arena[index].value),
            None => Err(DictionaryError::Precondition(Operation::CurrentValue)),
        }
    }
    /// Returns the value under the cursor for in-place mutation, or a
    /// precondition error if the cursor is undefined.
    pub fn current_value_mut(&mut self) -> DictionaryResult<&mut V> {
        match self.cursor {
            Some(index) => Ok(&mut self.arena[index].value),
            None => Err(DictionaryError::Precondition(Operation::CurrentValue)),
        }
    }
    /// Places the cursor on the smallest key; does nothing on an empty
    /// dictionary.
    pub fn begin(&mut self) {
        if let Some(rindex) = self.root {
            self.cursor = Some(self.subtree_min(rindex));
        }
    }
    /// Places the cursor on the largest key; does nothing on an empty
    /// dictionary.
    pub fn end(&mut self) {
        if let Some(rindex) = self.root {
            self.cursor = Some(self.subtree_max(rindex));
        }
    }
    /// Advances the cursor to the next key in ascending order, undefining
    /// it when it was on the largest key. Fails with a precondition error
    /// if the cursor is undefined.
    pub fn next(&mut self) -> DictionaryResult<()> {
        match self.cursor {
            Some(index) => {
                self.cursor = self.in_order_next(index);
                Ok(())
            },
            None => Err(DictionaryError::Precondition(Operation::Next)),
        }
    }
    /// Moves the cursor to the previous key in ascending order, undefining
    /// it when it was on the smallest key. Fails with a precondition error
    /// if the cursor is undefined.
    pub fn prev(&mut self) -> DictionaryResult<()> {
        match self.cursor {
            Some(index) => {
                self.cursor = self.in_order_prev(index);
                Ok(())
            },
            None => Err(DictionaryError::Precondition(Operation::Prev)),
        }
    }
    /// Returns `true` if both dictionaries store the same pairs. Keys and
    /// values are compared directly, regardless of how they render.
    pub fn equals(&self, other: &OrderedDictionary<K, V>) -> bool where
        V: PartialEq
    {
        self.size() == other.size() && self.iter().zip(other.iter()).all(
            |((k1, v1), (k2, v2))| k1 == k2 && v1 == v2
        )
    }
    /// Returns the number of nodes on the longest root-to-leaf path; an
    /// empty dictionary has height zero.
    pub fn height(&self) -> usize {
        let mut height = 0usize;
        for index in 0..self.arena.len() {
            let node = &self.arena[index];
            if node.left.is_none() && node.right.is_none() {
                let mut depth = 1usize;
                let mut curr = index;
                while let Some(pindex) = self.arena[curr].parent {
                    depth += 1usize;
                    curr = pindex;
                }
                if depth > height {
                    height = depth;
                }
            }
        }
        height
    }
    /// Renders one `key : value` line per pair, in ascending key order.
    pub fn to_ordered_string(&self) -> String where
        K: Display,
        V: Display
    {
        format!("{}", OrderedDisplay(self))
    }
    /// Renders one key per line, in pre-order.
    pub fn to_pre_order_string(&self) -> String where
        K: Display
    {
        format!("{}", PreOrderDisplay(self))
    }
    /// Iterates over the pairs in ascending key order. The iterator holds
    /// its own position and does not interact with the cursor.
    pub fn iter<'a, 'b: 'a>(&'b self) -> Iter<'a, K, V> {
        Iter::<'a, K, V> {
            dict: self,
            next: self.root.map(|rindex| self.subtree_min(rindex)),
        }
    }
    /// Iterates over the pairs in pre-order. Re-inserting the pairs in this
    /// order into an empty dictionary reproduces the exact tree shape.
    pub fn pre_order<'a, 'b: 'a>(&'b self) -> PreOrder<'a, K, V> {
        PreOrder::<'a, K, V> {
            dict: self,
            next: self.root,
        }
    }
    // Descends from the root comparing against each visited key, returning
    // the index of the node with the given key, or of the leaf where the
    // descent bottomed out, or `None` on an empty tree.
    fn descend(&self, key: &K) -> Option<usize> {
        let mut curr = self.root?;
        loop {
            let node = &self.arena[curr];
            let next = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => break Some(curr),
            };
            match next {
                Some(nindex) => curr = nindex,
                None => break Some(curr),
            }
        }
    }
    fn search(&self, key: &K) -> Option<usize> {
        let found = self.descend(key)?;
        if &self.arena[found].key == key {
            Some(found)
        } else {
            None
        }
    }
    fn subtree_min(&self, index: usize) -> usize {
        let mut curr = index;
        while let Some(next) = self.arena[curr].left {
            curr = next;
        }
        curr
    }
    fn subtree_max(&self, index: usize) -> usize {
        let mut curr = index;
        while let Some(next) = self.arena[curr].right {
            curr = next;
        }
        curr
    }
    // In-order successor: the leftmost node of the right subtree if there is
    // one, otherwise the nearest ancestor reached through a left-child edge.
    fn in_order_next(&self, index: usize) -> Option<usize> {
        if let Some(rindex) = self.arena[index].right {
            return Some(self.subtree_min(rindex));
        }
        let mut curr = index;
        loop {
            let pindex = self.arena[curr].parent?;
            if self.arena[pindex].left == Some(curr) {
                break Some(pindex);
            }
            curr = pindex;
        }
    }
    fn in_order_prev(&self, index: usize) -> Option<usize> {
        if let Some(lindex) = self.arena[index].left {
            return Some(self.subtree_max(lindex));
        }
        let mut curr = index;
        loop {
            let pindex = self.arena[curr].parent?;
            if self.arena[pindex].right == Some(curr) {
                break Some(pindex);
            }
            curr = pindex;
        }
    }
    // Pre-order successor: first child if any, otherwise the right child of
    // the nearest ancestor whose left subtree contains the node.
    fn pre_order_next(&self, index: usize) -> Option<usize> {
        let node = &self.arena[index];
        if node.left.is_some() {
            return node.left;
        }
        if node.right.is_some() {
            return node.right;
        }
        let mut curr = index;
        loop {
            let pindex = self.arena[curr].parent?;
            let pnode = &self.arena[pindex];
            if pnode.left == Some(curr) && pnode.right.is_some() {
                break pnode.right;
            }
            curr = pindex;
        }
    }
    // Points the parent's child link (or the root) at `child` instead of
    // `old`, and updates the child's parent link.
    fn replace_child(&mut self, parent: Option<usize>, old: usize, child: Option<usize>) {
        match parent {
            Some(pindex) => {
                let node = &mut self.arena[pindex];
                if node.left == Some(old) {
                    node.left = child;
                } else {
                    node.right = child;
                }
            },
            None => self.root = child,
        }
        if let Some(cindex) = child {
            self.arena[cindex].parent = parent;
        }
    }
    // Drops the node at `index`, which must already be detached from the
    // tree. The arena stays dense: the node from the last slot moves into
    // the vacated one, and every link that referred to it is repaired.
    fn release(&mut self, index: usize) {
        let moved = self.arena.len() - 1usize;
        self.arena.swap_remove(index);
        if index == moved {
            return;
        }
        let parent = self.arena[index].parent;
        let left = self.arena[index].left;
        let right = self.arena[index].right;
        match parent {
            Some(pindex) => {
                let node = &mut self.arena[pindex];
                if node.left == Some(moved) {
                    node.left = Some(index);
                } else {
                    node.right = Some(index);
                }
            },
            None => self.root = Some(index),
        }
        if let Some(cindex) = left {
            self.arena[cindex].parent = Some(index);
        }
        if let Some(cindex) = right {
            self.arena[cindex].parent = Some(index);
        }
        if self.cursor == Some(moved) {
            self.cursor = Some(index);
        }
    }
}
impl<K: Ord, V> Default for OrderedDictionary<K, V> {
    fn default() -> OrderedDictionary<K, V> {
        OrderedDictionary::<K, V>::new()
    }
}
impl<K: Ord + Clone, V: Clone> Clone for OrderedDictionary<K, V> {
    /// Deep-copies the source by re-inserting its pairs in pre-order, which
    /// reproduces the exact tree shape. The copy starts with an undefined
    /// cursor.
    fn clone(&self) -> OrderedDictionary<K, V> {
        let mut copy = OrderedDictionary::<K, V>::new();
        copy.clone_from(self);
        copy
    }
    fn clone_from(&mut self, source: &OrderedDictionary<K, V>) {
        self.clear();
        for (key, value) in source.pre_order() {
            self.set_value(key.clone(), value.clone());
        }
    }
}
impl<K: Ord, V: PartialEq> PartialEq for OrderedDictionary<K, V> {
    fn eq(&self, other: &OrderedDictionary<K, V>) -> bool {
        self.equals(other)
    }
}
impl<K: Ord, V: Eq> Eq for OrderedDictionary<K, V> {}
impl<K: Ord + Display, V: Display> Display for OrderedDictionary<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", OrderedDisplay(self))
    }
}
impl<'a, K: Ord, V> IntoIterator for &'a OrderedDictionary<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// In-order iterator over the pairs of an [`OrderedDictionary`].
pub struct Iter<'a, K: Ord, V> {
    dict: &'a OrderedDictionary<K, V>,
    next: Option<usize>,
}
impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let index = self.next?;
        self.next = self.dict.in_order_next(index);
        let node = &self.dict.arena[index];
        Some((&node.key, &node.value))
    }
}

/// Pre-order iterator over the pairs of an [`OrderedDictionary`].
pub struct PreOrder<'a, K: Ord, V> {
    dict: &'a OrderedDictionary<K, V>,
    next: Option<usize>,
}
impl<'a, K: Ord, V> Iterator for PreOrder<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let index = self.next?;
        self.next = self.dict.pre_order_next(index);
        let node = &self.dict.arena[index];
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
pub mod test {
    use rand::{self, Rng, seq::SliceRandom};
    use std::collections::{BTreeMap};
    use crate::{
        dictionary::{OrderedDictionary},
        results::{DictionaryError, Operation},
    };

    pub fn generate_keys<R: Rng>(rng: &mut R, maxsize: usize, limit: u64) -> Vec<u64> {
        let size = rng.gen_range(0usize, maxsize + 1usize);
        let mut vec = Vec::<u64>::new();
        for _ in 0..size {
            vec.push(rng.gen_range(0u64, limit));
        }
        vec.sort();
        vec.dedup();
        vec.shuffle(rng);
        vec
    }
    pub fn generate_external_key<R: Rng>(rng: &mut R, keys: &[u64], limit: u64) -> u64 {
        loop {
            let key = rng.gen_range(0u64, limit);
            if !keys.contains(&key) {
                break key;
            }
        }
    }
    fn check_structure(dict: &OrderedDictionary<u64, u64>) {
        match dict.root {
            Some(rindex) => assert!(dict.arena[rindex].parent.is_none()),
            None => assert!(dict.arena.is_empty()),
        }
        for index in 0..dict.arena.len() {
            let node = &dict.arena[index];
            if let Some(lindex) = node.left {
                assert!(dict.arena[lindex].parent == Some(index));
                assert!(dict.arena[lindex].key < node.key);
            }
            if let Some(rindex) = node.right {
                assert!(dict.arena[rindex].parent == Some(index));
                assert!(dict.arena[rindex].key > node.key);
            }
        }
        let mut count = 0usize;
        let mut last: Option<u64> = None;
        for (&key, _) in dict.iter() {
            if let Some(prev) = last {
                assert!(prev < key);
            }
            last = Some(key);
            count += 1usize;
        }
        assert_eq!(count, dict.size());
        if let Some(cindex) = dict.cursor {
            assert!(cindex < dict.arena.len());
        }
    }

    #[test]
    fn test_insert_lookup() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let keys = generate_keys(&mut rng, 200usize, 1000u64);
            let mut dict = OrderedDictionary::<u64, u64>::new();
            for (n, &key) in keys.iter().enumerate() {
                dict.set_value(key, n as u64);
                assert_eq!(dict.size(), n + 1usize);
            }
            for (n, &key) in keys.iter().enumerate() {
                assert!(dict.contains(&key));
                assert_eq!(dict.get_value(&key), Ok(&(n as u64)));
            }
            for _ in 0..50 {
                let ext = generate_external_key(&mut rng, &keys, 1000u64);
                assert!(!dict.contains(&ext));
                assert_eq!(dict.get_value(&ext), Err(DictionaryError::Lookup(Operation::GetValue)));
            }
            check_structure(&dict);
        }
    }

    #[test]
    fn test_overwrite() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let keys = generate_keys(&mut rng, 100usize, 500u64);
            if keys.is_empty() {
                continue;
            }
            let mut dict = OrderedDictionary::<u64, u64>::new();
            for &key in &keys {
                dict.set_value(key, key);
            }
            dict.begin();
            let current = *dict.current_key().unwrap();
            let shape = dict.to_pre_order_string();
            for &key in &keys {
                dict.set_value(key, key + 1u64);
            }
            assert_eq!(dict.size(), keys.len());
            for &key in &keys {
                assert_eq!(dict.get_value(&key), Ok(&(key + 1u64)));
            }
            // overwriting is not a structural change: same shape, same cursor
            assert_eq!(dict.to_pre_order_string(), shape);
            assert_eq!(dict.current_key(), Ok(&current));
            check_structure(&dict);
        }
    }

    #[test]
    fn test_removal() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let mut keys = generate_keys(&mut rng, 100usize, 500u64);
            let mut dict = OrderedDictionary::<u64, u64>::new();
            for &key in &keys {
                dict.set_value(key, key);
            }
            let ext = generate_external_key(&mut rng, &keys, 500u64);
            assert_eq!(dict.remove(&ext), Err(DictionaryError::Precondition(Operation::Remove)));
            assert_eq!(dict.size(), keys.len());
            keys.shuffle(&mut rng);
            let mut remaining = keys.len();
            for &key in &keys {
                assert_eq!(dict.remove(&key), Ok(()));
                remaining -= 1usize;
                assert!(!dict.contains(&key));
                assert_eq!(dict.size(), remaining);
                check_structure(&dict);
            }
            assert!(dict.is_empty());
        }
    }

    #[test]
    fn test_cursor_traversal() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let keys = generate_keys(&mut rng, 200usize, 1000u64);
            let mut sorted = keys.clone();
            sorted.sort();
            let mut dict = OrderedDictionary::<u64, u64>::new();
            for &key in &keys {
                dict.set_value(key, key);
            }
            dict.begin();
            let mut forward = Vec::<u64>::new();
            while dict.has_cursor() {
                forward.push(*dict.current_key().unwrap());
                dict.next().unwrap();
            }
            assert_eq!(forward, sorted);
            dict.end();
            let mut backward = Vec::<u64>::new();
            while dict.has_cursor() {
                backward.push(*dict.current_key().unwrap());
                dict.prev().unwrap();
            }
            backward.reverse();
            assert_eq!(backward, sorted);
        }
    }

    #[test]
    fn test_cursor_invalidation() {
        let mut dict = OrderedDictionary::<u64, u64>::new();
        for &key in &[50u64, 20u64, 80u64, 10u64, 30u64, 70u64, 90u64] {
            dict.set_value(key, key);
        }
        dict.begin();
        dict.next().unwrap();
        dict.next().unwrap();
        assert_eq!(dict.current_key(), Ok(&30u64));
        dict.remove(&30u64).unwrap();
        assert!(!dict.has_cursor());
        assert_eq!(dict.current_key(), Err(DictionaryError::Precondition(Operation::CurrentKey)));
        // removing another pair leaves the cursor alone
        dict.begin();
        assert_eq!(dict.current_key(), Ok(&10u64));
        dict.remove(&80u64).unwrap();
        assert!(dict.has_cursor());
        assert_eq!(dict.current_key(), Ok(&10u64));
        // the cursor must survive its node being relocated within the arena
        let mut dict = OrderedDictionary::<u64, u64>::new();
        for &key in &[50u64, 20u64, 80u64, 10u64, 30u64, 70u64, 90u64] {
            dict.set_value(key, key);
        }
        dict.end();
        assert_eq!(dict.current_key(), Ok(&90u64));
        dict.remove(&10u64).unwrap();
        assert_eq!(dict.current_key(), Ok(&90u64));
        dict.prev().unwrap();
        assert_eq!(dict.current_key(), Ok(&80u64));
    }

    #[test]
    fn test_two_child_removal() {
        // the successor is not the direct right child and carries a right
        // subtree, which must be re-parented onto the successor's old parent
        let mut dict = OrderedDictionary::<u64, u64>::new();
        for &key in &[50u64, 20u64, 80u64, 60u64, 90u64, 70u64, 65u64] {
            dict.set_value(key, key);
        }
        dict.remove(&50u64).unwrap();
        assert_eq!(dict.to_pre_order_string(), "60\n20\n80\n70\n65\n90\n");
        assert_eq!(
            dict.to_ordered_string(),
            "20 : 20\n60 : 60\n65 : 65\n70 : 70\n80 : 80\n90 : 90\n"
        );
        check_structure(&dict);
        // the successor is the direct right child and keeps its own right subtree
        let mut dict = OrderedDictionary::<u64, u64>::new();
        for &key in &[50u64, 20u64, 80u64, 90u64] {
            dict.set_value(key, key);
        }
        dict.remove(&50u64).unwrap();
        assert_eq!(dict.to_pre_order_string(), "80\n20\n90\n");
        check_structure(&dict);
    }

    #[test]
    fn test_copy_equality() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let keys = generate_keys(&mut rng, 100usize, 500u64);
            let mut dict = OrderedDictionary::<u64, u64>::new();
            for &key in &keys {
                dict.set_value(key, key);
            }
            dict.begin();
            let copy = dict.clone();
            assert!(copy.equals(&dict));
            assert!(copy == dict);
            assert!(!copy.has_cursor());
            assert_eq!(copy.to_pre_order_string(), dict.to_pre_order_string());
            // the copy is independent of the source
            let mut copy = copy;
            let ext = generate_external_key(&mut rng, &keys, 500u64);
            copy.set_value(ext, 0u64);
            assert!(!copy.equals(&dict));
            assert!(!dict.contains(&ext));
            copy.remove(&ext).unwrap();
            assert!(copy.equals(&dict));
            if let Some(&key) = keys.first() {
                copy.set_value(key, key + 1u64);
                assert!(!copy.equals(&dict));
                assert_eq!(dict.get_value(&key), Ok(&key));
            }
            // assignment replaces the previous contents
            let mut other = OrderedDictionary::<u64, u64>::new();
            other.set_value(7u64, 7u64);
            other.clone_from(&dict);
            assert!(other.equals(&dict));
            assert_eq!(other.to_pre_order_string(), dict.to_pre_order_string());
        }
    }

    #[test]
    fn test_preorder_rebuild() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let keys = generate_keys(&mut rng, 200usize, 1000u64);
            let mut dict = OrderedDictionary::<u64, u64>::new();
            for &key in &keys {
                dict.set_value(key, key);
            }
            let mut rebuilt = OrderedDictionary::<u64, u64>::new();
            for (&key, &value) in dict.pre_order() {
                rebuilt.set_value(key, value);
            }
            assert_eq!(rebuilt.to_pre_order_string(), dict.to_pre_order_string());
            assert!(rebuilt.equals(&dict));
        }
    }

    #[test]
    fn test_line_example() {
        let mut dict = OrderedDictionary::<&str, u64>::new();
        dict.set_value("b", 1u64);
        dict.set_value("a", 2u64);
        dict.set_value("c", 3u64);
        assert_eq!(dict.to_ordered_string(), "a : 2\nb : 1\nc : 3\n");
        assert_eq!(dict.to_pre_order_string(), "b\na\nc\n");
        assert_eq!(format!("{}", dict), "a : 2\nb : 1\nc : 3\n");
        assert_eq!(dict.height(), 2usize);
        dict.remove(&"a").unwrap();
        assert!(!dict.contains(&"a"));
        assert_eq!(dict.size(), 2usize);
    }

    #[test]
    fn test_empty() {
        let mut dict = OrderedDictionary::<u64, u64>::new();
        assert!(dict.is_empty());
        assert_eq!(dict.size(), 0usize);
        assert_eq!(dict.height(), 0usize);
        assert!(!dict.has_cursor());
        dict.begin();
        assert!(!dict.has_cursor());
        dict.end();
        assert!(!dict.has_cursor());
        assert_eq!(dict.to_ordered_string(), "");
        assert_eq!(dict.to_pre_order_string(), "");
        assert_eq!(dict.next(), Err(DictionaryError::Precondition(Operation::Next)));
        assert_eq!(dict.prev(), Err(DictionaryError::Precondition(Operation::Prev)));
        assert_eq!(dict.current_key(), Err(DictionaryError::Precondition(Operation::CurrentKey)));
        assert_eq!(dict.current_value(), Err(DictionaryError::Precondition(Operation::CurrentValue)));
        assert_eq!(dict.current_value_mut(), Err(DictionaryError::Precondition(Operation::CurrentValue)));
    }

    #[test]
    fn test_clear() {
        let mut dict = OrderedDictionary::<u64, u64>::new();
        for key in 0u64..20u64 {
            dict.set_value(key, key);
        }
        dict.begin();
        dict.clear();
        assert!(dict.is_empty());
        assert!(!dict.has_cursor());
        assert!(!dict.contains(&0u64));
        assert_eq!(dict.to_ordered_string(), "");
        dict.set_value(3u64, 3u64);
        assert_eq!(dict.size(), 1usize);
        assert_eq!(dict.get_value(&3u64), Ok(&3u64));
    }

    #[test]
    fn test_value_mutation() {
        let mut dict = OrderedDictionary::<u64, u64>::new();
        dict.set_value(10u64, 1u64);
        dict.set_value(5u64, 2u64);
        *dict.get_value_mut(&5u64).unwrap() = 99u64;
        assert_eq!(dict.get_value(&5u64), Ok(&99u64));
        dict.begin();
        *dict.current_value_mut().unwrap() = 7u64;
        assert_eq!(dict.current_value(), Ok(&7u64));
        assert_eq!(dict.get_value(&5u64), Ok(&7u64));
        assert_eq!(dict.size(), 2usize);
    }

    #[test]
    fn test_against_oracle() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let mut dict = OrderedDictionary::<u64, u64>::new();
            let mut oracle = BTreeMap::<u64, u64>::new();
            for _ in 0..2000 {
                let key = rng.gen_range(0u64, 200u64);
                if rng.gen::<bool>() {
                    let value = rng.gen_range(0u64, 1000u64);
                    dict.set_value(key, value);
                    oracle.insert(key, value);
                } else {
                    let removed = dict.remove(&key);
                    assert_eq!(removed.is_ok(), oracle.remove(&key).is_some());
                }
            }
            assert_eq!(dict.size(), oracle.len());
            assert!(dict.iter().map(|(&k, &v)| (k, v)).eq(oracle.iter().map(|(&k, &v)| (k, v))));
            check_structure(&dict);
        }
    }

    #[test]
    fn test_degenerate_chain() {
        let mut dict = OrderedDictionary::<u64, u64>::new();
        for key in 0u64..2000u64 {
            dict.set_value(key, key);
        }
        assert_eq!(dict.height(), 2000usize);
        // traversal, rendering and copying stay iterative, so a degenerate
        // chain must not exhaust the stack
        let copy = dict.clone();
        assert!(copy.equals(&dict));
        assert_eq!(dict.to_pre_order_string().lines().count(), 2000usize);
        dict.begin();
        let mut count = 0usize;
        while dict.has_cursor() {
            count += 1usize;
            dict.next().unwrap();
        }
        assert_eq!(count, 2000usize);
    }
}
