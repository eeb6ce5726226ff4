// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Content digests of flattened plists.

The content digest of a plist is a BLAKE2b (64 byte) digest over the
canonical bytes of its flattened values, visited in sorted key order. Each
value updates the running digest on its own and no separators are inserted,
so the digest of a plist is the digest of the concatenation of its values.
Keys do not contribute to the digest.
*/

use {
    crate::{canonical::canonical_bytes, FlatPlist},
    blake2::Blake2b512,
    digest::Digest,
    plist::Value,
};

/// Streaming content hasher.
#[derive(Clone, Default)]
pub struct ContentHasher {
    hasher: Blake2b512,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes to the digest.
    pub fn update_bytes(&mut self, data: impl AsRef<[u8]>) {
        self.hasher.update(data.as_ref());
    }

    /// Feed the canonical bytes of a value to the digest.
    pub fn update_value(&mut self, value: &Value) {
        self.update_bytes(canonical_bytes(value));
    }

    /// Finish and obtain the lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Digest a sequence of byte strings.
pub fn digest_values<T: AsRef<[u8]>>(values: impl IntoIterator<Item = T>) -> String {
    let mut hasher = ContentHasher::new();
    for value in values {
        hasher.update_bytes(value);
    }

    hasher.finalize_hex()
}

/// Compute the content digest of a flattened plist.
pub fn content_digest(flat: &FlatPlist) -> String {
    let mut hasher = ContentHasher::new();
    for (_, value) in flat.sorted_entries() {
        hasher.update_value(value);
    }

    hasher.finalize_hex()
}
