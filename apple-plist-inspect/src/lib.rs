// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inspect and compare Apple property list files.
//!
//! This crate reads binary and XML plist files and answers a simple question
//! about them: do two plists hold the same content? It is primarily intended
//! for inspecting launchd agent and daemon plists, where the same logical
//! configuration may be stored with different key orders or encodings.
//!
//! # Content Identity
//!
//! Content identity is defined over a *flattened* view of a plist. Nested
//! dictionaries are collapsed into a single level keyed by dot-joined paths
//! (see [flatten]). Each flattened value is rendered in a canonical textual
//! form (see [canonical]) and the values, in sorted key order, are digested
//! with BLAKE2b (see [content_digest]).
//!
//! The digest is independent of the order of keys in the source file and of
//! whether the file is binary or XML.
//!
//! # Getting Started
//!
//! The [Plist] type is your gateway to everything. It can be backed by a file,
//! in which case every access reflects the current file content, or by an
//! in-memory snapshot.
//!
//! [PlistSearch] finds plist files in a directory tree. [ProcessLookup]
//! implementations associate launch agent plists with running processes.
//!
//! This crate does not write plists.

pub mod canonical;
mod decode;
pub use decode::*;
mod hasher;
pub use hasher::*;
mod entity;
pub use entity::*;
mod error;
pub use error::*;
mod find;
pub use find::*;
mod metadata;
pub use metadata::*;
mod normalize;
pub use normalize::*;
pub mod process;
pub use process::{ProcessLookup, ProcessRecord, SystemProcessLookup};

#[cfg(test)]
mod testutil;
