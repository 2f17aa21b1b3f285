// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — wires the backend crates into the running daemon.
//
// `pipeline` handles one file from archive to cleanup; `watcher` feeds it
// arrivals from the watch directory one at a time.

pub mod integrity;
pub mod layout;
pub mod pipeline;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;
