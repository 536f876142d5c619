/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Interactive filtered-graph exploration engine for comorbidity networks.
//!
//! The crate keeps one displayed graph per active view and drives its
//! visibility through three cooperating pieces:
//! - `filter`: attribute predicates composed into a hidden set
//! - `highlight`: closed-neighborhood isolation around a selection
//! - `history`: back/forward navigation across view activations
//!
//! Data comes from view providers (`views`) that share an explicit
//! load-once repository of raw collections.

pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod highlight;
pub mod history;
pub mod layout;
pub mod search;
pub mod session;
pub mod stats;
pub mod util;
pub mod view_state;
pub mod views;

pub use error::{ConfigError, LoadError};
pub use graph::{Edge, ElementSet, GraphStore, HiddenHandle, Node, Scope};
pub use history::{CompletedLoad, HistoryEntry, HistoryManager, LoadOutcome, PendingLoad};
pub use session::{ExplorerSession, NextViewRequest};
pub use view_state::{ParamValue, Parameters, ViewState};
