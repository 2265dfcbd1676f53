//! Typed command flags: parsing argument lists into flag values and
//! suggesting what may be typed next.
#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;

pub mod completion;
pub mod config;
pub mod creator;
pub mod error;
pub mod flag;
pub mod group;
pub mod manager;
pub mod result;

pub use crate::completion::{CompletionBuilder, CompletionProvider};
pub use crate::creator::{NumberCreator, SwitchCreator, ValueCreator};
pub use crate::error::{describe, FlagParseError, GroupError};
pub use crate::flag::{Flag, FlagKind, FlagType, Variant};
pub use crate::group::{FlagGroup, FlagGroupBuilder, FlagInfo, FlagKey, GroupId};
pub use crate::manager::FlagGroupManager;
pub use crate::result::{FlagResult, FlagResultBuilder, Source};
