//! # Asset loading.
//!
//! Everything the renderer needs before it can be instantiated: styles, scripts,
//! hints and fonts, loaded stage by stage into a host [`Scope`].
//!
//! ## Contents
//! - [`AssetDescriptor`], [`AssetKind`] what to load and from where
//! - [`StagePlan`] per-stage bundle resolved from `WidgetConfig`
//! - [`AssetFetcher`] one asset: timeout, classification, fallback
//! - [`Orchestrator`] the `Idle → … → Ready` stage machine
//! - [`ResourceRegistry`], [`Scope`], [`MemoryScope`] where resources end up
//! - [`LoadState`], [`LoadResult`], [`ResultLog`] progress and outcomes

mod catalog;
mod descriptor;
mod fetcher;
mod orchestrator;
mod registry;
mod scope;
mod state;

pub use catalog::{
    COMPONENTS_GLOBAL, COMPONENTS_JS, FONT_PRIMARY, FORMIO_GLOBAL, FORMIO_JS, ICONS_CSS, ICONS_INHERIT,
    ICONS_NEUTRALIZE, MAIN_CSS, StagePlan, THEME_CSS,
};
pub use descriptor::{AssetDescriptor, AssetKind, Validator};
pub use fetcher::AssetFetcher;
pub use orchestrator::{AssetReport, Orchestrator};
pub use registry::{Insertion, ResourceRegistry};
pub use scope::{MemoryScope, Resource, ResourceKind, Scope};
pub use state::{LoadResult, LoadState, ResultLog};
