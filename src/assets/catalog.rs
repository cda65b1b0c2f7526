//! # Default asset catalog.
//!
//! Resolves the per-stage asset bundle from [`WidgetConfig`]: built-in paths
//! under `{base}/webcomponents/v1/assets/`, enable/disable switches, and
//! per-key caller overrides (which always win).
//!
//! | Stage | Key | Required | Fallback |
//! |-------|-----|----------|----------|
//! | Hints | `hint-preconnect-base`, `hint-preconnect-cdn`, `hint-preload-*` | no | – |
//! | Css   | `main-css` | yes | – |
//! | Css   | `icons-css`, `theme-css` | no | – |
//! | Js    | `formio-js` | yes | CDN |
//! | Js    | `components-js` | yes | – |
//! | Fonts | `icons-neutralize` / `icons-inherit`, `font-primary` | no | – |

use super::descriptor::{AssetDescriptor, AssetKind};
use crate::config::WidgetConfig;

pub const MAIN_CSS: &str = "main-css";
pub const ICONS_CSS: &str = "icons-css";
pub const THEME_CSS: &str = "theme-css";
pub const FORMIO_JS: &str = "formio-js";
pub const COMPONENTS_JS: &str = "components-js";
pub const FONT_PRIMARY: &str = "font-primary";
pub const ICONS_NEUTRALIZE: &str = "icons-neutralize";
pub const ICONS_INHERIT: &str = "icons-inherit";

/// Global defined by the renderer script.
pub const FORMIO_GLOBAL: &str = "Formio";
/// Global defined by the custom components script.
pub const COMPONENTS_GLOBAL: &str = "BcGovFormioComponents";

const FORMIO_CDN: &str = "https://cdn.form.io/formiojs/formio.form.min.js";
const CDN_ORIGIN: &str = "https://cdn.form.io";

pub(crate) const NEUTRALIZE_ICONS_CSS: &str =
    ".fa,[class^=\"fa-\"],[class*=\" fa-\"],.bi{display:none!important}";
pub(crate) const INHERIT_ICON_COLOR_CSS: &str =
    ".fa,[class^=\"fa-\"],[class*=\" fa-\"],.bi{color:inherit}";

/// Asset bundle for one load cycle.
#[derive(Debug, Clone)]
pub struct StagePlan {
    pub hints: Vec<AssetDescriptor>,
    pub css: Vec<AssetDescriptor>,
    pub js: Vec<AssetDescriptor>,
    pub font_preload: Option<AssetDescriptor>,
    /// `false` when the host disabled icons.
    pub icons_enabled: bool,
}

impl StagePlan {
    /// Resolves the bundle from defaults merged with caller overrides.
    pub fn from_config(cfg: &WidgetConfig) -> Self {
        let switches = &cfg.assets;
        let with_override = |d: AssetDescriptor| {
            match cfg.asset_overrides.get(&d.key) {
                Some(o) => d.overridden(o.primary.as_deref(), o.fallback.as_deref()),
                None => d,
            }
        };

        let main_css = with_override(
            AssetDescriptor::new(MAIN_CSS, AssetKind::Style, cfg.asset_url("css/form-viewer.css")).required(),
        );
        let formio_js = with_override(
            AssetDescriptor::new(FORMIO_JS, AssetKind::Script, cfg.asset_url("js/formio.form.min.js"))
                .required()
                .with_fallback(FORMIO_CDN)
                .provides_global(FORMIO_GLOBAL),
        );
        let components_js = with_override(
            AssetDescriptor::new(
                COMPONENTS_JS,
                AssetKind::Script,
                cfg.asset_url("js/bcgov-formio-components.use.min.js"),
            )
            .required()
            .provides_global(COMPONENTS_GLOBAL),
        );

        let mut hints = Vec::new();
        if switches.hints {
            hints.push(AssetDescriptor::new(
                "hint-preconnect-base",
                AssetKind::Preconnect,
                cfg.base_url.clone(),
            ));
            hints.push(AssetDescriptor::new("hint-preconnect-cdn", AssetKind::Preconnect, CDN_ORIGIN));
            hints.push(AssetDescriptor::new(
                "hint-preload-main-css",
                AssetKind::Preload,
                main_css.primary_url.clone(),
            ));
            hints.push(AssetDescriptor::new(
                "hint-preload-formio-js",
                AssetKind::Preload,
                formio_js.primary_url.clone(),
            ));
        }

        let mut css = vec![main_css];
        if switches.icons {
            css.push(with_override(AssetDescriptor::new(
                ICONS_CSS,
                AssetKind::Style,
                cfg.asset_url("css/font-awesome.min.css"),
            )));
        }
        if switches.theme {
            css.push(with_override(AssetDescriptor::new(
                THEME_CSS,
                AssetKind::Style,
                cfg.asset_url("css/theme.css"),
            )));
        }

        let font_preload = (switches.icons && switches.font_preload).then(|| {
            with_override(AssetDescriptor::new(
                FONT_PRIMARY,
                AssetKind::Font,
                cfg.asset_url("fonts/fontawesome-webfont.woff2"),
            ))
        });

        Self {
            hints,
            css,
            js: vec![formio_js, components_js],
            font_preload,
            icons_enabled: switches.icons,
        }
    }
}
