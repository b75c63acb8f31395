//! cardwright-editor-core: card editing logic without framework dependencies.
//!
//! This crate provides:
//! - the card type registry and [`CardFields`], the editable field set
//! - [`derive_fields`], which projects a catalog card onto that field set
//! - [`CardEditor`] and [`TemplateBrowser`], state transitions over [`Store`]s
//! - image inlining and PNG export, generic over the [`platform`] traits
//!
//! [`Store`]: cardwright_common::Store

pub mod builder;
pub mod card_types;
pub mod constants;
pub mod editor;
pub mod export;
pub mod inline;
pub mod platform;
pub mod templates;

pub use builder::{DerivedFields, derive_fields};
pub use card_types::{
    CARD_TYPE_LIST, CardField, CardFields, CardTypeConfig, CardTypeId, DEFAULT_CARD_TYPE_ID,
    card_type_config,
};
pub use editor::{AssetPrefetcher, CardEditor, EditorState, ExportState};
pub use export::{
    CardExporter, EXPORT_ERROR_MESSAGE, ExportError, ExportOptions, build_safe_file_name,
    export_card_as_png, export_file_name,
};
pub use inline::{
    EXPORT_PLACEHOLDER_IMAGE, InlineError, InlineOptions, InlinedImages, inline_external_images,
};
pub use platform::{
    AssetPrefetch, DownloadSink, ImageElement, ImageFetcher, ImageRoot, PlatformError,
    RasterOptions, RasterSnapshot,
};
pub use templates::{TemplateBrowser, TemplateGroupView, TemplateSource, TemplatesState};
