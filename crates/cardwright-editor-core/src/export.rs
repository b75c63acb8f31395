//! PNG export of the live card preview.

use std::sync::LazyLock;

use cardwright_common::{Config, Store};
use miette::Diagnostic;
use thiserror::Error;

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
use regex::Regex;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
use regex_lite::Regex;

use crate::editor::{EditorState, ExportState};
use crate::inline::{InlineError, InlineOptions, inline_external_images};
use crate::platform::{DownloadSink, ImageFetcher, ImageRoot, PlatformError, RasterOptions, RasterSnapshot};

/// Shown to the user when an export fails for any reason.
pub const EXPORT_ERROR_MESSAGE: &str = "Не удалось экспортировать PNG. Попробуйте ещё раз.";

/// Used when the card has no title.
pub const DEFAULT_FILE_TITLE: &str = "карта";

const MAX_FILE_TITLE_CHARS: usize = 80;

static ILLEGAL_FILE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Inline(#[from] InlineError),

    #[error("raster snapshot failed")]
    #[diagnostic(code(export::snapshot))]
    Snapshot(#[source] PlatformError),

    #[error("download failed")]
    #[diagnostic(code(export::download))]
    Download(#[source] PlatformError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportOptions {
    pub inline: InlineOptions,
    pub raster: RasterOptions,
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            inline: InlineOptions {
                timeout: config.image_timeout(),
            },
            raster: RasterOptions {
                pixel_ratio: config.pixel_ratio,
                ..RasterOptions::default()
            },
        }
    }
}

/// Filesystem-safe form of a card title: trimmed (or [`DEFAULT_FILE_TITLE`]
/// when blank), runs of `\ / : * ? " < > |` replaced by `-`, whitespace
/// collapsed, at most 80 characters.
pub fn build_safe_file_name(title: &str) -> String {
    let trimmed = match title.trim() {
        "" => DEFAULT_FILE_TITLE,
        trimmed => trimmed,
    };
    let replaced = ILLEGAL_FILE_CHARS_RE.replace_all(trimmed, "-");
    let collapsed = WHITESPACE_RE.replace_all(&replaced, " ");
    collapsed.chars().take(MAX_FILE_TITLE_CHARS).collect()
}

/// `{safe title}-карта.png`
pub fn export_file_name(title: &str) -> String {
    format!("{}-карта.png", build_safe_file_name(title))
}

/// Inline images, snapshot `root`, and hand the PNG to `sink`.
///
/// The preview is restored before this returns, whether or not the
/// snapshot succeeded. Returns the downloaded file name.
pub async fn export_card_as_png<R, F, S, D>(
    root: &R,
    title: &str,
    fetcher: &F,
    snapshot: &S,
    sink: &D,
    options: &ExportOptions,
) -> Result<String, ExportError>
where
    R: ImageRoot,
    F: ImageFetcher,
    S: RasterSnapshot<R>,
    D: DownloadSink,
{
    // Early returns drop the guard, which restores the preview.
    let inlined = inline_external_images(root, fetcher, &options.inline).await?;

    let png = snapshot
        .to_png(root, &options.raster)
        .await
        .map_err(ExportError::Snapshot)?;

    let file_name = export_file_name(title);
    sink.download(&file_name, &png)
        .map_err(ExportError::Download)?;

    inlined.restore();
    Ok(file_name)
}

/// Clears the exporting flag when dropped.
struct ExportingFlag {
    state: Store<ExportState>,
}

impl ExportingFlag {
    fn raise(state: &Store<ExportState>) -> Self {
        state.update(|s| {
            s.is_exporting = true;
            s.export_error = None;
        });
        Self {
            state: state.clone(),
        }
    }
}

impl Drop for ExportingFlag {
    fn drop(&mut self) {
        self.state.update(|s| s.is_exporting = false);
    }
}

/// Exports the card currently open in the editor and reports the outcome
/// through [`ExportState`].
pub struct CardExporter<F, S, D> {
    fetcher: F,
    snapshot: S,
    sink: D,
    options: ExportOptions,
    editor: Store<EditorState>,
    export: Store<ExportState>,
}

impl<F, S, D> CardExporter<F, S, D>
where
    F: ImageFetcher,
    D: DownloadSink,
{
    pub fn new(
        fetcher: F,
        snapshot: S,
        sink: D,
        editor: Store<EditorState>,
        export: Store<ExportState>,
    ) -> Self {
        Self {
            fetcher,
            snapshot,
            sink,
            options: ExportOptions::default(),
            editor,
            export,
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn export_store(&self) -> &Store<ExportState> {
        &self.export
    }

    /// Export `root` under the current card title. Never fails: errors end
    /// up in [`ExportState::export_error`], and the exporting flag is
    /// cleared on every exit path.
    pub async fn export_current_card<R>(&self, root: &R)
    where
        R: ImageRoot,
        S: RasterSnapshot<R>,
    {
        let _flag = ExportingFlag::raise(&self.export);
        let title = self.editor.with_state(|s| s.card_fields.title.clone());

        match export_card_as_png(
            root,
            &title,
            &self.fetcher,
            &self.snapshot,
            &self.sink,
            &self.options,
        )
        .await
        {
            Ok(file_name) => tracing::info!(file_name = %file_name, "exported card"),
            Err(e) => {
                tracing::error!(error = ?e, "PNG export failed");
                self.export
                    .update(|s| s.export_error = Some(EXPORT_ERROR_MESSAGE.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::tests::{FakeFetcher, FakeImage, FakeRoot};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeSnapshot {
        fail: bool,
        /// `src` of every image at the moment of the snapshot.
        seen: RefCell<Vec<Option<String>>>,
    }

    impl RasterSnapshot<FakeRoot> for FakeSnapshot {
        async fn to_png(&self, root: &FakeRoot, options: &RasterOptions) -> Result<String, PlatformError> {
            assert_eq!(options.background_color, "transparent");
            *self.seen.borrow_mut() = root.images.iter().map(|img| img.get("src")).collect();
            if self.fail {
                return Err("canvas is tainted".into());
            }
            Ok("data:image/png;base64,iVBORw0KGgo=".to_string())
        }
    }

    #[derive(Default)]
    struct FakeSink {
        downloads: RefCell<Vec<(String, String)>>,
    }

    impl DownloadSink for FakeSink {
        fn download(&self, file_name: &str, href: &str) -> Result<(), PlatformError> {
            self.downloads
                .borrow_mut()
                .push((file_name.to_string(), href.to_string()));
            Ok(())
        }
    }

    fn root_with(images: &[&str]) -> FakeRoot {
        FakeRoot {
            images: images.iter().map(|src| FakeImage::with_src(src)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_safe_file_name() {
        assert_eq!(build_safe_file_name("  Школа   Знаний  "), "Школа Знаний");
        assert_eq!(build_safe_file_name("a/b\\c:*?d"), "a-b-c-d");
        assert_eq!(build_safe_file_name("\"<x>|\""), "-x-");
        assert_eq!(build_safe_file_name("   "), "карта");
        assert_eq!(build_safe_file_name(&"щ".repeat(100)).chars().count(), 80);
        assert_eq!(export_file_name(""), "карта-карта.png");
    }

    #[tokio::test]
    async fn test_snapshot_sees_inlined_images_then_preview_is_restored() {
        let root = root_with(&["https://a/1.png", "https://a/2.png"]);
        let snapshot = FakeSnapshot::default();
        let sink = FakeSink::default();

        let file_name = export_card_as_png(
            &root,
            "Эльф",
            &FakeFetcher::failing(&["https://a/2.png"]),
            &snapshot,
            &sink,
            &ExportOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(file_name, "Эльф-карта.png");
        let seen = snapshot.seen.borrow();
        assert_eq!(seen[0].as_deref(), Some("data:image/png;base64,https://a/1.png"));
        assert_eq!(
            seen[1].as_deref(),
            Some(crate::inline::EXPORT_PLACEHOLDER_IMAGE.as_str())
        );
        assert_eq!(root.images[0].get("src").as_deref(), Some("https://a/1.png"));
        assert_eq!(root.images[1].get("src").as_deref(), Some("https://a/2.png"));
        assert_eq!(
            *sink.downloads.borrow(),
            vec![(
                "Эльф-карта.png".to_string(),
                "data:image/png;base64,iVBORw0KGgo=".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_snapshot_failure_rolls_back_preview_and_flag() {
        let root = root_with(&["https://a/1.png"]);
        let editor = Store::new(EditorState::default());
        editor.update(|s| s.card_fields.title = "Эльф".to_string());
        let export = Store::new(ExportState::default());

        let exporter = CardExporter::new(
            FakeFetcher::default(),
            FakeSnapshot {
                fail: true,
                ..Default::default()
            },
            FakeSink::default(),
            editor,
            export.clone(),
        );

        let flags = std::rc::Rc::new(RefCell::new(Vec::new()));
        let sink = flags.clone();
        export.subscribe(move |s: &ExportState| sink.borrow_mut().push(s.is_exporting));

        exporter.export_current_card(&root).await;

        assert_eq!(root.images[0].get("src").as_deref(), Some("https://a/1.png"));
        let state = export.get_state();
        assert!(!state.is_exporting);
        assert_eq!(state.export_error.as_deref(), Some(EXPORT_ERROR_MESSAGE));
        assert_eq!(flags.borrow().first(), Some(&true));
        assert!(exporter.sink.downloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_successful_export_clears_previous_error() {
        let export = Store::new(ExportState {
            is_exporting: false,
            export_error: Some(EXPORT_ERROR_MESSAGE.to_string()),
        });
        let exporter = CardExporter::new(
            FakeFetcher::default(),
            FakeSnapshot::default(),
            FakeSink::default(),
            Store::new(EditorState::default()),
            export.clone(),
        );

        exporter.export_current_card(&root_with(&[])).await;

        assert_eq!(export.get_state(), ExportState::default());
        assert_eq!(exporter.sink.downloads.borrow()[0].0, "карта-карта.png");
    }

    #[tokio::test]
    async fn test_missing_root_reports_error() {
        let export = Store::new(ExportState::default());
        let exporter = CardExporter::new(
            FakeFetcher::default(),
            FakeSnapshot::default(),
            FakeSink::default(),
            Store::new(EditorState::default()),
            export.clone(),
        );
        let root = FakeRoot {
            missing: true,
            ..Default::default()
        };

        exporter.export_current_card(&root).await;
        assert_eq!(export.get_state().export_error.as_deref(), Some(EXPORT_ERROR_MESSAGE));
        assert!(!export.get_state().is_exporting);
    }
}
