//! The thumbnail overlay attached to a player's progress bar.
//!
//! All DOM work goes through [`Host`]; the overlay only decides what to do.
//! Loading the cue file is left to the host as well: after [`Overlay::attach`]
//! or [`Overlay::set_source`], fetch [`Overlay::pending_source`] and hand the
//! text back through [`Overlay::source_loaded`].

use crate::cue::CueDescriptor;
use crate::error::Result;
use crate::lookup::{active_cue, offset_for_style, PreloadCache};
use crate::parser::{MissingImagePolicy, Parser};
use crate::resolver::resolve;
use crate::sprite::StyleDescriptor;

use serde::Deserialize;
use tracing::{debug, info, warn};

pub const PLAYER_CLASS: &str = "vjs-vtt-thumbnails";
pub const HOLDER_CLASS: &str = "vjs-vtt-thumbnail-display";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub src: Option<String>,
    /// Keep the player's own time tooltip visible next to the thumbnail.
    pub show_timestamp: bool,
    pub missing_image: MissingImagePolicy,
}

impl Options {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarEvent {
    MouseEnter,
    MouseLeave,
    MouseMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

pub trait Host {
    /// Playback duration in seconds.
    fn duration(&self) -> f64;
    fn bar_width(&self) -> f64;
    /// Width of the holder when the style does not set one, e.g. the natural
    /// width of a full image.
    fn holder_width(&self) -> u32;

    fn add_player_class(&mut self, class: &str);
    fn hide_mouse_display(&mut self);

    fn mount_holder(&mut self, class: &str);
    fn unmount_holder(&mut self);

    fn listen(&mut self, event: BarEvent) -> ListenerId;
    fn unlisten(&mut self, id: ListenerId);

    fn set_offset(&mut self, px: f64);
    fn set_visible(&mut self, visible: bool);
    fn apply_style(&mut self, style: &StyleDescriptor);
}

#[derive(Debug, Default)]
struct Listeners {
    enter: Option<ListenerId>,
    leave: Option<ListenerId>,
    moves: Option<ListenerId>,
}

pub struct Overlay<H, C> {
    host: H,
    cache: C,
    options: Options,
    page_base: String,
    parser: Parser,
    pending: Option<String>,
    cues: Vec<CueDescriptor>,
    mounted: bool,
    visible: bool,
    listeners: Listeners,
    last_style: Option<usize>,
}

impl<H: Host, C: PreloadCache> Overlay<H, C> {
    /// Attaches to a ready player. `page_base` is the directory of the hosting page.
    pub fn attach(mut host: H, cache: C, options: Options, page_base: &str) -> Result<Self> {
        let parser = Parser::new(options.missing_image)?;
        host.add_player_class(PLAYER_CLASS);

        let mut overlay = Self {
            host,
            cache,
            options,
            page_base: page_base.to_string(),
            parser,
            pending: None,
            cues: Vec::new(),
            mounted: false,
            visible: false,
            listeners: Listeners::default(),
            last_style: None,
        };
        overlay.initialize();
        Ok(overlay)
    }

    pub fn pending_source(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn cues(&self) -> &[CueDescriptor] {
        &self.cues
    }

    pub fn is_ready(&self) -> bool {
        self.mounted
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Installs the fetched cue file and sets up the thumbnail holder.
    ///
    /// Returns the number of cues installed. Text for any address other than
    /// the pending one is stale and ignored.
    pub fn source_loaded(&mut self, url: &str, text: &str) -> Result<usize> {
        if self.pending.as_deref() != Some(url) {
            warn!(url, "ignoring cue file that is no longer the current source");
            return Ok(0);
        }
        self.pending = None;

        let cue_source = self.options.src.as_deref().unwrap_or(url);
        let outcome = self.parser.parse(text, cue_source, &self.page_base)?;
        info!(
            url,
            cues = outcome.cues.len(),
            skipped = outcome.skipped.len(),
            "loaded thumbnail cues"
        );
        self.cues = outcome.cues;
        self.setup_holder();
        Ok(self.cues.len())
    }

    /// Reports that fetching the pending cue file failed. The overlay stays inert.
    pub fn source_failed(&mut self, url: &str, reason: &str) {
        if self.pending.as_deref() == Some(url) {
            self.pending = None;
        }
        warn!(url, reason, "failed to load thumbnail cues");
    }

    pub fn set_source(&mut self, src: &str) {
        self.reset();
        self.options.src = Some(src.to_string());
        self.initialize();
    }

    pub fn detach(&mut self) {
        self.reset();
    }

    pub fn on_mouse_enter(&mut self) {
        if !self.mounted {
            return;
        }
        if self.listeners.moves.is_none() {
            self.listeners.moves = Some(self.host.listen(BarEvent::MouseMove));
        }
        self.show();
    }

    pub fn on_mouse_leave(&mut self) {
        if let Some(id) = self.listeners.moves.take() {
            self.host.unlisten(id);
        }
        if self.mounted {
            self.hide();
        }
    }

    /// Updates the thumbnail for a pointer at `percent` (0.0 to 1.0) of the bar.
    pub fn on_mouse_move(&mut self, percent: f64) {
        if !self.mounted {
            return;
        }
        let time = percent * self.host.duration();
        let idx = match active_cue(&self.cues, time, &mut self.cache) {
            Some(idx) => idx,
            None => return self.hide(),
        };

        let offset = offset_for_style(
            &self.cues[idx].style,
            percent,
            self.host.bar_width(),
            self.host.holder_width(),
        );
        self.host.set_offset(offset);
        self.show();

        if self.last_style == Some(idx) {
            return;
        }
        self.last_style = Some(idx);
        self.host.apply_style(&self.cues[idx].style);
    }

    fn initialize(&mut self) {
        if let Some(src) = self.options.src.as_deref().filter(|src| !src.trim().is_empty()) {
            let url = resolve(src, &self.page_base);
            debug!(url = url.as_str(), "waiting for thumbnail cues");
            self.pending = Some(url);
        }
    }

    fn setup_holder(&mut self) {
        if !self.options.show_timestamp {
            self.host.hide_mouse_display();
        }
        self.host.mount_holder(HOLDER_CLASS);
        self.mounted = true;
        self.listeners.enter = Some(self.host.listen(BarEvent::MouseEnter));
        self.listeners.leave = Some(self.host.listen(BarEvent::MouseLeave));
    }

    fn reset(&mut self) {
        if self.mounted {
            self.host.unmount_holder();
        }
        let listeners = std::mem::take(&mut self.listeners);
        for id in [listeners.enter, listeners.leave, listeners.moves]
            .iter()
            .flatten()
        {
            self.host.unlisten(*id);
        }
        self.pending = None;
        self.cues.clear();
        self.mounted = false;
        self.visible = false;
        self.last_style = None;
    }

    fn show(&mut self) {
        if !self.visible {
            self.visible = true;
            self.host.set_visible(true);
        }
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.host.set_visible(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThumbnailError;

    use std::collections::{HashMap, HashSet};

    const PAGE: &str = "https://site.example.com/watch/";
    const CUES: &str = "WEBVTT\n\n\
        00:00.000 --> 00:10.000\n\
        sprite.jpg#xywh=0,0,100,50\n\n\
        00:10.000 --> 00:20.000\n\
        sprite.jpg#xywh=100,0,100,50\n\n\
        00:30.000 --> 00:40.000\n\
        poster.jpg\n";

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        PlayerClass(String),
        HideMouseDisplay,
        Mount(String),
        Unmount,
        Offset(f64),
        Visible(bool),
        Style(String),
    }

    #[derive(Default)]
    struct FakeHost {
        calls: Vec<Call>,
        listeners: HashMap<ListenerId, BarEvent>,
        next_id: u64,
    }

    impl FakeHost {
        fn listening(&self, event: BarEvent) -> usize {
            self.listeners.values().filter(|e| **e == event).count()
        }

        fn styles(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Style(_)))
                .count()
        }
    }

    impl Host for FakeHost {
        fn duration(&self) -> f64 {
            40.0
        }

        fn bar_width(&self) -> f64 {
            400.0
        }

        fn holder_width(&self) -> u32 {
            120
        }

        fn add_player_class(&mut self, class: &str) {
            self.calls.push(Call::PlayerClass(class.to_string()));
        }

        fn hide_mouse_display(&mut self) {
            self.calls.push(Call::HideMouseDisplay);
        }

        fn mount_holder(&mut self, class: &str) {
            self.calls.push(Call::Mount(class.to_string()));
        }

        fn unmount_holder(&mut self) {
            self.calls.push(Call::Unmount);
        }

        fn listen(&mut self, event: BarEvent) -> ListenerId {
            self.next_id += 1;
            let id = ListenerId(self.next_id);
            self.listeners.insert(id, event);
            id
        }

        fn unlisten(&mut self, id: ListenerId) {
            self.listeners.remove(&id);
        }

        fn set_offset(&mut self, px: f64) {
            self.calls.push(Call::Offset(px));
        }

        fn set_visible(&mut self, visible: bool) {
            self.calls.push(Call::Visible(visible));
        }

        fn apply_style(&mut self, style: &StyleDescriptor) {
            self.calls.push(Call::Style(style.background()));
        }
    }

    fn options(src: &str) -> Options {
        Options {
            src: Some(src.to_string()),
            ..Options::default()
        }
    }

    fn loaded(options: Options) -> Overlay<FakeHost, HashSet<String>> {
        let mut overlay =
            Overlay::attach(FakeHost::default(), HashSet::<String>::new(), options, PAGE).unwrap();
        let url = overlay.pending_source().unwrap().to_string();
        overlay.source_loaded(&url, CUES).unwrap();
        overlay
    }

    #[test]
    fn attach_without_source_stays_idle() {
        let overlay =
            Overlay::attach(FakeHost::default(), HashSet::<String>::new(), Options::default(), PAGE)
                .unwrap();

        assert_eq!(overlay.pending_source(), None);
        assert!(!overlay.is_ready());
        assert_eq!(
            overlay.host().calls,
            vec![Call::PlayerClass(PLAYER_CLASS.to_string())]
        );
    }

    #[test]
    fn empty_source_stays_idle() {
        let options = Options::from_json(r#"{"src": ""}"#).unwrap();
        let mut overlay =
            Overlay::attach(FakeHost::default(), HashSet::<String>::new(), options, PAGE)
                .unwrap();
        assert_eq!(overlay.pending_source(), None);

        overlay.set_source("a.vtt");
        overlay.set_source("  ");
        assert_eq!(overlay.pending_source(), None);
        assert!(!overlay.is_ready());
    }

    #[test]
    fn loading_source_mounts_holder() {
        let mut overlay = Overlay::attach(
            FakeHost::default(),
            HashSet::<String>::new(),
            options("thumbs/cues.vtt"),
            PAGE,
        )
        .unwrap();
        assert_eq!(
            overlay.pending_source(),
            Some("https://site.example.com/watch/thumbs/cues.vtt")
        );

        let count = overlay
            .source_loaded("https://site.example.com/watch/thumbs/cues.vtt", CUES)
            .unwrap();

        assert_eq!(count, 3);
        assert!(overlay.is_ready());
        assert_eq!(overlay.pending_source(), None);
        assert_eq!(
            overlay.cues()[0].style.preload_url(),
            Some("https://site.example.com/watch/thumbs/sprite.jpg")
        );
        assert!(overlay.host().calls.contains(&Call::HideMouseDisplay));
        assert!(overlay
            .host()
            .calls
            .contains(&Call::Mount(HOLDER_CLASS.to_string())));
        assert_eq!(overlay.host().listening(BarEvent::MouseEnter), 1);
        assert_eq!(overlay.host().listening(BarEvent::MouseLeave), 1);
        assert_eq!(overlay.host().listening(BarEvent::MouseMove), 0);
    }

    #[test]
    fn show_timestamp_keeps_mouse_display() {
        let overlay = loaded(Options {
            show_timestamp: true,
            ..options("cues.vtt")
        });

        assert!(!overlay.host().calls.contains(&Call::HideMouseDisplay));
    }

    #[test]
    fn stale_load_is_ignored() {
        let mut overlay =
            Overlay::attach(FakeHost::default(), HashSet::<String>::new(), options("a.vtt"), PAGE).unwrap();
        overlay.set_source("b.vtt");

        let count = overlay
            .source_loaded("https://site.example.com/watch/a.vtt", CUES)
            .unwrap();

        assert_eq!(count, 0);
        assert!(!overlay.is_ready());
        assert_eq!(
            overlay.pending_source(),
            Some("https://site.example.com/watch/b.vtt")
        );
    }

    #[test]
    fn failed_load_leaves_overlay_inert() {
        let mut overlay =
            Overlay::attach(FakeHost::default(), HashSet::<String>::new(), options("a.vtt"), PAGE).unwrap();
        overlay.source_failed("https://site.example.com/watch/a.vtt", "404 Not Found");

        assert_eq!(overlay.pending_source(), None);
        overlay.on_mouse_enter();
        overlay.on_mouse_move(0.5);
        assert_eq!(overlay.host().calls.len(), 1);
    }

    #[test]
    fn enter_and_leave_manage_move_listener() {
        let mut overlay = loaded(options("cues.vtt"));

        overlay.on_mouse_enter();
        overlay.on_mouse_enter();
        assert_eq!(overlay.host().listening(BarEvent::MouseMove), 1);
        assert_eq!(overlay.host().calls.last(), Some(&Call::Visible(true)));

        overlay.on_mouse_leave();
        assert_eq!(overlay.host().listening(BarEvent::MouseMove), 0);
        assert_eq!(overlay.host().calls.last(), Some(&Call::Visible(false)));
    }

    #[test]
    fn moving_positions_and_paints_once_per_cue() {
        let mut overlay = loaded(options("cues.vtt"));
        overlay.on_mouse_enter();

        overlay.on_mouse_move(0.0);
        overlay.on_mouse_move(0.1);
        overlay.on_mouse_move(0.2);
        assert_eq!(overlay.host().styles(), 1);
        assert_eq!(overlay.host().calls.last(), Some(&Call::Offset(30.0)));

        overlay.on_mouse_move(0.3);
        assert_eq!(overlay.host().styles(), 2);
        assert_eq!(
            overlay.host().calls.last(),
            Some(&Call::Style(
                "url(\"https://site.example.com/watch/sprite.jpg\") no-repeat -100px -0px"
                    .to_string()
            ))
        );
    }

    #[test]
    fn gap_between_cues_hides_thumbnail() {
        let mut overlay = loaded(options("cues.vtt"));
        overlay.on_mouse_enter();

        overlay.on_mouse_move(0.6);
        assert_eq!(overlay.host().calls.last(), Some(&Call::Visible(false)));

        overlay.on_mouse_move(0.1);
        assert!(overlay.host().calls.contains(&Call::Offset(0.0)));
        assert_eq!(
            overlay
                .host()
                .calls
                .iter()
                .filter(|c| **c == Call::Visible(true))
                .count(),
            2
        );
    }

    #[test]
    fn full_image_uses_holder_width() {
        let mut overlay = loaded(options("cues.vtt"));
        overlay.on_mouse_enter();

        overlay.on_mouse_move(0.99);

        assert!(overlay.host().calls.contains(&Call::Offset(280.0)));
        assert_eq!(
            overlay.host().calls.last(),
            Some(&Call::Style(
                "url(\"https://site.example.com/watch/poster.jpg\")".to_string()
            ))
        );
        assert!(!overlay
            .cache()
            .contains("https://site.example.com/watch/poster.jpg"));
    }

    #[test]
    fn moves_warm_the_preload_cache() {
        let mut overlay = loaded(options("cues.vtt"));
        overlay.on_mouse_enter();

        overlay.on_mouse_move(0.1);
        overlay.on_mouse_move(0.4);

        assert_eq!(overlay.cache().len(), 1);
        assert!(overlay
            .cache()
            .contains("https://site.example.com/watch/sprite.jpg"));
    }

    #[test]
    fn set_source_detaches_before_reloading() {
        let mut overlay = loaded(options("cues.vtt"));
        overlay.on_mouse_enter();
        overlay.on_mouse_move(0.1);

        overlay.set_source("//cdn.example.com/other.vtt");

        assert!(overlay.host().listeners.is_empty());
        assert!(overlay.host().calls.contains(&Call::Unmount));
        assert!(overlay.cues().is_empty());
        assert_eq!(overlay.pending_source(), Some("//cdn.example.com/other.vtt"));

        overlay
            .source_loaded("//cdn.example.com/other.vtt", CUES)
            .unwrap();
        assert_eq!(overlay.host().listeners.len(), 2);
        assert_eq!(
            overlay.cues()[2].style,
            StyleDescriptor::FullImage {
                url: "//cdn.example.com/poster.jpg".to_string()
            }
        );
    }

    #[test]
    fn detach_removes_everything() {
        let mut overlay = loaded(options("cues.vtt"));
        overlay.on_mouse_enter();

        overlay.detach();
        overlay.on_mouse_move(0.1);

        assert!(overlay.host().listeners.is_empty());
        assert!(!overlay.is_ready());
        assert_eq!(overlay.host().calls.last(), Some(&Call::Unmount));
    }

    #[test]
    fn strict_policy_rejects_incomplete_file() {
        let mut overlay = Overlay::attach(
            FakeHost::default(),
            HashSet::<String>::new(),
            Options {
                missing_image: MissingImagePolicy::Error,
                ..options("cues.vtt")
            },
            PAGE,
        )
        .unwrap();

        let err = overlay
            .source_loaded(
                "https://site.example.com/watch/cues.vtt",
                "00:00 --> 00:05\n\n00:05 --> 00:10\na.jpg",
            )
            .unwrap_err();

        assert!(matches!(err, ThumbnailError::MissingImage { block: 0 }));
        assert!(!overlay.is_ready());
    }

    #[test]
    fn options_from_json() {
        let options =
            Options::from_json(r#"{"src": "thumbs.vtt", "showTimestamp": true, "missingImage": "error"}"#)
                .unwrap();

        assert_eq!(
            options,
            Options {
                src: Some("thumbs.vtt".to_string()),
                show_timestamp: true,
                missing_image: MissingImagePolicy::Error,
            }
        );
        assert_eq!(Options::from_json("{}").unwrap(), Options::default());
        assert!(Options::from_json(r#"{"missingImage": "maybe"}"#).is_err());
    }
}
