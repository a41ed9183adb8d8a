//! HTML surface: the slider markup a browser host would receive.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{AuthorView, RenderSurface};
use crate::carousel::controller::CarouselController;
use crate::carousel::error::{CarouselError, CarouselResult};
use crate::carousel::progress::ProgressMarker;
use crate::carousel::scheduler::ManualScheduler;
use crate::config::CarouselConfig;
use crate::story::markup::Document;
use crate::story::StoryCollection;

/// Shown when a story has no avatar.
pub const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/30x30";

/// Surface state, serialized on demand by [`HtmlSurface::to_markup`].
#[derive(Debug, Clone, Default)]
pub struct HtmlSurface {
    width: u16,
    mounted: bool,
    image: Option<String>,
    author: AuthorView,
    markers: Vec<ProgressMarker>,
}

impl HtmlSurface {
    /// `width` is the host's width in layout units; taps split at half.
    pub fn new(width: u16) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn author(&self) -> &AuthorView {
        &self.author
    }

    pub fn markers(&self) -> &[ProgressMarker] {
        &self.markers
    }

    /// Render the slider markup. Empty once unmounted.
    pub fn to_markup(&self) -> CarouselResult<String> {
        if !self.mounted {
            return Ok(String::new());
        }

        let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
        open(&mut w, "div", &[("class", "slider")])?;
        open(&mut w, "div", &[("class", "slider__container")])?;

        let background = format!("background-image: url({})", self.image.as_deref().unwrap_or(""));
        open(
            &mut w,
            "div",
            &[("class", "slider__storie"), ("style", background.as_str())],
        )?;

        open(&mut w, "div", &[("class", "slider__navbar")])?;
        for (i, marker) in self.markers.iter().enumerate() {
            self.write_marker(&mut w, i, marker)?;
        }
        close(&mut w, "div")?;

        open(&mut w, "div", &[("class", "slider__info")])?;
        button(&mut w, "slider__exit", "Back")?;
        self.write_author(&mut w)?;
        button(&mut w, "slider__options", "Options")?;
        close(&mut w, "div")?;

        close(&mut w, "div")?; // slider__storie
        close(&mut w, "div")?; // slider__container
        close(&mut w, "div")?; // slider

        String::from_utf8(w.into_inner()).map_err(|e| CarouselError::Markup(e.to_string()))
    }

    fn write_marker(
        &self,
        w: &mut Writer<Vec<u8>>,
        i: usize,
        marker: &ProgressMarker,
    ) -> CarouselResult<()> {
        let index = i.to_string();
        match *marker {
            ProgressMarker::Neutral => open(
                w,
                "div",
                &[("class", "slider__navbar__item"), ("data-index", index.as_str())],
            )?,
            ProgressMarker::Completed => open(
                w,
                "div",
                &[
                    ("class", "slider__navbar__item completed"),
                    ("data-index", index.as_str()),
                ],
            )?,
            ProgressMarker::Current {
                duration_ms,
                paused,
                ..
            } => {
                let state = if paused { "paused" } else { "running" };
                let style =
                    format!("animation-duration: {duration_ms}ms; animation-play-state: {state}");
                open(
                    w,
                    "div",
                    &[
                        ("class", "slider__navbar__item current"),
                        ("data-index", index.as_str()),
                        ("style", style.as_str()),
                    ],
                )?
            }
        }
        close(w, "div")
    }

    fn write_author(&self, w: &mut Writer<Vec<u8>>) -> CarouselResult<()> {
        let avatar = self.author.avatar.as_deref().unwrap_or(PLACEHOLDER_AVATAR);
        open(w, "div", &[("class", "slider__author")])?;
        empty(w, "img", &[("src", avatar), ("alt", "")])?;
        open(w, "div", &[])?;
        text_element(w, "span", &self.author.name)?;
        text_element(w, "p", self.author.time_ago.as_deref().unwrap_or(""))?;
        close(w, "div")?;
        close(w, "div")
    }
}

impl RenderSurface for HtmlSurface {
    fn mount(&mut self, slots: usize) {
        self.mounted = true;
        self.markers = vec![ProgressMarker::Neutral; slots];
    }

    fn show_image(&mut self, uri: &str) {
        self.image = Some(uri.to_string());
    }

    fn show_author(&mut self, author: &AuthorView) {
        self.author = author.clone();
    }

    fn show_progress(&mut self, markers: &[ProgressMarker]) {
        self.markers = markers.to_vec();
    }

    fn midline(&self) -> u16 {
        self.width / 2
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.image = None;
        self.author = AuthorView::default();
        self.markers.clear();
    }
}

/// Mount a carousel on an HTML surface and return its initial markup.
///
/// A carousel that fails to mount yields its first diagnostic as the error.
pub fn snapshot(
    config: &CarouselConfig,
    host: Option<&Document>,
    stories: Option<StoryCollection>,
    width: u16,
) -> CarouselResult<String> {
    let carousel = CarouselController::mount(
        config,
        host,
        stories,
        HtmlSurface::new(width),
        ManualScheduler::new(),
    );
    if !carousel.is_running() {
        return Err(carousel
            .diagnostics()
            .first()
            .cloned()
            .unwrap_or(CarouselError::NoStories));
    }
    carousel.surface().to_markup()
}

fn emit(w: &mut Writer<Vec<u8>>, event: Event<'_>) -> CarouselResult<()> {
    w.write_event(event)
        .map_err(|e| CarouselError::Markup(e.to_string()))
}

fn open(w: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> CarouselResult<()> {
    let mut start = BytesStart::new(name);
    for attr in attrs {
        start.push_attribute(*attr);
    }
    emit(w, Event::Start(start))
}

fn empty(w: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> CarouselResult<()> {
    let mut start = BytesStart::new(name);
    for attr in attrs {
        start.push_attribute(*attr);
    }
    emit(w, Event::Empty(start))
}

fn close(w: &mut Writer<Vec<u8>>, name: &str) -> CarouselResult<()> {
    emit(w, Event::End(BytesEnd::new(name)))
}

fn text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> CarouselResult<()> {
    open(w, name, &[])?;
    emit(w, Event::Text(BytesText::new(text)))?;
    close(w, name)
}

fn button(w: &mut Writer<Vec<u8>>, block: &str, label: &str) -> CarouselResult<()> {
    let button_class = format!("{block}__button");
    open(w, "div", &[("class", block)])?;
    open(w, "button", &[("class", button_class.as_str())])?;
    emit(w, Event::Text(BytesText::new(label)))?;
    close(w, "button")?;
    close(w, "div")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> HtmlSurface {
        let mut surface = HtmlSurface::new(400);
        surface.mount(3);
        surface.show_image("https://cdn.example/1.jpg");
        surface.show_author(&AuthorView {
            name: "Ana & Ben".into(),
            avatar: None,
            time_ago: Some("2 hours ago".into()),
            group: None,
        });
        surface.show_progress(&[
            ProgressMarker::Completed,
            ProgressMarker::Current {
                duration_ms: 3000,
                elapsed_ms: 0,
                paused: true,
            },
            ProgressMarker::Neutral,
        ]);
        surface
    }

    #[test]
    fn markup_structure() {
        let markup = mounted().to_markup().unwrap();
        assert!(markup.contains(r#"<div class="slider__storie" style="#));
        assert!(markup.contains(r#"style="background-image: url(https://cdn.example/1.jpg)">"#));
        assert!(markup.contains(r#"class="slider__navbar__item completed" data-index="0""#));
        assert!(markup.contains(
            r#"style="animation-duration: 3000ms; animation-play-state: paused""#
        ));
        assert!(markup.contains(r#"<div class="slider__navbar__item" data-index="2">"#));
        assert!(markup.contains("slider__exit__button"));
        assert!(markup.contains("slider__options__button"));
        assert!(markup.contains("<p>2 hours ago</p>"));
        assert!(markup.contains(PLACEHOLDER_AVATAR));
    }

    #[test]
    fn author_text_is_escaped() {
        let markup = mounted().to_markup().unwrap();
        assert!(markup.contains("<span>Ana &amp; Ben</span>"));
    }

    #[test]
    fn markup_reparses_into_one_marker_per_slot() {
        let markup = mounted().to_markup().unwrap();
        let doc = Document::parse(&markup).unwrap();
        assert_eq!(doc.root().select_all(".slider__navbar__item").len(), 3);
        assert_eq!(doc.root().select_all(".current").len(), 1);
    }

    #[test]
    fn unmount_empties_markup() {
        let mut surface = mounted();
        surface.unmount();
        assert!(!surface.is_mounted());
        assert_eq!(surface.to_markup().unwrap(), "");
    }

    #[test]
    fn midline_is_half_width() {
        assert_eq!(HtmlSurface::new(401).midline(), 200);
    }
}
