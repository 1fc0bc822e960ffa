use once_cell::sync::Lazy;
use slotmap::{SlotMap, new_key_type};
use smol_str::SmolStr;
use std::cell::RefCell;
use std::rc::Rc;
use unicode_width::UnicodeWidthChar;

use super::core::ElementCore;
use super::element::Element;
use super::style::LayoutStyle;
use crate::geometry::Size;

new_key_type! {
    pub struct FontKey;
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: SmolStr,
    pub size: f32,
    pub weight: u16,
    pub line_height: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: SmolStr::new_static("sans-serif"),
            size: 16.0,
            weight: 400,
            line_height: 1.25,
        }
    }
}

/// Arena of font descriptions shared by the text elements of one tree.
/// Keys are released when the owning element is disposed.
#[derive(Default)]
pub struct FontCache {
    fonts: SlotMap<FontKey, FontSpec>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: FontSpec) -> FontKey {
        self.fonts.insert(spec)
    }

    pub fn get(&self, key: FontKey) -> Option<&FontSpec> {
        self.fonts.get(key)
    }

    pub fn release(&mut self, key: FontKey) -> bool {
        self.fonts.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Externally supplied text measurement, keyed by font, content and the
/// width the text may wrap at.
pub trait TextMeasure {
    fn measure(&self, font: &FontSpec, text: &str, max_width: f32) -> Size;
}

/// Deterministic fixed-advance measurer used headless and in tests: narrow
/// characters advance half an em, wide characters a full em, greedy wrap at
/// `max_width`. Real shaping lives behind [`TextMeasure`] in the host.
pub struct FixedMeasurer {
    advance_em: f32,
}

impl FixedMeasurer {
    pub fn new() -> Self {
        Self { advance_em: 0.5 }
    }

    fn char_width(&self, font: &FontSpec, c: char) -> f32 {
        let cells = UnicodeWidthChar::width(c).unwrap_or(0) as f32;
        self.advance_em * font.size * cells
    }
}

impl Default for FixedMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for FixedMeasurer {
    fn measure(&self, font: &FontSpec, text: &str, max_width: f32) -> Size {
        let line_height = font.size * font.line_height;
        if text.is_empty() {
            return Size::new(0.0, line_height);
        }

        let mut lines = 0u32;
        let mut widest: f32 = 0.0;
        for paragraph in text.split('\n') {
            lines += 1;
            let mut line_width: f32 = 0.0;
            for c in paragraph.chars() {
                let advance = self.char_width(font, c);
                if max_width.is_finite() && line_width > 0.0 && line_width + advance > max_width {
                    widest = widest.max(line_width);
                    lines += 1;
                    line_width = 0.0;
                }
                line_width += advance;
            }
            widest = widest.max(line_width);
        }

        Size::new(widest, lines as f32 * line_height)
    }
}

/// Process-wide fallback measurer for trees that were not given one.
pub fn default_measurer() -> &'static FixedMeasurer {
    static MEASURER: Lazy<FixedMeasurer> = Lazy::new(FixedMeasurer::new);
    &MEASURER
}

/// Text leaf. Sizes itself through the tree's [`TextMeasure`] service and
/// holds its font in the shared [`FontCache`], releasing it on disposal.
pub struct TextBlock {
    core: ElementCore,
    style: LayoutStyle,
    text: String,
    local_font: FontSpec,
    cached_font: Option<(Rc<RefCell<FontCache>>, FontKey)>,
    measurer: Option<Rc<dyn TextMeasure>>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            core: ElementCore::new(),
            style: LayoutStyle::default(),
            text: text.into(),
            local_font: FontSpec::default(),
            cached_font: None,
            measurer: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Changes the content and flips this node's own measure flag. Ancestor
    /// propagation goes through `element::invalidate_measure` (or
    /// `LayoutHost::update`), which is how external mutation reaches the
    /// tree.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text != text {
            self.text = text;
            self.core.invalidate_measure_local();
        }
    }

    pub fn set_font(&mut self, font: FontSpec) {
        if let Some((cache, key)) = self.cached_font.take() {
            cache.borrow_mut().release(key);
            let new_key = cache.borrow_mut().insert(font.clone());
            self.cached_font = Some((cache, new_key));
        }
        self.local_font = font;
        self.core.invalidate_measure_local();
    }

    /// Registers this element's font in a shared cache; the entry lives
    /// until the element is disposed.
    pub fn attach_font_cache(&mut self, cache: Rc<RefCell<FontCache>>) {
        let key = cache.borrow_mut().insert(self.local_font.clone());
        self.cached_font = Some((cache, key));
    }

    pub fn set_measurer(&mut self, measurer: Rc<dyn TextMeasure>) {
        self.measurer = Some(measurer);
        self.core.invalidate_measure_local();
    }

    fn font_spec(&self) -> FontSpec {
        match &self.cached_font {
            Some((cache, key)) => cache
                .borrow()
                .get(*key)
                .cloned()
                .unwrap_or_else(|| self.local_font.clone()),
            None => self.local_font.clone(),
        }
    }

    pub fn font_key(&self) -> Option<FontKey> {
        self.cached_font.as_ref().map(|(_, key)| *key)
    }
}

impl Element for TextBlock {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn style(&self) -> &LayoutStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut LayoutStyle {
        &mut self.style
    }

    fn measure_override(&mut self, available: Size) -> Size {
        let font = self.font_spec();
        match &self.measurer {
            Some(measurer) => measurer.measure(&font, &self.text, available.width),
            None => default_measurer().measure(&font, &self.text, available.width),
        }
    }

    fn dispose(&mut self) {
        if let Some((cache, key)) = self.cached_font.take() {
            cache.borrow_mut().release(key);
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
