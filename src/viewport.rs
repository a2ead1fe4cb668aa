//! View-to-image coordinate mapping.
//!
//! The image is displayed scaled by a zoom factor inside a scrollable
//! viewport. A click arrives in view coordinates; before it can be
//! georeferenced it has to be brought back into the pixel frame of the
//! original, unscaled image.

use serde::{Deserialize, Serialize};

use crate::constants::zoom as zoom_const;
use crate::model::ImagePoint;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Size {
    /// Create a size from its width and height.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A click position in view (widget) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPoint {
    /// Distance from the left edge, growing rightwards
    pub x: f64,
    /// Distance from the top edge, growing downwards
    pub y: f64,
}

impl ViewPoint {
    /// Create a view position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// State of one scroll bar of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollBar {
    /// Current position
    pub value: i32,
    /// Lowest position
    pub minimum: i32,
    /// Highest position
    pub maximum: i32,
    /// Amount scrolled by one page, typically the viewport length
    pub page_step: i32,
}

impl ScrollBar {
    /// Create a scroll bar; `value` is clamped into the range.
    pub fn new(value: i32, minimum: i32, maximum: i32, page_step: i32) -> Self {
        let mut bar = Self {
            value: minimum,
            minimum,
            maximum,
            page_step,
        };
        bar.set_value(value);
        bar
    }

    /// Move to `value`, clamped into `[minimum, maximum]`.
    pub fn set_value(&mut self, value: i32) {
        self.value = value.clamp(self.minimum, self.maximum.max(self.minimum));
    }

    /// Fraction of the scroll range consumed, `0` when there is nothing to scroll.
    pub fn fraction(&self) -> f64 {
        if self.maximum > self.minimum {
            f64::from(self.value - self.minimum) / f64::from(self.maximum - self.minimum)
        } else {
            0.0
        }
    }

    /// Keep the viewport centered on the same content after scaling by `factor`.
    fn rescale(&mut self, factor: f64) {
        let value =
            factor * f64::from(self.value) + (factor - 1.0) * f64::from(self.page_step) / 2.0;
        self.set_value(value as i32);
    }
}

/// Zoom step factors and limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomSettings {
    /// Scale multiplier for one zoom-in step
    pub in_factor: f64,
    /// Scale multiplier for one zoom-out step
    pub out_factor: f64,
    /// Zooming in stops once the scale factor reaches this
    pub max: f64,
    /// Zooming out stops once the scale factor reaches this
    pub min: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            in_factor: zoom_const::IN_FACTOR,
            out_factor: zoom_const::OUT_FACTOR,
            max: zoom_const::MAX,
            min: zoom_const::MIN,
        }
    }
}

/// Everything about the current view needed to locate a click in the image.
///
/// Owned and updated by the UI layer; the mapper only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    scale_factor: f64,
    /// Horizontal scroll bar of the viewport
    pub horizontal: ScrollBar,
    /// Vertical scroll bar of the viewport
    pub vertical: ScrollBar,
    /// Visible area size
    pub viewport: Size,
    /// Unscaled image size
    pub image: Size,
    /// Position of the image widget in the frame clicks are reported in
    pub origin: ViewPoint,
    zoom: ZoomSettings,
}

impl ViewState {
    /// View of an image shown at its normal size, scrolled to the top-left.
    pub fn new(image: Size, viewport: Size) -> Self {
        let mut state = Self {
            scale_factor: 1.0,
            horizontal: ScrollBar::default(),
            vertical: ScrollBar::default(),
            viewport,
            image,
            origin: ViewPoint::default(),
            zoom: ZoomSettings::default(),
        };
        state.update_scroll_ranges();
        state
    }

    /// Use custom zoom steps and limits.
    pub fn with_zoom_settings(mut self, zoom: ZoomSettings) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set where the image widget sits in the click coordinate frame.
    pub fn with_origin(mut self, origin: ViewPoint) -> Self {
        self.origin = origin;
        self
    }

    /// Current zoom factor (1.0 = 100%).
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Set the zoom factor directly. Non-positive or non-finite values are ignored.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
            self.update_scroll_ranges();
        } else {
            log::warn!("Ignoring invalid scale factor {}", scale_factor);
        }
    }

    /// Image size once scaled for display.
    pub fn scaled_image_size(&self) -> Size {
        Size::new(
            self.image.width * self.scale_factor,
            self.image.height * self.scale_factor,
        )
    }

    /// Scroll both bars to the given positions (clamped).
    pub fn scroll_to(&mut self, horizontal: i32, vertical: i32) {
        self.horizontal.set_value(horizontal);
        self.vertical.set_value(vertical);
    }

    /// Resize the viewport, e.g. after the window was resized.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.update_scroll_ranges();
    }

    /// Multiply the zoom factor by `factor`, keeping the view centered on the
    /// same part of the image.
    pub fn scale_image(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            log::warn!("Ignoring invalid zoom step {}", factor);
            return;
        }
        self.scale_factor *= factor;
        self.update_scroll_ranges();
        self.horizontal.rescale(factor);
        self.vertical.rescale(factor);
        log::debug!("🔍 Zoom: {:.2}x", self.scale_factor);
    }

    /// Whether one more zoom-in step is allowed.
    pub fn can_zoom_in(&self) -> bool {
        self.scale_factor < self.zoom.max
    }

    /// Whether one more zoom-out step is allowed.
    pub fn can_zoom_out(&self) -> bool {
        self.scale_factor > self.zoom.min
    }

    /// Zoom in one step. Returns false when already at the limit.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.scale_image(self.zoom.in_factor);
        true
    }

    /// Zoom out one step. Returns false when already at the limit.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.scale_image(self.zoom.out_factor);
        true
    }

    /// Back to 100%.
    pub fn normal_size(&mut self) {
        self.scale_factor = 1.0;
        self.update_scroll_ranges();
        log::debug!("🔄 View reset to normal size");
    }

    /// Scroll ranges follow the amount of scaled image hidden outside the viewport.
    fn update_scroll_ranges(&mut self) {
        let scaled = self.scaled_image_size();
        update_axis(&mut self.horizontal, scaled.width, self.viewport.width);
        update_axis(&mut self.vertical, scaled.height, self.viewport.height);
    }
}

fn update_axis(bar: &mut ScrollBar, scaled_len: f64, viewport_len: f64) {
    bar.minimum = 0;
    bar.maximum = (scaled_len - viewport_len).max(0.0).round() as i32;
    bar.page_step = viewport_len.max(0.0).round() as i32;
    bar.set_value(bar.value);
}

/// Converts view clicks into original-image pixel coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportMapper;

impl ViewportMapper {
    /// Locate a view click in the unscaled image.
    ///
    /// Clicks outside the image give coordinates outside `[0, size)`,
    /// possibly negative; checking them is up to the caller.
    pub fn to_image_coordinates(view_pos: ViewPoint, view: &ViewState) -> ImagePoint {
        let scale = view.scale_factor;
        let scaled = view.scaled_image_size();
        let x = axis_to_image(
            view_pos.x - view.origin.x,
            &view.horizontal,
            scaled.width,
            view.viewport.width,
            scale,
        );
        let y = axis_to_image(
            view_pos.y - view.origin.y,
            &view.vertical,
            scaled.height,
            view.viewport.height,
            scale,
        );
        ImagePoint::new(x, y)
    }
}

/// Locate a view click in the unscaled image, see [`ViewportMapper`].
pub fn map_click_to_image(view_pos: ViewPoint, view: &ViewState) -> ImagePoint {
    ViewportMapper::to_image_coordinates(view_pos, view)
}

/// One axis of the mapping: offset within the scaled image, then unscale.
fn axis_to_image(local: f64, bar: &ScrollBar, scaled_len: f64, viewport_len: f64, scale: f64) -> f64 {
    let remaining = (scaled_len - viewport_len).max(0.0);
    (local + remaining * bar.fraction()) / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn view(image: (f64, f64), viewport: (f64, f64)) -> ViewState {
        ViewState::new(Size::new(image.0, image.1), Size::new(viewport.0, viewport.1))
    }

    #[test]
    fn test_identity_at_normal_size() {
        let v = view((800.0, 600.0), (400.0, 300.0));
        let p = map_click_to_image(ViewPoint::new(123.0, 45.0), &v);
        assert_eq!(p, ImagePoint::new(123.0, 45.0));
    }

    #[test]
    fn test_scale_two_halves_coordinates() {
        // Image fits in the viewport even when zoomed: nothing to scroll
        let mut v = view((100.0, 100.0), (400.0, 400.0));
        v.set_scale_factor(2.0);
        let p = map_click_to_image(ViewPoint::new(120.0, 60.0), &v);
        assert_eq!(p, ImagePoint::new(60.0, 30.0));
    }

    #[test]
    fn test_scroll_offset_is_added() {
        // 1000x800 image in a 400x300 viewport: 600 and 500 hidden pixels
        let mut v = view((1000.0, 800.0), (400.0, 300.0));
        assert_eq!(v.horizontal.maximum, 600);
        assert_eq!(v.vertical.maximum, 500);

        v.scroll_to(300, 500);
        let p = map_click_to_image(ViewPoint::new(10.0, 20.0), &v);
        assert_relative_eq!(p.x(), 310.0);
        assert_relative_eq!(p.y(), 520.0);
    }

    #[test]
    fn test_scroll_fraction_with_foreign_range() {
        // Scroll bar range reported by a toolkit in its own units
        let mut v = view((1000.0, 1000.0), (500.0, 500.0));
        v.horizontal = ScrollBar::new(50, 0, 100, 10);
        v.vertical = ScrollBar::new(30, 10, 10, 10);

        let p = map_click_to_image(ViewPoint::new(0.0, 40.0), &v);
        // Half of the 500 hidden pixels
        assert_relative_eq!(p.x(), 250.0);
        // Empty range counts as not scrolled
        assert_relative_eq!(p.y(), 40.0);
    }

    #[test]
    fn test_zoomed_and_scrolled() {
        let mut v = view((400.0, 400.0), (200.0, 200.0));
        v.set_scale_factor(2.0);
        // 800 scaled, 600 hidden
        assert_eq!(v.horizontal.maximum, 600);
        v.scroll_to(600, 0);

        let p = map_click_to_image(ViewPoint::new(100.0, 100.0), &v);
        assert_relative_eq!(p.x(), 350.0);
        assert_relative_eq!(p.y(), 50.0);
    }

    #[test]
    fn test_origin_and_outside_clicks() {
        let v = view((100.0, 100.0), (100.0, 100.0)).with_origin(ViewPoint::new(20.0, 30.0));
        let p = map_click_to_image(ViewPoint::new(10.0, 30.0), &v);
        assert_eq!(p, ImagePoint::new(-10.0, 0.0));
        assert!(!p.is_within(v.image.width, v.image.height));
    }

    #[test]
    fn test_zoom_limits() {
        let mut v = view((100.0, 100.0), (100.0, 100.0));
        let mut steps = 0;
        while v.zoom_in() {
            steps += 1;
        }
        // 1.25^5 = 3.05
        assert_eq!(steps, 5);
        assert!(!v.can_zoom_in());
        assert!(v.scale_factor() >= zoom_const::MAX);

        v.normal_size();
        assert_eq!(v.scale_factor(), 1.0);
        while v.zoom_out() {}
        assert!(v.scale_factor() <= zoom_const::MIN);
        assert!(!v.can_zoom_out());
    }

    #[test]
    fn test_zoom_keeps_center() {
        let mut v = view((1000.0, 1000.0), (200.0, 200.0));
        v.scroll_to(400, 400);
        // Center of the viewport is image pixel 500
        let before = map_click_to_image(ViewPoint::new(100.0, 100.0), &v);
        assert_relative_eq!(before.x(), 500.0);

        v.scale_image(2.0);
        assert_eq!(v.horizontal.value, 900);
        let after = map_click_to_image(ViewPoint::new(100.0, 100.0), &v);
        assert_relative_eq!(after.x(), 500.0);
        assert_relative_eq!(after.y(), 500.0);
    }

    #[test]
    fn test_invalid_scale_is_ignored() {
        let mut v = view((100.0, 100.0), (100.0, 100.0));
        v.set_scale_factor(0.0);
        v.set_scale_factor(f64::NAN);
        v.scale_image(-1.0);
        assert_eq!(v.scale_factor(), 1.0);
    }

    #[test]
    fn test_viewport_resize_clamps_scroll() {
        let mut v = view((1000.0, 1000.0), (200.0, 200.0));
        v.scroll_to(800, 800);
        v.set_viewport(Size::new(900.0, 1200.0));
        assert_eq!(v.horizontal.value, 100);
        assert_eq!(v.vertical.value, 0);
    }
}
