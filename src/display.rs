//! Cursor-style text output on top of an embedded-graphics frame buffer.

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyleBuilder,
        ascii::{FONT_5X8, FONT_10X20},
    },
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use crate::config::VALUE_CLEAR_WIDTH;
use crate::error::DeviceError;
use crate::model::{ClockFields, MetricLine};
use crate::traits::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    /// 5x8 cells, eight rows on a 64 px panel
    Small,
    Large,
}

impl TextSize {
    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &FONT_5X8,
            TextSize::Large => &FONT_10X20,
        }
    }

    pub fn advance(self) -> i32 {
        let font = self.font();
        (font.character_size.width + font.character_spacing) as i32
    }

    pub fn line_height(self) -> u32 {
        self.font().character_size.height
    }
}

/// A buffered monochrome display that can be pushed to the glass.
///
/// Anything implementing this gets [`Panel`] for free.
pub trait Framebuffer: DrawTarget<Color = BinaryColor> + OriginDimensions {
    fn init_panel(&mut self) -> Result<(), DeviceError>;

    fn flush_panel(&mut self) -> Result<(), DeviceError>;
}

impl<T: Framebuffer> Panel for T {
    fn begin(&mut self) -> Result<(), DeviceError> {
        self.init_panel()
    }

    fn size(&self) -> Size {
        OriginDimensions::size(self)
    }

    fn clear(&mut self) -> Result<(), DeviceError> {
        DrawTarget::clear(self, BinaryColor::Off).map_err(|_| DeviceError::Display)
    }

    fn fill_rect(&mut self, area: Rectangle, color: BinaryColor) -> Result<(), DeviceError> {
        area.into_styled(PrimitiveStyle::with_fill(color))
            .draw(self)
            .map_err(|_| DeviceError::Display)
    }

    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        size: TextSize,
        foreground: BinaryColor,
        background: Option<BinaryColor>,
    ) -> Result<(), DeviceError> {
        let mut style = MonoTextStyleBuilder::new()
            .font(size.font())
            .text_color(foreground);
        if let Some(background) = background {
            style = style.background_color(background);
        }

        Text::with_baseline(text, origin, style.build(), Baseline::Top)
            .draw(self)
            .map_err(|_| DeviceError::Display)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DeviceError> {
        self.flush_panel()
    }
}

/// Text cursor with a current size and colour pair.
///
/// `background: None` draws transparent text, leaving unset glyph pixels
/// untouched.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    cursor: Point,
    size: TextSize,
    foreground: BinaryColor,
    background: Option<BinaryColor>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub const fn new() -> Self {
        Self {
            cursor: Point::zero(),
            size: TextSize::Small,
            foreground: BinaryColor::On,
            background: None,
        }
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    pub fn text_size(&self) -> TextSize {
        self.size
    }

    pub fn set_text_size(&mut self, size: TextSize) {
        self.size = size;
    }

    pub fn set_colors(&mut self, foreground: BinaryColor, background: Option<BinaryColor>) {
        self.foreground = foreground;
        self.background = background;
    }

    pub fn print(&mut self, panel: &mut dyn Panel, text: &str) -> Result<(), DeviceError> {
        panel.draw_text(
            text,
            self.cursor,
            self.size,
            self.foreground,
            self.background,
        )?;
        self.cursor.x += self.size.advance() * text.chars().count() as i32;
        Ok(())
    }

    pub fn println(&mut self, panel: &mut dyn Panel, text: &str) -> Result<(), DeviceError> {
        self.print(panel, text)?;
        self.newline();
        Ok(())
    }

    pub fn newline(&mut self) {
        self.cursor = Point::new(0, self.cursor.y + self.size.line_height() as i32);
    }
}

/// Draw one metric row at the cursor and move to the next row.
///
/// The label is drawn inverted. The value area is blanked before the value
/// is drawn so a shorter value never leaves digits of the previous one.
pub fn render_metric_line(
    panel: &mut dyn Panel,
    console: &mut Console,
    line: &MetricLine,
    value_column: i32,
) -> Result<(), DeviceError> {
    console.set_colors(BinaryColor::Off, Some(BinaryColor::On));
    console.print(panel, line.label)?;
    console.set_colors(BinaryColor::On, None);

    let y = console.cursor().y;
    let value_area = Rectangle::new(
        Point::new(value_column, y),
        Size::new(VALUE_CLEAR_WIDTH, console.text_size().line_height()),
    );
    panel.fill_rect(value_area, BinaryColor::Off)?;

    console.set_cursor(value_column, y);
    console.println(panel, &line.value_string())
}

/// Draw `HH:MM:SS DD/MM/YYYY` across the full width of the cursor row.
pub fn render_clock_row(
    panel: &mut dyn Panel,
    console: &mut Console,
    time: &ClockFields,
) -> Result<(), DeviceError> {
    let y = console.cursor().y;
    let row = Rectangle::new(
        Point::new(0, y),
        Size::new(panel.size().width, console.text_size().line_height()),
    );
    panel.fill_rect(row, BinaryColor::Off)?;

    console.set_colors(BinaryColor::On, None);
    console.set_cursor(0, y);
    console.print(panel, &time.time_string())?;
    console.print(panel, " ")?;
    console.println(panel, &time.date_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestPanel;

    fn render_value(panel: &mut TestPanel, value: f32) {
        let mut console = Console::new();
        render_metric_line(panel, &mut console, &MetricLine::float("Temp[C]:", value), 90)
            .unwrap();
    }

    #[test]
    fn shorter_value_leaves_no_stale_pixels() {
        let mut reused = TestPanel::new();
        for value in [1888.88, 21.3, 1.5] {
            render_value(&mut reused, value);
        }

        let mut fresh = TestPanel::new();
        render_value(&mut fresh, 1.5);

        assert!(reused.pixels_equal(&fresh));
    }

    #[test]
    fn value_area_is_cleared_before_every_draw() {
        let mut panel = TestPanel::new();
        for value in [10.0, 20.0, 30.0, 40.0] {
            render_value(&mut panel, value);
            let ops = panel.take_ops();
            let clear = ops
                .iter()
                .position(|op| op.starts_with("fill 90,0"))
                .expect("value area cleared");
            let value_text = ops
                .iter()
                .position(|op| op.starts_with("text 90,0"))
                .expect("value drawn");
            assert!(clear < value_text, "{ops:?}");
        }
    }

    #[test]
    fn label_is_inverted_and_value_is_not() {
        let mut panel = TestPanel::new();
        render_value(&mut panel, 21.3);
        let lit = |xs: core::ops::Range<usize>| {
            xs.flat_map(|x| (0..8).map(move |y| (x, y)))
                .filter(|&(x, y)| panel.pixel(x, y))
                .count()
        };

        // "Temp[C]:" covers 8 cells of 6 px; mostly background, so lit.
        assert!(panel.pixel(0, 7));
        assert!(lit(0..48) > 48 * 8 / 2);
        // "21.3" covers 90..114; only glyph strokes are lit.
        let value = lit(90..114);
        assert!(value > 0 && value < 24 * 8 / 2, "{value} lit pixels");
        // Past the value nothing is drawn.
        assert_eq!(lit(114..128), 0);
    }

    #[test]
    fn println_moves_to_next_row() {
        let mut panel = TestPanel::new();
        let mut console = Console::new();
        console.println(&mut panel, "abc").unwrap();
        assert_eq!(console.cursor(), Point::new(0, 8));
        console.print(&mut panel, "ab").unwrap();
        assert_eq!(console.cursor(), Point::new(10, 8));
    }

    #[test]
    fn clock_row_spans_panel_width() {
        let mut panel = TestPanel::new();
        let mut console = Console::new();
        let time = ClockFields::new(30, 15, 9, 5, 16, 10, 2026);
        render_clock_row(&mut panel, &mut console, &time).unwrap();

        let ops = panel.take_ops();
        assert_eq!(ops[0], "fill 0,0 128x8 off");
        assert!(ops.iter().any(|op| op == "text 0,0 09:15:30"));
        assert!(ops.iter().any(|op| op == "text 45,0 16/10/2026"));
        assert_eq!(console.cursor(), Point::new(0, 8));
    }
}
