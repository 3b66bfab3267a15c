use crate::render::{Color, DrawCommand, RectPrimitive, TextHAlign, TextMeasure, TextPrimitive};

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub color: Color,
    pub text: String,
}

impl LegendItem {
    #[must_use]
    pub fn new(color: Color, text: impl Into<String>) -> Self {
        Self {
            color,
            text: text.into(),
        }
    }
}

/// Chart title plus one swatch per drawn series.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: String,
    pub items: Vec<LegendItem>,
}

impl Legend {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, color: Color, text: impl Into<String>) -> Self {
        self.items.push(LegendItem::new(color, text));
        self
    }
}

/// Geometry of the legend strip below the X labels, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LegendStrip {
    pub surface_width: f64,
    pub top: f64,
    pub height: f64,
    pub font_size: f64,
    pub font_factor: f64,
    pub scale_factor: f64,
    pub text_offset: f64,
    pub text_color: Color,
}

/// Lays out title and items on one centred line.
pub(crate) fn layout_legend(
    legend: &Legend,
    strip: LegendStrip,
    measure: &dyn TextMeasure,
) -> Vec<DrawCommand> {
    let LegendStrip {
        surface_width,
        top,
        height,
        font_size,
        font_factor,
        scale_factor,
        text_offset,
        text_color,
    } = strip;

    let swatch = (8.0 * font_factor * scale_factor).round().max(1.0);
    let item_gap = 12.0 * font_factor * scale_factor;
    let swatch_gap = 4.0 * font_factor * scale_factor;

    let title_width = if legend.title.is_empty() {
        0.0
    } else {
        measure.text_width(&legend.title, font_size)
    };
    let item_widths: Vec<f64> = legend
        .items
        .iter()
        .map(|item| measure.text_width(&item.text, font_size))
        .collect();
    let mut total = title_width;
    for (index, width) in item_widths.iter().enumerate() {
        if index > 0 || title_width > 0.0 {
            total += item_gap;
        }
        total += swatch + swatch_gap + width;
    }

    let center_y = top + height / 2.0;
    let baseline = center_y + text_offset;
    let mut cursor = ((surface_width - total) / 2.0).max(0.0).round();
    let mut commands = Vec::with_capacity(1 + 2 * legend.items.len());

    if title_width > 0.0 {
        commands.push(DrawCommand::Text(TextPrimitive::new(
            legend.title.clone(),
            cursor,
            baseline,
            font_size,
            text_color,
            TextHAlign::Left,
        )));
        cursor += title_width;
    }

    for (index, (item, width)) in legend.items.iter().zip(&item_widths).enumerate() {
        if index > 0 || title_width > 0.0 {
            cursor += item_gap;
        }
        commands.push(DrawCommand::Rect(RectPrimitive::new(
            cursor.round(),
            (center_y - swatch / 2.0).round(),
            swatch,
            swatch,
            item.color,
        )));
        cursor += swatch + swatch_gap;
        if !item.text.is_empty() {
            commands.push(DrawCommand::Text(TextPrimitive::new(
                item.text.clone(),
                cursor,
                baseline,
                font_size,
                text_color,
                TextHAlign::Left,
            )));
        }
        cursor += width;
    }

    commands
}
