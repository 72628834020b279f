//! Turning grouped lines into styled, role-tagged blocks.

use super::classify::{classify, LineMetrics};
use super::lines::Line;
use super::normalize::TextItem;
use super::LayoutConfig;
use crate::model::{FontWeight, LayoutBlock, Role};

/// Emit one block per non-blank line, top to bottom.
///
/// Blank lines produce nothing and do not count as the previous line for the
/// paragraph-break check.
pub fn emit_blocks(lines: &[Line], page: u32, config: &LayoutConfig) -> Vec<LayoutBlock> {
    let mut blocks = Vec::with_capacity(lines.len());
    let mut prev_y: Option<i32> = None;

    for line in lines {
        let Some(dominant) = dominant_item(&line.items) else {
            continue;
        };
        let text = line_text(&line.items, config);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let indent_px = line.left().saturating_sub(config.base_margin_px).max(0) as u32;
        let max_font_size = dominant.font_size;
        let avg_font_size = line.items.iter().map(|i| i.font_size as f32).sum::<f32>()
            / line.items.len() as f32;

        let metrics = LineMetrics::new(
            text,
            indent_px,
            max_font_size,
            avg_font_size,
            dominant.font_weight == FontWeight::Bold,
            dominant.color,
        );
        let role = classify(&metrics, config);

        let gap = prev_y.map(|y| line.y - y);
        let margin_top_px = margin_for(role, gap, config);
        prev_y = Some(line.y);

        blocks.push(LayoutBlock {
            role,
            text: metrics.text,
            indent_px,
            font_size: max_font_size,
            font_weight: dominant.font_weight,
            font_style: dominant.font_style,
            font_family: dominant.font_family,
            color: dominant.color,
            margin_top_px,
            page,
        });
    }

    blocks
}

/// First item with the largest font size.
pub fn dominant_item(items: &[TextItem]) -> Option<&TextItem> {
    items.iter().fold(None, |best: Option<&TextItem>, item| match best {
        Some(b) if b.font_size >= item.font_size => Some(b),
        _ => Some(item),
    })
}

/// Join item texts left to right, padding visible gaps with spaces.
pub fn line_text(items: &[TextItem], config: &LayoutConfig) -> String {
    let mut out = String::new();
    let mut prev: Option<&TextItem> = None;

    for item in items {
        if let Some(p) = prev {
            let gap = item.x as f32 - p.right();
            if gap > config.space_gap_px {
                let n = ((gap / config.space_unit_px).round() as usize)
                    .max(1)
                    .min(config.max_inserted_spaces);
                out.extend(std::iter::repeat(' ').take(n));
            }
        }
        out.push_str(&item.text);
        prev = Some(item);
    }

    out
}

/// Top margin for a block given the distance from the previous emitted line.
pub fn margin_for(role: Role, gap_from_prev: Option<i32>, config: &LayoutConfig) -> u32 {
    match role {
        Role::Header => config.header_margin_px,
        Role::SubHeader => config.sub_header_margin_px,
        Role::Bullet | Role::Numbered => config.list_margin_px,
        Role::Paragraph => match gap_from_prev {
            Some(gap) if gap > config.paragraph_break_px => config.paragraph_break_margin_px,
            _ => config.paragraph_margin_px,
        },
    }
}
