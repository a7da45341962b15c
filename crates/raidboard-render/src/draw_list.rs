//! Declarative drawing commands for a board frame.
//!
//! Layer order, bottom to top: stage fill, background image, grid, shapes
//! (list order, then previews), tokens, ruler.

use crate::renderer::RenderContext;
use kurbo::{Point, Rect};
use raidboard_core::color::TokenColor;
use raidboard_core::shapes::{Arrow, Circle, Ruler, Shape};
use raidboard_core::token::Token;
use serde::Serialize;

const WHITE: TokenColor = TokenColor::white();
const GRID_COLOR: TokenColor = TokenColor::rgb(0x2a, 0x2a, 0x2a);
const GRID_OPACITY: f64 = 0.35;
const BACKGROUND_IMAGE_OPACITY: f64 = 0.9;
const PING_COLOR: TokenColor = TokenColor::rgb(0xff, 0xd1, 0x66);
const PING_RADIUS: f64 = 20.0;
const LABEL_COLOR: TokenColor = TokenColor::rgb(0x0b, 0x0b, 0x0f);
const RULER_COLOR: TokenColor = TokenColor::new(0xff, 0xff, 0xff, 0xaa);
const ARROW_HEAD: f64 = 10.0;
const PREVIEW_DASH: [f64; 2] = [6.0, 6.0];
const RULER_DASH: [f64; 2] = [8.0, 6.0];
const FONT_SIZE: f64 = 12.0;
const TOKEN_SHADOW_BLUR: f64 = 8.0;
/// Width of the box the token label is centered in.
const TOKEN_LABEL_WIDTH: f64 = 28.0;

/// Stroke parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub color: TokenColor,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[f64; 2]>,
    pub round_caps: bool,
}

impl StrokeStyle {
    pub fn solid(color: TokenColor, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
            round_caps: false,
        }
    }

    pub fn dashed(mut self, dash: [f64; 2]) -> Self {
        self.dash = Some(dash);
        self
    }

    pub fn rounded(mut self) -> Self {
        self.round_caps = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
}

/// A single drawing command in stage coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum DrawItem {
    FillRect {
        rect: Rect,
        color: TokenColor,
    },
    Image {
        rect: Rect,
        width: u32,
        height: u32,
        opacity: f64,
    },
    /// Polyline; a non-zero tension asks for a smoothed curve through the points.
    Polyline {
        points: Vec<Point>,
        stroke: StrokeStyle,
        tension: f64,
        opacity: f64,
    },
    Arrow {
        start: Point,
        end: Point,
        stroke: StrokeStyle,
        head_length: f64,
        head_width: f64,
        opacity: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        stroke: Option<StrokeStyle>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fill: Option<TokenColor>,
        shadow_blur: f64,
        opacity: f64,
    },
    Text {
        origin: Point,
        text: String,
        color: TokenColor,
        size: f64,
        bold: bool,
        /// Alignment box width; `None` lets the text run freely.
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        align: TextAlign,
    },
}

/// Build the full draw list for the board in `ctx`.
pub fn build_draw_list(ctx: &RenderContext) -> Vec<DrawItem> {
    let board = ctx.board;
    let scene = board.scene();
    let stage = Rect::from_origin_size(Point::ZERO, ctx.viewport_size);
    let mut items = vec![DrawItem::FillRect {
        rect: stage,
        color: ctx.background_color,
    }];

    if let Some(image) = board.background().image() {
        items.push(DrawItem::Image {
            rect: stage,
            width: image.width,
            height: image.height,
            opacity: BACKGROUND_IMAGE_OPACITY,
        });
    }

    if ctx.show_grid {
        push_grid(&mut items, stage, board.config().grid_spacing);
    }

    items.extend(scene.drawables().filter_map(shape_item));

    let marker_radius = board.config().token_marker_radius;
    for token in scene.tokens() {
        push_token(&mut items, token, marker_radius);
    }

    if let Some(ruler) = scene.ruler() {
        items.push(ruler_line(ruler));
        items.push(DrawItem::Text {
            origin: Point::new(ruler.end.x + 8.0, ruler.end.y + 8.0),
            text: ruler.label(),
            color: WHITE,
            size: FONT_SIZE,
            bold: false,
            width: None,
            align: TextAlign::Left,
        });
    }

    items
}

/// Vertical then horizontal lines every `spacing` pixels, starting at 0.
fn push_grid(items: &mut Vec<DrawItem>, stage: Rect, spacing: f64) {
    if spacing <= 0.0 {
        return;
    }
    let stroke = StrokeStyle::solid(GRID_COLOR, 1.0);
    let line = |a: Point, b: Point| DrawItem::Polyline {
        points: vec![a, b],
        stroke: stroke.clone(),
        tension: 0.0,
        opacity: GRID_OPACITY,
    };

    let count = |extent: f64| (extent / spacing).ceil() as usize;
    for i in 0..count(stage.width()) {
        let x = i as f64 * spacing;
        items.push(line(Point::new(x, 0.0), Point::new(x, stage.height())));
    }
    for j in 0..count(stage.height()) {
        let y = j as f64 * spacing;
        items.push(line(Point::new(0.0, y), Point::new(stage.width(), y)));
    }
}

fn ruler_line(ruler: &Ruler) -> DrawItem {
    DrawItem::Polyline {
        points: vec![ruler.start, ruler.end],
        stroke: StrokeStyle::solid(RULER_COLOR, 2.0).dashed(RULER_DASH),
        tension: 0.0,
        opacity: 1.0,
    }
}

fn arrow_item(arrow: &Arrow, opacity: f64) -> DrawItem {
    DrawItem::Arrow {
        start: arrow.start,
        end: arrow.end,
        stroke: StrokeStyle::solid(WHITE, 2.0),
        head_length: ARROW_HEAD,
        head_width: ARROW_HEAD,
        opacity,
    }
}

fn circle_outline(circle: &Circle, stroke: StrokeStyle, opacity: f64) -> DrawItem {
    DrawItem::Circle {
        center: circle.center,
        radius: circle.radius,
        stroke: Some(stroke),
        fill: None,
        shadow_blur: 0.0,
        opacity,
    }
}

/// Item for a list shape or preview. The ruler lives in its own slot and is
/// drawn above tokens, so it has no item here.
fn shape_item(shape: &Shape) -> Option<DrawItem> {
    let item = match shape {
        Shape::FreehandLine(line) => DrawItem::Polyline {
            points: line.points.clone(),
            stroke: StrokeStyle::solid(WHITE, 2.0).rounded(),
            tension: line.tension,
            opacity: 1.0,
        },
        Shape::Arrow(arrow) => arrow_item(arrow, 1.0),
        Shape::ArrowPreview(arrow) => arrow_item(arrow, 0.5),
        Shape::Ping(ping) => DrawItem::Circle {
            center: ping.position,
            radius: PING_RADIUS,
            stroke: Some(StrokeStyle::solid(PING_COLOR, 4.0)),
            fill: None,
            shadow_blur: 0.0,
            opacity: 0.8,
        },
        Shape::CircleMarker(circle) => circle_outline(circle, StrokeStyle::solid(WHITE, 2.0), 1.0),
        Shape::CirclePreview(circle) => {
            circle_outline(circle, StrokeStyle::solid(WHITE, 2.0).dashed(PREVIEW_DASH), 0.6)
        }
        Shape::DistanceRuler(_) => return None,
    };
    Some(item)
}

fn push_token(items: &mut Vec<DrawItem>, token: &Token, marker_radius: f64) {
    let center = token.position;
    if token.radius > 0.0 {
        items.push(DrawItem::Circle {
            center,
            radius: token.radius,
            stroke: Some(StrokeStyle::solid(WHITE, 1.0).dashed(PREVIEW_DASH)),
            fill: None,
            shadow_blur: 0.0,
            opacity: 0.4,
        });
    }
    items.push(DrawItem::Circle {
        center,
        radius: marker_radius,
        stroke: None,
        fill: Some(token.color()),
        shadow_blur: TOKEN_SHADOW_BLUR,
        opacity: 1.0,
    });
    items.push(DrawItem::Text {
        origin: Point::new(center.x - TOKEN_LABEL_WIDTH / 2.0, center.y - 8.0),
        text: token.label().to_string(),
        color: LABEL_COLOR,
        size: FONT_SIZE,
        bold: true,
        width: Some(TOKEN_LABEL_WIDTH),
        align: TextAlign::Center,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidboard_core::board::Board;
    use raidboard_core::clock::ManualClock;
    use raidboard_core::config::BoardConfig;
    use raidboard_core::tools::ToolMode;

    fn board() -> Board {
        let config = BoardConfig {
            spawn_jitter: 0.0,
            ..BoardConfig::default()
        };
        Board::with_clock(config, ManualClock::new())
    }

    fn grid_line_count(items: &[DrawItem]) -> usize {
        items
            .iter()
            .filter(|i| matches!(i, DrawItem::Polyline { opacity, .. } if *opacity == GRID_OPACITY))
            .count()
    }

    #[test]
    fn test_empty_board_is_fill_and_grid() {
        let board = board();
        let items = build_draw_list(&RenderContext::new(&board));
        assert!(matches!(items[0], DrawItem::FillRect { .. }));
        // 1100 / 40 = 27.5 -> 28 vertical, 680 / 40 = 17 -> 17 horizontal.
        assert_eq!(grid_line_count(&items), 28 + 17);
        assert_eq!(items.len(), 1 + 28 + 17);

        let items = build_draw_list(&RenderContext::new(&board).with_grid(false));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_token_layers() {
        let mut board = board();
        let id = board.add_palette_token(0).unwrap_or_default();
        board.pointer_down(Point::new(550.0, 340.0));
        board.pointer_up(Point::new(550.0, 340.0));
        assert_eq!(board.scene().token(id).map(|t| t.radius), Some(100.0));

        let items = build_draw_list(&RenderContext::new(&board).with_grid(false));
        match &items[1..] {
            [
                DrawItem::Circle { radius: aura, opacity: aura_opacity, fill: None, .. },
                DrawItem::Circle { radius: marker, fill: Some(fill), shadow_blur, .. },
                DrawItem::Text { text, bold: true, origin, .. },
            ] => {
                assert_eq!(*aura, 100.0);
                assert_eq!(*aura_opacity, 0.4);
                assert_eq!(*marker, 18.0);
                assert_eq!(*fill, TokenColor::rgb(0xff, 0x6b, 0x6b));
                assert_eq!(*shadow_blur, 8.0);
                assert_eq!(text, "Tank");
                assert_eq!(*origin, Point::new(536.0, 332.0));
            }
            other => panic!("unexpected items {other:?}"),
        }
    }

    #[test]
    fn test_ruler_drawn_last_with_label() {
        let mut board = board();
        board.add_palette_token(5);
        board.set_mode(ToolMode::Ruler);
        board.pointer_down(Point::new(0.0, 0.0));
        board.pointer_move(Point::new(30.0, 40.0));

        let items = build_draw_list(&RenderContext::new(&board).with_grid(false));
        let n = items.len();
        match &items[n - 2..] {
            [DrawItem::Polyline { stroke, .. }, DrawItem::Text { text, origin, .. }] => {
                assert_eq!(stroke.dash, Some(RULER_DASH));
                assert_eq!(text, "50 px");
                assert_eq!(*origin, Point::new(38.0, 48.0));
            }
            other => panic!("unexpected items {other:?}"),
        }
    }

    #[test]
    fn test_ruler_drawn_once() {
        assert_eq!(shape_item(&Shape::DistanceRuler(Ruler::new(Point::ZERO))), None);

        let mut board = board();
        board.set_mode(ToolMode::Ruler);
        board.pointer_down(Point::new(10.0, 10.0));
        board.pointer_move(Point::new(10.0, 60.0));
        board.pointer_up(Point::new(10.0, 60.0));

        let items = build_draw_list(&RenderContext::new(&board).with_grid(false));
        let rulers = items
            .iter()
            .filter(|i| matches!(i, DrawItem::Polyline { stroke, .. } if stroke.dash == Some(RULER_DASH)))
            .count();
        assert_eq!(rulers, 1);
    }

    #[test]
    fn test_previews_drawn_after_shapes() {
        let mut board = board();
        board.set_mode(ToolMode::Freehand);
        board.pointer_down(Point::new(0.0, 0.0));
        board.pointer_move(Point::new(5.0, 5.0));
        board.pointer_up(Point::new(5.0, 5.0));
        board.set_mode(ToolMode::Circle);
        board.pointer_down(Point::new(200.0, 200.0));
        board.pointer_move(Point::new(200.0, 260.0));

        let items = build_draw_list(&RenderContext::new(&board).with_grid(false));
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[1], DrawItem::Polyline { tension, .. } if *tension == 0.4));
        match &items[2] {
            DrawItem::Circle { radius, opacity, stroke: Some(stroke), .. } => {
                assert_eq!(*radius, 60.0);
                assert_eq!(*opacity, 0.6);
                assert_eq!(stroke.dash, Some(PREVIEW_DASH));
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn test_background_image_layer() {
        let mut board = board();
        let url = board.set_background_url("map.png").unwrap_or_default();
        board.complete_background_load(
            &url,
            Ok(raidboard_core::background::BackgroundImage::new(640, 480, vec![0u8])),
        );
        let items = build_draw_list(&RenderContext::new(&board).with_grid(false));
        assert!(matches!(
            items[1],
            DrawItem::Image { width: 640, height: 480, opacity, .. } if opacity == 0.9
        ));
    }

    #[test]
    fn test_serializes_with_item_tag() {
        let board = board();
        let items = build_draw_list(&RenderContext::new(&board).with_grid(false));
        let value = serde_json::to_value(&items).unwrap();
        assert_eq!(value[0]["item"], "fill_rect");
        assert_eq!(value[0]["color"], "#111318");
    }
}
