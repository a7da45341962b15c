//! Cairo rasterization of draw lists into RGBA frames.

use crate::draw_list::{DrawItem, StrokeStyle, TextAlign, build_draw_list};
use crate::renderer::{RenderContext, RenderResult, RendererError};
use cairo::{Context, FontSlant, FontWeight, Format, ImageSurface, LineCap, LineJoin, RadialGradient};
use kurbo::{Point, Rect, Vec2};
use raidboard_core::background::BackgroundImage;
use raidboard_core::color::TokenColor;
use std::f64::consts::TAU;

/// Largest surface edge cairo accepts.
const MAX_FRAME_EDGE: u32 = 32767;
const FONT_FAMILY: &str = "Sans";
/// Alpha of the drop shadow where it meets the disk edge.
const SHADOW_ALPHA: f64 = 0.6;

/// RGBA pixel data (4 bytes per pixel, row-major, straight alpha).
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RgbaFrame {
    /// Wrap existing pixel data, checking that its length matches the size.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> RenderResult<Self> {
        let frame = Self { width, height, rgba };
        frame.validate()?;
        Ok(frame)
    }

    /// Check that the size is drawable and the buffer matches it.
    pub fn validate(&self) -> RenderResult<()> {
        let expected = frame_len(self.width, self.height)?;
        if self.rgba.len() != expected {
            return Err(RendererError::InvalidFrame {
                width: self.width,
                height: self.height,
                expected,
                actual: self.rgba.len(),
            });
        }
        Ok(())
    }

    pub fn filled(width: u32, height: u32, color: TokenColor) -> RenderResult<Self> {
        let len = frame_len(width, height)?;
        let rgba = [color.r, color.g, color.b, color.a].into_iter().cycle().take(len).collect();
        Ok(Self { width, height, rgba })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    /// Copy out of an ARGB32 surface, undoing premultiplied alpha.
    fn from_surface(surface: &mut ImageSurface) -> RenderResult<Self> {
        surface.flush();
        let (width, height) = (surface.width() as u32, surface.height() as u32);
        let stride = surface.stride() as usize;
        let mut rgba = Vec::with_capacity(frame_len(width, height)?);
        let data = surface.data()?;
        for row in data.chunks(stride).take(height as usize) {
            for px in row[..width as usize * 4].chunks_exact(4) {
                let argb = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                let alpha = argb >> 24;
                let channel = |shift: u32| {
                    let c = (argb >> shift) & 0xff;
                    if alpha == 0 {
                        0
                    } else {
                        ((c * 255 + alpha / 2) / alpha).min(255) as u8
                    }
                };
                rgba.extend([channel(16), channel(8), channel(0), alpha as u8]);
            }
        }
        Self::new(width, height, rgba)
    }
}

/// Byte length of a `width` x `height` frame.
fn frame_len(width: u32, height: u32) -> RenderResult<usize> {
    let too_large = || RendererError::FrameSize { width, height };
    if width == 0 || height == 0 || width > MAX_FRAME_EDGE || height > MAX_FRAME_EDGE {
        return Err(too_large());
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(too_large)
}

/// Render the board in `ctx` at its physical size.
pub fn rasterize(ctx: &RenderContext) -> RenderResult<RgbaFrame> {
    let (width, height) = ctx.physical_size();
    let items = build_draw_list(ctx);
    paint_items(&items, ctx.board.background().image(), width, height, ctx.scale_factor)
}

/// Paint `items` at `scale` times their stage coordinates. `background`
/// supplies the pixels for `DrawItem::Image`.
pub(crate) fn paint_items(
    items: &[DrawItem],
    background: Option<&BackgroundImage>,
    width: u32,
    height: u32,
    scale: f64,
) -> RenderResult<RgbaFrame> {
    frame_len(width, height)?;
    let mut surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)?;
    {
        let cr = Context::new(&surface)?;
        cr.scale(scale, scale);
        for item in items {
            paint_item(&cr, item, background)?;
        }
    }
    RgbaFrame::from_surface(&mut surface)
}

fn paint_item(cr: &Context, item: &DrawItem, background: Option<&BackgroundImage>) -> RenderResult<()> {
    match item {
        DrawItem::FillRect { rect, color } => {
            set_color(cr, *color);
            cr.rectangle(rect.x0, rect.y0, rect.width(), rect.height());
            cr.fill()?;
        }
        DrawItem::Image {
            rect,
            width,
            height,
            opacity,
        } => match background {
            Some(image) if image.width == *width && image.height == *height => {
                paint_image(cr, image, *rect, *opacity)?;
            }
            _ => log::warn!("No pixels for {width}x{height} background, skipping"),
        },
        DrawItem::Polyline {
            points,
            stroke,
            tension,
            opacity,
        } => with_opacity(cr, *opacity, |cr| {
            trace_polyline(cr, points, *tension);
            stroke_path(cr, stroke)
        })?,
        DrawItem::Arrow {
            start,
            end,
            stroke,
            head_length,
            head_width,
            opacity,
        } => with_opacity(cr, *opacity, |cr| {
            cr.move_to(start.x, start.y);
            cr.line_to(end.x, end.y);
            stroke_path(cr, stroke)?;

            let dir = *end - *start;
            let len = dir.hypot();
            if len > 0.0 {
                let base = *end - dir * (*head_length / len);
                let side = Vec2::new(-dir.y, dir.x) * (*head_width / 2.0 / len);
                cr.move_to(end.x, end.y);
                cr.line_to((base + side).x, (base + side).y);
                cr.line_to((base - side).x, (base - side).y);
                cr.close_path();
                set_color(cr, stroke.color);
                cr.fill()?;
            }
            Ok(())
        })?,
        DrawItem::Circle {
            center,
            radius,
            stroke,
            fill,
            shadow_blur,
            opacity,
        } => with_opacity(cr, *opacity, |cr| {
            if let Some(fill) = fill {
                if *shadow_blur > 0.0 {
                    paint_shadow(cr, *center, *radius, *shadow_blur)?;
                }
                set_color(cr, *fill);
                cr.new_path();
                cr.arc(center.x, center.y, *radius, 0.0, TAU);
                cr.fill()?;
            }
            if let Some(stroke) = stroke {
                cr.new_path();
                cr.arc(center.x, center.y, *radius, 0.0, TAU);
                stroke_path(cr, stroke)?;
            }
            Ok(())
        })?,
        DrawItem::Text {
            origin,
            text,
            color,
            size,
            bold,
            width,
            align,
        } => {
            let weight = if *bold { FontWeight::Bold } else { FontWeight::Normal };
            cr.select_font_face(FONT_FAMILY, FontSlant::Normal, weight);
            cr.set_font_size(*size);
            let x = match (align, width) {
                (TextAlign::Center, Some(width)) => origin.x + (width - cr.text_extents(text)?.x_advance()) / 2.0,
                _ => origin.x,
            };
            // `origin` is the top of the text box; cairo draws from the baseline.
            let ascent = cr.font_extents()?.ascent();
            set_color(cr, *color);
            cr.move_to(x, origin.y + ascent);
            cr.show_text(text)?;
            cr.new_path();
        }
    }
    Ok(())
}

fn set_color(cr: &Context, color: TokenColor) {
    let channel = |v: u8| v as f64 / 255.0;
    cr.set_source_rgba(channel(color.r), channel(color.g), channel(color.b), channel(color.a));
}

/// Run `draw` in a group composited at `opacity`, so overlapping parts of
/// one item do not double up.
fn with_opacity(
    cr: &Context,
    opacity: f64,
    draw: impl FnOnce(&Context) -> RenderResult<()>,
) -> RenderResult<()> {
    if opacity >= 1.0 {
        return draw(cr);
    }
    cr.push_group();
    draw(cr)?;
    cr.pop_group_to_source()?;
    cr.paint_with_alpha(opacity.max(0.0))?;
    Ok(())
}

fn stroke_path(cr: &Context, stroke: &StrokeStyle) -> RenderResult<()> {
    set_color(cr, stroke.color);
    cr.set_line_width(stroke.width);
    if stroke.round_caps {
        cr.set_line_cap(LineCap::Round);
        cr.set_line_join(LineJoin::Round);
    } else {
        cr.set_line_cap(LineCap::Butt);
        cr.set_line_join(LineJoin::Miter);
    }
    match &stroke.dash {
        Some(dash) => cr.set_dash(dash, 0.0),
        None => cr.set_dash(&[], 0.0),
    }
    cr.stroke()?;
    Ok(())
}

/// Soft dark halo from the disk edge out to `blur` pixels.
fn paint_shadow(cr: &Context, center: Point, radius: f64, blur: f64) -> RenderResult<()> {
    let shadow = RadialGradient::new(center.x, center.y, radius, center.x, center.y, radius + blur);
    shadow.add_color_stop_rgba(0.0, 0.0, 0.0, 0.0, SHADOW_ALPHA);
    shadow.add_color_stop_rgba(1.0, 0.0, 0.0, 0.0, 0.0);
    cr.set_source(&shadow)?;
    cr.new_path();
    cr.arc(center.x, center.y, radius + blur, 0.0, TAU);
    cr.fill()?;
    Ok(())
}

/// Decode the background and stretch it over `rect`.
fn paint_image(cr: &Context, image: &BackgroundImage, rect: Rect, opacity: f64) -> RenderResult<()> {
    let decoded = image::load_from_memory(image.data())?.to_rgba8();
    let (width, height) = decoded.dimensions();
    frame_len(width, height)?;

    let stride = Format::ARgb32.stride_for_width(width)?;
    let mut data = vec![0u8; stride as usize * height as usize];
    for (x, y, px) in decoded.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let premultiply = |c: u8| (c as u32 * a as u32 + 127) / 255;
        let argb = (a as u32) << 24 | premultiply(r) << 16 | premultiply(g) << 8 | premultiply(b);
        let i = y as usize * stride as usize + x as usize * 4;
        data[i..i + 4].copy_from_slice(&argb.to_ne_bytes());
    }
    let source = ImageSurface::create_for_data(data, Format::ARgb32, width as i32, height as i32, stride)?;

    cr.save()?;
    cr.translate(rect.x0, rect.y0);
    cr.scale(rect.width() / width as f64, rect.height() / height as f64);
    cr.set_source_surface(&source, 0.0, 0.0)?;
    cr.paint_with_alpha(opacity)?;
    cr.restore()?;
    Ok(())
}

/// Add the polyline through `points` to the current path. A positive
/// `tension` bends it into a curve through every point.
fn trace_polyline(cr: &Context, points: &[Point], tension: f64) {
    cr.new_path();
    let Some(first) = points.first() else {
        return;
    };
    cr.move_to(first.x, first.y);
    if tension <= 0.0 || points.len() < 3 {
        for p in &points[1..] {
            cr.line_to(p.x, p.y);
        }
        return;
    }

    // controls[k] brackets interior point k + 1.
    let controls: Vec<(Point, Point)> = points
        .windows(3)
        .map(|w| control_points(w[0], w[1], w[2], tension))
        .collect();
    let n = points.len();
    quad_to(cr, points[0], controls[0].0, points[1]);
    for i in 1..n - 2 {
        let (a, b, end) = (controls[i - 1].1, controls[i].0, points[i + 1]);
        cr.curve_to(a.x, a.y, b.x, b.y, end.x, end.y);
    }
    quad_to(cr, points[n - 2], controls[n - 3].1, points[n - 1]);
}

/// Control points before and after `p1`, scaled by the neighbouring
/// segment lengths.
fn control_points(p0: Point, p1: Point, p2: Point, tension: f64) -> (Point, Point) {
    let d01 = (p1 - p0).hypot();
    let d12 = (p2 - p1).hypot();
    let total = d01 + d12;
    if total == 0.0 {
        return (p1, p1);
    }
    let span = p2 - p0;
    (p1 - span * (tension * d01 / total), p1 + span * (tension * d12 / total))
}

fn quad_to(cr: &Context, from: Point, control: Point, to: Point) {
    let c1 = from + (control - from) * (2.0 / 3.0);
    let c2 = to + (control - to) * (2.0 / 3.0);
    cr.curve_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
}
