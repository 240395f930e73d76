#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! PNG rasterizer for blended hex cells.
//!
//! Projects WGS84 cell polygons into pixel space with an equal-aspect
//! bounding-box fit, scanline-fills each hexagon with its blended
//! colour, then strokes the cell edges. Latitude/longitude degrees are
//! used as planar coordinates, matching the geometry the cells were
//! exported in.

use std::path::Path;

use bloom_map_flora_models::FlowerColor;
use geo::{BoundingRect, Coord, Polygon, Rect};
use image::{Rgb, RgbImage};

/// Errors that can occur while rasterizing cells.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No cell polygons were provided; empty months are skipped by the
    /// caller, so there is nothing meaningful to frame.
    #[error("no cell polygons to render")]
    Empty,

    /// PNG encode or write failed.
    #[error("image write error: {0}")]
    Image(#[from] image::ImageError),
}

/// One cell ready for rasterization.
#[derive(Debug, Clone)]
pub struct CellShape {
    /// Cell boundary in (x=longitude, y=latitude) order.
    pub boundary: Polygon<f64>,
    /// Blended fill colour.
    pub fill: FlowerColor,
}

/// Raster output configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Canvas width in pixels; height follows the data aspect ratio.
    pub width: u32,
    /// Fraction of the data extent added as margin on each side.
    pub margin: f64,
    /// Canvas background colour.
    pub background: Rgb<u8>,
    /// Cell edge stroke colour.
    pub edge: Rgb<u8>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 2048,
            margin: 0.02,
            background: Rgb([255, 255, 255]),
            edge: Rgb([0, 0, 0]),
        }
    }
}

/// Rasterizes the cells onto a fresh canvas.
///
/// All fills are painted before any edges so shared borders are not
/// overdrawn by a neighbour's fill.
///
/// # Errors
///
/// Returns an error if `cells` is empty.
pub fn render_cells(cells: &[CellShape], config: &RenderConfig) -> Result<RgbImage, RenderError> {
    let extent = data_extent(cells).ok_or(RenderError::Empty)?;
    let projection = Projection::fit(&extent, config);

    let mut image = RgbImage::from_pixel(projection.width, projection.height, config.background);

    for cell in cells {
        let corners = projection.corners(&cell.boundary);
        fill_polygon(
            &mut image,
            &corners,
            Rgb([cell.fill.r, cell.fill.g, cell.fill.b]),
        );
    }
    for cell in cells {
        let corners = projection.corners(&cell.boundary);
        stroke_polygon(&mut image, &corners, config.edge);
    }

    Ok(image)
}

/// Renders the cells and writes the PNG in one step.
///
/// # Errors
///
/// Returns an error if `cells` is empty or the file cannot be written.
pub fn save_png(cells: &[CellShape], config: &RenderConfig, path: &Path) -> Result<(), RenderError> {
    let image = render_cells(cells, config)?;
    image.save(path)?;
    Ok(())
}

/// Union of the cells' bounding rectangles.
fn data_extent(cells: &[CellShape]) -> Option<Rect<f64>> {
    cells
        .iter()
        .filter_map(|cell| cell.boundary.bounding_rect())
        .reduce(|merged, rect| {
            Rect::new(
                Coord {
                    x: merged.min().x.min(rect.min().x),
                    y: merged.min().y.min(rect.min().y),
                },
                Coord {
                    x: merged.max().x.max(rect.max().x),
                    y: merged.max().y.max(rect.max().y),
                },
            )
        })
}

/// Degree-space to pixel-space mapping for one render.
struct Projection {
    min_x: f64,
    max_y: f64,
    scale: f64,
    width: u32,
    height: u32,
}

impl Projection {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn fit(extent: &Rect<f64>, config: &RenderConfig) -> Self {
        let pad_x = extent.width() * config.margin;
        let pad_y = extent.height() * config.margin;

        let min_x = extent.min().x - pad_x;
        let max_y = extent.max().y + pad_y;
        let span_x = (extent.width() + 2.0 * pad_x).max(f64::EPSILON);
        let span_y = (extent.height() + 2.0 * pad_y).max(f64::EPSILON);

        let scale = f64::from(config.width) / span_x;
        let height = ((span_y * scale).ceil() as u32).max(1);

        Self {
            min_x,
            max_y,
            scale,
            width: config.width,
            height,
        }
    }

    /// Pixel y grows downward, so latitude is flipped.
    #[allow(clippy::cast_possible_truncation)]
    fn to_pixel(&self, coord: Coord<f64>) -> (i64, i64) {
        let x = ((coord.x - self.min_x) * self.scale) as i64;
        let y = ((self.max_y - coord.y) * self.scale) as i64;
        (x, y)
    }

    fn corners(&self, boundary: &Polygon<f64>) -> Vec<(i64, i64)> {
        boundary
            .exterior()
            .coords()
            .map(|&coord| self.to_pixel(coord))
            .collect()
    }
}

/// Even-odd scanline fill, clipped to the canvas.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_polygon(image: &mut RgbImage, corners: &[(i64, i64)], colour: Rgb<u8>) {
    if corners.len() < 3 {
        return;
    }

    let width = i64::from(image.width());
    let height = i64::from(image.height());

    let min_y = corners.iter().map(|&(_, y)| y).min().unwrap_or(0).max(0);
    let max_y = corners
        .iter()
        .map(|&(_, y)| y)
        .max()
        .unwrap_or(0)
        .min(height - 1);

    for y in min_y..=max_y {
        let mut crossings = Vec::new();

        for i in 0..corners.len() {
            let (x1, y1) = corners[i];
            let (x2, y2) = corners[(i + 1) % corners.len()];

            if (y1 <= y && y2 > y) || (y2 <= y && y1 > y) {
                crossings.push(x1 + (y - y1) * (x2 - x1) / (y2 - y1));
            }
        }

        crossings.sort_unstable();
        for pair in crossings.chunks(2) {
            let &[start, end] = pair else { continue };
            let from = start.max(0);
            let to = end.min(width - 1);
            for x in from..=to {
                image.put_pixel(x as u32, y as u32, colour);
            }
        }
    }
}

/// Strokes the polygon outline edge by edge.
fn stroke_polygon(image: &mut RgbImage, corners: &[(i64, i64)], colour: Rgb<u8>) {
    for i in 0..corners.len() {
        draw_line(image, corners[i], corners[(i + 1) % corners.len()], colour);
    }
}

/// Bresenham line, clipped per pixel.
fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), colour: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_clipped(image, x, y, colour);
        if x == to.0 && y == to.1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn put_pixel_clipped(image: &mut RgbImage, x: i64, y: i64, colour: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(image.width()) && y < i64::from(image.height()) {
        image.put_pixel(x as u32, y as u32, colour);
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, polygon};

    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]
    }

    #[test]
    fn fill_covers_interior_not_exterior() {
        let mut image = RgbImage::from_pixel(20, 20, WHITE);
        let corners = [(5, 5), (15, 5), (15, 15), (5, 15)];

        fill_polygon(&mut image, &corners, RED);

        assert_eq!(*image.get_pixel(10, 10), RED);
        assert_eq!(*image.get_pixel(5, 5), RED);
        assert_eq!(*image.get_pixel(2, 10), WHITE);
        assert_eq!(*image.get_pixel(10, 17), WHITE);
    }

    #[test]
    fn fill_clips_to_canvas() {
        let mut image = RgbImage::from_pixel(10, 10, WHITE);
        let corners = [(-5, -5), (15, -5), (15, 15), (-5, 15)];

        fill_polygon(&mut image, &corners, RED);

        assert_eq!(*image.get_pixel(0, 0), RED);
        assert_eq!(*image.get_pixel(9, 9), RED);
    }

    #[test]
    fn line_connects_endpoints() {
        let mut image = RgbImage::from_pixel(10, 10, WHITE);

        draw_line(&mut image, (1, 1), (8, 8), Rgb([0, 0, 0]));

        assert_eq!(*image.get_pixel(1, 1), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(4, 4), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(8, 8), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(8, 1), WHITE);
    }

    #[test]
    fn renders_cell_fill_and_background() {
        let cells = [CellShape {
            boundary: unit_square(),
            fill: FlowerColor::rgb(0, 128, 0),
        }];
        let config = RenderConfig {
            width: 100,
            margin: 0.1,
            ..RenderConfig::default()
        };

        let image = render_cells(&cells, &config).unwrap();

        assert_eq!(image.width(), 100);
        let (cx, cy) = (image.width() / 2, image.height() / 2);
        assert_eq!(*image.get_pixel(cx, cy), Rgb([0, 128, 0]));
        // Margin stays background.
        assert_eq!(*image.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn canvas_height_follows_aspect_ratio() {
        let wide = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 1.0), (0.0, 1.0)]),
            Vec::new(),
        );
        let cells = [CellShape {
            boundary: wide,
            fill: FlowerColor::rgb(10, 20, 30),
        }];
        let config = RenderConfig {
            width: 400,
            margin: 0.0,
            ..RenderConfig::default()
        };

        let image = render_cells(&cells, &config).unwrap();
        assert_eq!(image.width(), 400);
        assert_eq!(image.height(), 100);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            render_cells(&[], &RenderConfig::default()),
            Err(RenderError::Empty)
        ));
    }
}
