//! Edit session state.
//!
//! A session owns the keepout map being edited, a mask of what has been
//! drawn so far, the pending polygon vertices and the current view. It only
//! changes through [`EditSession::dispatch`].

use image::{DynamicImage, GrayImage, Luma, RgbImage};

use crate::error::{KeepoutError, Result};
use crate::geometry::{draw_polyline, fill_disc, fill_polygon, Vertex};
use crate::overlay::{blend, fit_bev_to_map, warp, ViewTransform};

/// Value marking drawn pixels in the mask.
pub const MASK_ON: u8 = 255;

/// Radius of the marker drawn for each clicked vertex.
pub const VERTEX_RADIUS: u32 = 5;

/// Outline thickness of a finished polygon in the mask.
const OUTLINE_THICKNESS: u32 = 2;

/// Keepout map value written inside finished polygons (occupied).
const KEEPOUT_VALUE: u8 = 0;

#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// Adds a polygon vertex at pixel `(x, y)`.
    Click { x: i32, y: i32 },
    /// Closes the pending polygon and bakes it into the keepout map.
    Finish,
    SetView(ViewTransform),
    /// Stops a replay; ignored by [`EditSession::dispatch`].
    Quit,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    background: RgbImage,
    aligned_bev: RgbImage,
    keepout: GrayImage,
    mask: GrayImage,
    vertices: Vec<Vertex>,
    view: ViewTransform,
    zones: usize,
}

impl EditSession {
    /// Starts a session on a grayscale occupancy map, which serves both as
    /// the preview background and as the map to edit.
    pub fn new(map: GrayImage, bev: &RgbImage) -> Self {
        let background = DynamicImage::ImageLuma8(map.clone()).to_rgb8();
        let aligned_bev = fit_bev_to_map(bev, map.width(), map.height());
        let mask = GrayImage::new(map.width(), map.height());
        Self {
            background,
            aligned_bev,
            keepout: map,
            mask,
            vertices: Vec::new(),
            view: ViewTransform::default(),
            zones: 0,
        }
    }

    /// Starts a session with a separate color background.
    pub fn with_background(
        background: RgbImage,
        keepout: GrayImage,
        bev: &RgbImage,
    ) -> Result<Self> {
        if background.dimensions() != keepout.dimensions() {
            return Err(KeepoutError::DimensionMismatch {
                what: "background",
                expected: keepout.dimensions(),
                actual: background.dimensions(),
            });
        }
        let mut session = Self::new(keepout, bev);
        session.background = background;
        Ok(session)
    }

    pub fn dispatch(mut self, event: EditEvent) -> Self {
        match event {
            EditEvent::Click { x, y } => {
                self.vertices.push((x, y));
                fill_disc(&mut self.mask, (x, y), VERTEX_RADIUS, MASK_ON);
            }
            EditEvent::Finish => {
                if self.vertices.is_empty() {
                    return self;
                }
                draw_polyline(
                    &mut self.mask,
                    &self.vertices,
                    true,
                    OUTLINE_THICKNESS,
                    MASK_ON,
                );
                fill_polygon(&mut self.keepout, &self.vertices, KEEPOUT_VALUE);
                self.zones += 1;
                log::debug!(
                    "zone {} baked from {} vertices",
                    self.zones,
                    self.vertices.len()
                );
                self.vertices.clear();
            }
            EditEvent::SetView(view) => {
                let clamped = view.clamped();
                if clamped != view {
                    log::warn!("view {:?} clamped to {:?}", view, clamped);
                }
                self.view = clamped;
            }
            EditEvent::Quit => {}
        }
        self
    }

    /// Applies `events` in order, stopping at the first [`EditEvent::Quit`].
    pub fn replay(self, events: impl IntoIterator<Item = EditEvent>) -> Self {
        let mut session = self;
        for event in events {
            if event == EditEvent::Quit {
                break;
            }
            session = session.dispatch(event);
        }
        session
    }

    /// BEV warped by the current view and blended over the map, with drawn
    /// pixels in red.
    pub fn render_preview(&self) -> Result<RgbImage> {
        let warped = warp(&self.aligned_bev, &self.view);
        blend(&warped, &self.background, self.view.alpha, &self.mask)
    }

    pub fn keepout(&self) -> &GrayImage {
        &self.keepout
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn aligned_bev(&self) -> &RgbImage {
        &self.aligned_bev
    }

    /// Number of polygons baked so far.
    pub fn zones(&self) -> usize {
        self.zones
    }

    pub fn is_drawn(&self, x: u32, y: u32) -> bool {
        self.mask.get_pixel_checked(x, y) == Some(&Luma([MASK_ON]))
    }
}
