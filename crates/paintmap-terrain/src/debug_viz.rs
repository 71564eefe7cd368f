//! Map previews: 2D images of surface height and resolved regions.
//!
//! Provides [`DebugImage`], the colour ramps, and [`PreviewCanvas`], which
//! assembles sampled tiles into full preview images. Useful for checking a
//! painted map set before generating a world from it.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    PreviewArea, PreviewCanvas, height_to_color, region_color, render_elevation_preview,
    render_region_preview,
};
