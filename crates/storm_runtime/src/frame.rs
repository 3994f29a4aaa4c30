//! Draw half of a frame, shared by the windowed and headless loops.

use storm_core::{overlay_text, Renderer, RendererError, RotationStrategy, SpritePopulation};

/// Clear, draw every sprite in population order, show the stats line and
/// present. Any renderer error ends the frame.
pub fn render(
    renderer: &mut dyn Renderer,
    population: &SpritePopulation,
    strategy: &RotationStrategy,
    fps: f64,
) -> Result<(), RendererError> {
    renderer.begin_frame()?;
    population.draw(&mut *renderer, strategy)?;
    renderer.draw_overlay(&overlay_text(fps, population.len()))?;
    renderer.present()
}
