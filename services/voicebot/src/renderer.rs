//! Top-down text rendering of the scene.

use std::io::Write;
use voicebot_core::{SceneSnapshot, SceneState, collaborator::SceneRenderer};

const LIGHT_BAR_WIDTH: usize = 10;

/// Draws a top-down grid of the floor, one cell per unit, forward pointing up.
///
/// Only redraws when the scene differs from the last frame it drew.
pub struct TextRenderer<W: Write> {
    out: W,
    last_frame: Option<SceneSnapshot>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_frame: None,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn cell_index(coordinate: f32, half_extent: f32, cells: usize) -> Option<usize> {
    let index = (coordinate + half_extent).floor();
    (index >= 0.0 && (index as usize) < cells).then_some(index as usize)
}

/// Lays out the grid rows for a snapshot. Items are drawn with their initial,
/// the actor as `@` on top of anything it shares a cell with.
pub fn draw_grid(snapshot: &SceneSnapshot) -> Vec<String> {
    let half = snapshot.floor_half_extent;
    let cells = (half * 2.0).round().max(1.0) as usize;
    let mut grid = vec![vec!['.'; cells]; cells];

    let mut place = |position: [f32; 3], glyph: char| {
        if let (Some(col), Some(row)) = (
            cell_index(position[0], half, cells),
            cell_index(position[2], half, cells),
        ) {
            grid[row][col] = glyph;
        }
    };
    for item in &snapshot.items {
        let glyph = item
            .name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?');
        place(item.position, glyph);
    }
    place(snapshot.actor_position, '@');

    grid.into_iter()
        .map(|row| row.into_iter().map(|c| format!("{} ", c)).collect::<String>().trim_end().to_string())
        .collect()
}

fn light_bar(intensity: f32) -> String {
    let filled = ((intensity.clamp(0.0, 1.0) * LIGHT_BAR_WIDTH as f32).round()) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        " ".repeat(LIGHT_BAR_WIDTH - filled)
    )
}

impl<W: Write> SceneRenderer for TextRenderer<W> {
    fn render(&mut self, scene: &SceneState) -> anyhow::Result<()> {
        let snapshot = scene.snapshot();
        if self.last_frame.as_ref() == Some(&snapshot) {
            return Ok(());
        }

        let [x, y, z] = snapshot.actor_position;
        writeln!(self.out)?;
        for row in draw_grid(&snapshot) {
            writeln!(self.out, "  {}", row)?;
        }
        writeln!(
            self.out,
            "  robot ({:.1}, {:.1}, {:.1})  light {:.2} {}",
            x,
            y,
            z,
            snapshot.light_intensity,
            light_bar(snapshot.light_intensity)
        )?;
        self.out.flush()?;

        self.last_frame = Some(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_grid_places_actor_and_items() {
        let rows = draw_grid(&SceneState::default().snapshot());
        assert_eq!(rows.len(), 10);
        // Actor at the origin sits in the cell just right of and below the centre line.
        assert_eq!(rows[5].split(' ').nth(5), Some("@"));
        // keys (2, 0, -1) -> column 7, row 4
        assert_eq!(rows[4].split(' ').nth(7), Some("K"));
        // remote (-2, 0, 1) -> column 3, row 6
        assert_eq!(rows[6].split(' ').nth(3), Some("R"));
        // phone (0, 0, 2) -> column 5, row 7
        assert_eq!(rows[7].split(' ').nth(5), Some("P"));
    }

    #[test]
    fn test_light_bar() {
        assert_eq!(light_bar(0.8), "[########  ]");
        assert_eq!(light_bar(0.1), "[#         ]");
        assert_eq!(light_bar(3.0), "[##########]");
    }

    #[test]
    fn test_render_skips_unchanged_frames() {
        let scene = SceneState::default();
        let mut renderer = TextRenderer::new(Vec::new());

        renderer.render(&scene).unwrap();
        let first_len = renderer.out.len();
        assert!(first_len > 0);

        renderer.render(&scene).unwrap();
        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output.len(), first_len);
        assert!(output.contains("robot (0.0, 0.0, 0.0)  light 0.80"));
    }
}
