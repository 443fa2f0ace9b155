//! Crossterm backend that overlays kitty image placements after each draw.
//!
//! Widgets leave sprite cells blank and register a placement per image id.
//! A placement is only re-sent when it moves or its data changes.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crossterm::{cursor::MoveTo, queue, style::Print};
use ratatui::backend::{Backend, ClearType, CrosstermBackend, WindowSize};
use ratatui::buffer::Cell;
use ratatui::layout::{Position, Size};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: u16,
    pub y: u16,
    pub data: String,
}

#[derive(Default, Debug, Clone)]
pub struct SpriteRegistry {
    placements: HashMap<u32, Placement>,
}

impl SpriteRegistry {
    pub fn place(&mut self, id: u32, placement: Placement) {
        self.placements.insert(id, placement);
    }

    pub fn remove(&mut self, id: u32) {
        self.placements.remove(&id);
    }

    pub fn snapshot(&self) -> HashMap<u32, Placement> {
        self.placements.clone()
    }
}

static REGISTRY: OnceLock<Arc<Mutex<SpriteRegistry>>> = OnceLock::new();

pub fn sprite_registry() -> Arc<Mutex<SpriteRegistry>> {
    REGISTRY
        .get_or_init(|| Arc::new(Mutex::new(SpriteRegistry::default())))
        .clone()
}

fn lock(registry: &Mutex<SpriteRegistry>) -> MutexGuard<'_, SpriteRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn place_sprite(id: u32, x: u16, y: u16, data: String) {
    let registry = sprite_registry();
    lock(&registry).place(id, Placement { x, y, data });
}

pub fn remove_sprite(id: u32) {
    let registry = sprite_registry();
    lock(&registry).remove(id);
}

/// Ids to delete and ids to draw when going from `shown` to `next`, sorted.
pub fn plan_redraw(
    shown: &HashMap<u32, Placement>,
    next: &HashMap<u32, Placement>,
) -> (Vec<u32>, Vec<u32>) {
    let mut stale: Vec<u32> = shown
        .iter()
        .filter(|&(id, old)| next.get(id) != Some(old))
        .map(|(id, _)| *id)
        .collect();
    let mut fresh: Vec<u32> = next
        .iter()
        .filter(|&(id, new)| shown.get(id) != Some(new))
        .map(|(id, _)| *id)
        .collect();
    stale.sort_unstable();
    fresh.sort_unstable();
    (stale, fresh)
}

#[derive(Debug, Clone)]
pub struct SpriteBackend<W: Write> {
    inner: CrosstermBackend<W>,
    registry: Arc<Mutex<SpriteRegistry>>,
    shown: HashMap<u32, Placement>,
}

impl<W: Write> SpriteBackend<W> {
    pub fn new(writer: W, registry: Arc<Mutex<SpriteRegistry>>) -> Self {
        Self {
            inner: CrosstermBackend::new(writer),
            registry,
            shown: HashMap::new(),
        }
    }
}

impl<W: Write> Backend for SpriteBackend<W> {
    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        self.inner.draw(content)?;
        let next = lock(&self.registry).snapshot();
        let (stale, fresh) = plan_redraw(&self.shown, &next);

        for id in stale {
            queue!(self.inner, Print(format!("\x1b_Ga=d,d=I,i={id}\x1b\\")))?;
        }
        for id in fresh {
            if let Some(placement) = next.get(&id) {
                queue!(
                    self.inner,
                    MoveTo(placement.x, placement.y),
                    Print(&placement.data)
                )?;
            }
        }
        self.shown = next;
        Ok(())
    }

    fn append_lines(&mut self, n: u16) -> io::Result<()> {
        self.inner.append_lines(n)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        self.inner.get_cursor_position()
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        self.inner.set_cursor_position(position)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.clear()
    }

    fn clear_region(&mut self, clear_type: ClearType) -> io::Result<()> {
        self.inner.clear_region(clear_type)
    }

    fn size(&self) -> io::Result<Size> {
        self.inner.size()
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        self.inner.window_size()
    }

    fn flush(&mut self) -> io::Result<()> {
        Backend::flush(&mut self.inner)
    }
}

impl<W: Write> Write for SpriteBackend<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: u16, data: &str) -> Placement {
        Placement {
            x,
            y: 4,
            data: data.to_string(),
        }
    }

    #[test]
    fn unchanged_placements_are_not_resent() {
        let shown = HashMap::from([(1, at(2, "left")), (2, at(40, "right"))]);
        let (stale, fresh) = plan_redraw(&shown, &shown.clone());
        assert!(stale.is_empty());
        assert!(fresh.is_empty());
    }

    #[test]
    fn moved_or_swapped_images_are_replaced() {
        let shown = HashMap::from([(1, at(2, "left")), (2, at(40, "right"))]);
        let next = HashMap::from([(1, at(3, "left")), (2, at(40, "other"))]);
        assert_eq!(plan_redraw(&shown, &next), (vec![1, 2], vec![1, 2]));
    }

    #[test]
    fn emptied_slot_is_deleted_only() {
        let shown = HashMap::from([(1, at(2, "left")), (2, at(40, "right"))]);
        let next = HashMap::from([(1, at(2, "left"))]);
        assert_eq!(plan_redraw(&shown, &next), (vec![2], vec![]));
    }

    #[test]
    fn registry_replaces_by_id() {
        let mut registry = SpriteRegistry::default();
        registry.place(1, at(2, "a"));
        registry.place(1, at(2, "b"));
        registry.place(2, at(40, "c"));
        registry.remove(2);
        assert_eq!(registry.snapshot(), HashMap::from([(1, at(2, "b"))]));
    }
}
