use std::{
    collections::BTreeMap,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
};

use image::RgbImage;

use crate::{
    foundation::{
        core::{Rect, Rgb, Size},
        error::{BackdropError, BackdropResult},
    },
    render::target::{Blit, DrawTarget},
    surface::display::{DisplayServer, RootBackground, SurfaceId},
};

/// In-process display server shared by any number of client connections.
///
/// Each [`MemoryDisplay`] value is one connection; [`MemoryDisplay::connect`] opens another one
/// onto the same server. The grab blocks every other connection until released, so
/// participants running on different threads are serialized the way a real server would.
pub struct MemoryDisplay {
    shared: Arc<Shared>,
    client: u32,
    grabbed: bool,
}

struct Shared {
    state: Mutex<State>,
    released: Condvar,
}

#[derive(Debug)]
struct State {
    screen: Size,
    depth: u8,
    next_client: u32,
    next_surface: SurfaceId,
    surfaces: BTreeMap<SurfaceId, MemorySurface>,
    destroyed: BTreeMap<SurfaceId, usize>,
    kill_requests: usize,
    properties: BTreeMap<String, SurfaceId>,
    background: RootBackground,
    root_clears: usize,
    grab: Option<u32>,
    desktop_shell: bool,
    fail_property_writes: bool,
}

#[derive(Debug)]
struct MemorySurface {
    owner: u32,
    pixels: RgbImage,
}

impl MemoryDisplay {
    pub fn new(screen: Size) -> Self {
        let state = State {
            screen,
            depth: 24,
            next_client: 1,
            next_surface: 0x0040_0001,
            surfaces: BTreeMap::new(),
            destroyed: BTreeMap::new(),
            kill_requests: 0,
            properties: BTreeMap::new(),
            background: RootBackground::None,
            root_clears: 0,
            grab: None,
            desktop_shell: false,
            fail_property_writes: false,
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                released: Condvar::new(),
            }),
            client: 0,
            grabbed: false,
        }
    }

    /// Open another client connection to the same server.
    pub fn connect(&self) -> Self {
        let client = {
            let mut state = self.inspect();
            let id = state.next_client;
            state.next_client += 1;
            id
        };
        Self {
            shared: Arc::clone(&self.shared),
            client,
            grabbed: false,
        }
    }

    pub fn set_desktop_shell_running(&self, running: bool) {
        self.inspect().desktop_shell = running;
    }

    /// Make every root property write fail until reset.
    pub fn set_fail_property_writes(&self, fail: bool) {
        self.inspect().fail_property_writes = fail;
    }

    pub fn surface_pixels(&self, surface: SurfaceId) -> Option<RgbImage> {
        self.inspect()
            .surfaces
            .get(&surface)
            .map(|s| s.pixels.clone())
    }

    pub fn is_alive(&self, surface: SurfaceId) -> bool {
        self.inspect().surfaces.contains_key(&surface)
    }

    pub fn live_surfaces(&self) -> Vec<SurfaceId> {
        self.inspect().surfaces.keys().copied().collect()
    }

    /// How many times `surface` was destroyed by killing its owner.
    pub fn destroyed_count(&self, surface: SurfaceId) -> usize {
        self.inspect().destroyed.get(&surface).copied().unwrap_or(0)
    }

    pub fn kill_requests(&self) -> usize {
        self.inspect().kill_requests
    }

    pub fn property(&self, name: &str) -> Option<SurfaceId> {
        self.inspect().properties.get(name).copied()
    }

    pub fn background(&self) -> RootBackground {
        self.inspect().background
    }

    pub fn root_clears(&self) -> usize {
        self.inspect().root_clears
    }

    pub fn is_grabbed(&self) -> bool {
        self.inspect().grab.is_some()
    }

    /// Root window pixel as painted from its background; surfaces are tiled from the origin.
    pub fn root_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let state = self.inspect();
        match state.background {
            RootBackground::None => None,
            RootBackground::Color(c) => Some(c),
            RootBackground::Surface(id) => {
                let pixels = &state.surfaces.get(&id)?.pixels;
                if pixels.width() == 0 || pixels.height() == 0 {
                    return None;
                }
                let px = pixels.get_pixel(x % pixels.width(), y % pixels.height());
                Some(Rgb::from(px.0))
            }
        }
    }

    fn inspect(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the server, waiting while another connection holds the grab.
    fn lock(&self) -> BackdropResult<MutexGuard<'_, State>> {
        let poisoned = |_| BackdropError::display("memory display state poisoned");
        let mut state = self.shared.state.lock().map_err(poisoned)?;
        while state.grab.is_some_and(|owner| owner != self.client) {
            state = self.shared.released.wait(state).map_err(poisoned)?;
        }
        Ok(state)
    }

    fn release_grab(&mut self, state: &mut State) {
        if state.grab == Some(self.client) {
            state.grab = None;
            self.shared.released.notify_all();
        }
        self.grabbed = false;
    }
}

impl State {
    fn surface_mut(&mut self, surface: SurfaceId) -> BackdropResult<&mut RgbImage> {
        self.surfaces
            .get_mut(&surface)
            .map(|s| &mut s.pixels)
            .ok_or_else(|| BackdropError::display(format!("bad drawable 0x{surface:x}")))
    }

    fn check_property_write(&self, name: &str) -> BackdropResult<()> {
        if self.fail_property_writes {
            return Err(BackdropError::display(format!(
                "ChangeProperty({name}) rejected"
            )));
        }
        Ok(())
    }
}

impl DisplayServer for MemoryDisplay {
    fn screen_size(&self) -> Size {
        self.inspect().screen
    }

    fn depth(&self) -> u8 {
        self.inspect().depth
    }

    fn create_persistent_surface(&mut self, size: Size, depth: u8) -> BackdropResult<SurfaceId> {
        let mut state = self.lock()?;
        if size.is_empty() {
            return Err(BackdropError::display(format!(
                "cannot create a {}x{} surface",
                size.width, size.height
            )));
        }
        if depth != state.depth {
            return Err(BackdropError::display(format!(
                "depth {depth} does not match the screen depth {}",
                state.depth
            )));
        }
        // Retained resources belong to a dedicated client that outlives this connection.
        let owner = state.next_client;
        state.next_client += 1;
        let id = state.next_surface;
        state.next_surface += 1;
        state.surfaces.insert(
            id,
            MemorySurface {
                owner,
                pixels: RgbImage::new(size.width, size.height),
            },
        );
        Ok(id)
    }

    fn put_rgb(&mut self, surface: SurfaceId, image: &RgbImage, blit: Blit) -> BackdropResult<()> {
        let mut state = self.lock()?;
        state.surface_mut(surface)?.put_image(image, blit)
    }

    fn fill_rect(&mut self, surface: SurfaceId, rect: Rect, color: Rgb) -> BackdropResult<()> {
        let mut state = self.lock()?;
        state.surface_mut(surface)?.fill_rect(rect, color)
    }

    fn grab(&mut self) -> BackdropResult<()> {
        let mut state = self.lock()?;
        state.grab = Some(self.client);
        drop(state);
        self.grabbed = true;
        Ok(())
    }

    fn ungrab(&mut self) -> BackdropResult<()> {
        let shared = Arc::clone(&self.shared);
        let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.release_grab(&mut state);
        Ok(())
    }

    fn root_property(&mut self, name: &str) -> BackdropResult<Option<SurfaceId>> {
        Ok(self.lock()?.properties.get(name).copied())
    }

    fn set_root_property(&mut self, name: &str, surface: SurfaceId) -> BackdropResult<()> {
        let mut state = self.lock()?;
        state.check_property_write(name)?;
        state.properties.insert(name.to_string(), surface);
        Ok(())
    }

    fn delete_root_property(&mut self, name: &str) -> BackdropResult<()> {
        let mut state = self.lock()?;
        state.check_property_write(name)?;
        state.properties.remove(name);
        Ok(())
    }

    fn kill_surface_owner(&mut self, surface: SurfaceId) -> BackdropResult<()> {
        let mut state = self.lock()?;
        state.kill_requests += 1;
        let Some(owner) = state.surfaces.get(&surface).map(|s| s.owner) else {
            tracing::debug!(surface, "kill of unknown resource ignored");
            return Ok(());
        };
        let doomed: Vec<SurfaceId> = state
            .surfaces
            .iter()
            .filter(|(_, s)| s.owner == owner)
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            state.surfaces.remove(&id);
            *state.destroyed.entry(id).or_insert(0) += 1;
            if state.background == RootBackground::Surface(id) {
                state.background = RootBackground::None;
            }
        }
        Ok(())
    }

    fn set_root_background(&mut self, background: RootBackground) -> BackdropResult<()> {
        let mut state = self.lock()?;
        if let RootBackground::Surface(id) = background {
            if !state.surfaces.contains_key(&id) {
                return Err(BackdropError::display(format!("bad pixmap 0x{id:x}")));
            }
        }
        state.background = background;
        Ok(())
    }

    fn clear_root(&mut self) -> BackdropResult<()> {
        self.lock()?.root_clears += 1;
        Ok(())
    }

    fn desktop_shell_running(&mut self) -> BackdropResult<bool> {
        Ok(self.lock()?.desktop_shell)
    }
}

impl Drop for MemoryDisplay {
    fn drop(&mut self) {
        if self.grabbed {
            let shared = Arc::clone(&self.shared);
            let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
            self.release_grab(&mut state);
        }
    }
}

impl std::fmt::Debug for MemoryDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDisplay")
            .field("client", &self.client)
            .field("grabbed", &self.grabbed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/memory.rs"]
mod tests;
