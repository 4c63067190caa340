//! Seam between the render pipeline and the shared display server.
//!
//! Everything the pipeline needs from the windowing system goes through [`DisplayServer`]:
//! persistent surfaces, root window properties, the server grab and the root background.
//! [`DisplayContext`] wraps one connection together with the facts queried once at startup.

use image::RgbImage;

use crate::{
    foundation::{
        core::{Rect, Rgb, Size},
        error::{BackdropError, BackdropResult},
    },
    render::target::Blit,
};

/// Server-side id of a drawing surface (an X pixmap id).
pub type SurfaceId = u32;

/// Legacy property naming the published background surface.
pub const ESETROOT_PMAP_ID: &str = "ESETROOT_PMAP_ID";
/// Property read by pseudo-transparent clients for the current background surface.
pub const XROOTPMAP_ID: &str = "_XROOTPMAP_ID";

/// What the root window paints behind everything else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RootBackground {
    #[default]
    None,
    Color(Rgb),
    Surface(SurfaceId),
}

/// Operations on a shared display server.
///
/// Implementations forward to a real server (X11) or simulate one in memory. Each value is one
/// client connection; the grab excludes every other connection until released.
pub trait DisplayServer: Send {
    fn screen_size(&self) -> Size;

    fn depth(&self) -> u8;

    /// Create a surface that outlives this connection.
    fn create_persistent_surface(&mut self, size: Size, depth: u8) -> BackdropResult<SurfaceId>;

    fn put_rgb(&mut self, surface: SurfaceId, image: &RgbImage, blit: Blit) -> BackdropResult<()>;

    fn fill_rect(&mut self, surface: SurfaceId, rect: Rect, color: Rgb) -> BackdropResult<()>;

    fn grab(&mut self) -> BackdropResult<()>;

    fn ungrab(&mut self) -> BackdropResult<()>;

    /// Surface id stored in a root window property, if it exists and has the right shape.
    fn root_property(&mut self, name: &str) -> BackdropResult<Option<SurfaceId>>;

    fn set_root_property(&mut self, name: &str, surface: SurfaceId) -> BackdropResult<()>;

    fn delete_root_property(&mut self, name: &str) -> BackdropResult<()>;

    /// Ask the server to release every resource of the client owning `surface`.
    fn kill_surface_owner(&mut self, surface: SurfaceId) -> BackdropResult<()>;

    fn set_root_background(&mut self, background: RootBackground) -> BackdropResult<()>;

    /// Repaint the whole root window from its background.
    fn clear_root(&mut self) -> BackdropResult<()>;

    /// Whether a desktop shell already draws the background (a file manager desktop window).
    fn desktop_shell_running(&mut self) -> BackdropResult<bool>;

    fn flush(&mut self) -> BackdropResult<()> {
        Ok(())
    }
}

/// One display connection plus the state the pipeline reads from it.
pub struct DisplayContext {
    display: Box<dyn DisplayServer>,
    screen: Size,
    depth: u8,
    desktop_shell: bool,
}

impl DisplayContext {
    /// Query the screen and the desktop shell check once.
    #[tracing::instrument(skip_all)]
    pub fn new(mut display: Box<dyn DisplayServer>) -> BackdropResult<Self> {
        let screen = display.screen_size();
        if screen.is_empty() {
            return Err(BackdropError::display(format!(
                "display reports an empty screen ({}x{})",
                screen.width, screen.height
            )));
        }
        let depth = display.depth();
        let desktop_shell = display.desktop_shell_running()?;
        tracing::debug!(
            width = screen.width,
            height = screen.height,
            depth,
            desktop_shell,
            "display context ready"
        );
        Ok(Self {
            display,
            screen,
            depth,
            desktop_shell,
        })
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Cached result of [`DisplayServer::desktop_shell_running`].
    pub fn desktop_shell_running(&self) -> bool {
        self.desktop_shell
    }

    pub fn display(&mut self) -> &mut dyn DisplayServer {
        self.display.as_mut()
    }
}

impl std::fmt::Debug for DisplayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayContext")
            .field("screen", &self.screen)
            .field("depth", &self.depth)
            .field("desktop_shell", &self.desktop_shell)
            .finish_non_exhaustive()
    }
}
