//! X11 display server over `xcb`.
//!
//! Persistent surfaces are pixmaps created on a throwaway connection switched to
//! `RetainPermanent` close-down mode, so they survive both that connection and this process.
//! Killing the client of such a pixmap (`KillClient`) is what frees it.

use std::collections::BTreeMap;

use image::RgbImage;
use xcb::{Xid, x};

use crate::{
    foundation::{
        core::{Rect, Rgb, Size},
        error::{BackdropError, BackdropResult},
    },
    render::target::Blit,
    surface::display::{DisplayServer, RootBackground, SurfaceId},
};

const NAUTILUS_DESKTOP_WINDOW_ID: &str = "NAUTILUS_DESKTOP_WINDOW_ID";

pub struct X11Display {
    conn: xcb::Connection,
    display_name: Option<String>,
    root: x::Window,
    size: Size,
    depth: u8,
    rgb_shifts: (u8, u8, u8),
    gc: x::Gcontext,
    surfaces: BTreeMap<SurfaceId, x::Pixmap>,
}

fn x_err<E: std::fmt::Display>(what: &'static str) -> impl Fn(E) -> BackdropError {
    move |e| BackdropError::display(format!("{what}: {e}"))
}

impl X11Display {
    /// Connect to `display_name` (or `$DISPLAY`).
    #[tracing::instrument]
    pub fn open(display_name: Option<&str>) -> BackdropResult<Self> {
        let (conn, screen_num) =
            xcb::Connection::connect(display_name).map_err(x_err("connect to X display"))?;

        let (root, size, depth, rgb_shifts) = {
            let screen = usize::try_from(screen_num)
                .ok()
                .and_then(|n| conn.get_setup().roots().nth(n))
                .ok_or_else(|| BackdropError::display(format!("bad screen number {screen_num}")))?;
            (
                screen.root(),
                Size::new(
                    u32::from(screen.width_in_pixels()),
                    u32::from(screen.height_in_pixels()),
                ),
                screen.root_depth(),
                rgb_shifts(screen)?,
            )
        };

        let gc: x::Gcontext = conn.generate_id();
        conn.send_and_check_request(&x::CreateGc {
            cid: gc,
            drawable: x::Drawable::Window(root),
            value_list: &[],
        })
        .map_err(x_err("CreateGc"))?;

        tracing::debug!(
            screen = screen_num,
            width = size.width,
            height = size.height,
            depth,
            "connected to X display"
        );
        Ok(Self {
            conn,
            display_name: display_name.map(str::to_string),
            root,
            size,
            depth,
            rgb_shifts,
            gc,
            surfaces: BTreeMap::new(),
        })
    }

    fn pixel(&self, c: Rgb) -> u32 {
        let (r, g, b) = self.rgb_shifts;
        (u32::from(c.r) << r) | (u32::from(c.g) << g) | (u32::from(c.b) << b)
    }

    fn pixmap(&self, surface: SurfaceId) -> BackdropResult<x::Pixmap> {
        self.surfaces
            .get(&surface)
            .copied()
            .ok_or_else(|| BackdropError::display(format!("unknown surface 0x{surface:x}")))
    }

    fn atom(&self, name: &str, create: bool) -> BackdropResult<Option<x::Atom>> {
        let cookie = self.conn.send_request(&x::InternAtom {
            only_if_exists: !create,
            name: name.as_bytes(),
        });
        let atom = self
            .conn
            .wait_for_reply(cookie)
            .map_err(x_err("InternAtom"))?
            .atom();
        Ok((!atom.is_none()).then_some(atom))
    }

    fn max_request_bytes(&self) -> usize {
        self.conn.get_maximum_request_length() as usize * 4
    }
}

/// Channel shifts of the root visual; only 24/32-bit TrueColor is supported.
fn rgb_shifts(screen: &x::Screen) -> BackdropResult<(u8, u8, u8)> {
    let depth = screen.root_depth();
    let visual = screen
        .allowed_depths()
        .filter(|d| d.depth() == depth)
        .flat_map(|d| d.visuals())
        .find(|v| v.visual_id() == screen.root_visual())
        .ok_or_else(|| BackdropError::display("root visual not found"))?;
    if visual.class() != x::VisualClass::TrueColor || (depth != 24 && depth != 32) {
        return Err(BackdropError::display(format!(
            "unsupported visual: {depth}-bit {:?}",
            visual.class()
        )));
    }
    Ok((
        visual.red_mask().trailing_zeros() as u8,
        visual.green_mask().trailing_zeros() as u8,
        visual.blue_mask().trailing_zeros() as u8,
    ))
}

fn to_u16(v: u32) -> BackdropResult<u16> {
    u16::try_from(v).map_err(|_| BackdropError::display(format!("{v} exceeds the X11 limit")))
}

fn to_i16(v: i64) -> BackdropResult<i16> {
    i16::try_from(v).map_err(|_| BackdropError::display(format!("{v} exceeds the X11 limit")))
}

impl DisplayServer for X11Display {
    fn screen_size(&self) -> Size {
        self.size
    }

    fn depth(&self) -> u8 {
        self.depth
    }

    fn create_persistent_surface(&mut self, size: Size, depth: u8) -> BackdropResult<SurfaceId> {
        let (retained, _) = xcb::Connection::connect(self.display_name.as_deref())
            .map_err(x_err("connect retaining X client"))?;
        let pixmap: x::Pixmap = retained.generate_id();
        retained
            .send_and_check_request(&x::CreatePixmap {
                depth,
                pid: pixmap,
                drawable: x::Drawable::Window(self.root),
                width: to_u16(size.width)?,
                height: to_u16(size.height)?,
            })
            .map_err(x_err("CreatePixmap"))?;
        retained
            .send_and_check_request(&x::SetCloseDownMode {
                mode: x::CloseDown::RetainPermanent,
            })
            .map_err(x_err("SetCloseDownMode"))?;
        drop(retained);

        let id = pixmap.resource_id();
        self.surfaces.insert(id, pixmap);
        Ok(id)
    }

    fn put_rgb(&mut self, surface: SurfaceId, image: &RgbImage, blit: Blit) -> BackdropResult<()> {
        let pixmap = self.pixmap(surface)?;
        let src = Size::new(image.width(), image.height());
        let Some(b) = blit.clip(src, Size::new(u32::from(u16::MAX), u32::from(u16::MAX))) else {
            return Ok(());
        };

        let row_bytes = b.width as usize * 4;
        let rows_per_request = (self.max_request_bytes().saturating_sub(64) / row_bytes).max(1);
        let mut row = 0u32;
        while row < b.height {
            let rows = (b.height - row).min(rows_per_request as u32);
            let mut data = Vec::with_capacity(rows as usize * b.width as usize);
            for y in b.src_y + row..b.src_y + row + rows {
                for x in b.src_x..b.src_x + b.width {
                    data.push(self.pixel(Rgb::from(image.get_pixel(x, y).0)));
                }
            }
            self.conn
                .send_and_check_request(&x::PutImage {
                    format: x::ImageFormat::ZPixmap,
                    drawable: x::Drawable::Pixmap(pixmap),
                    gc: self.gc,
                    width: to_u16(b.width)?,
                    height: to_u16(rows)?,
                    dst_x: to_i16(i64::from(b.dst_x))?,
                    dst_y: to_i16(i64::from(b.dst_y) + i64::from(row))?,
                    left_pad: 0,
                    depth: self.depth,
                    data: bytemuck::cast_slice(data.as_slice()),
                })
                .map_err(x_err("PutImage"))?;
            row += rows;
        }
        Ok(())
    }

    fn fill_rect(&mut self, surface: SurfaceId, rect: Rect, color: Rgb) -> BackdropResult<()> {
        let pixmap = self.pixmap(surface)?;
        self.conn.send_request(&x::ChangeGc {
            gc: self.gc,
            value_list: &[x::Gc::Foreground(self.pixel(color))],
        });
        self.conn
            .send_and_check_request(&x::PolyFillRectangle {
                drawable: x::Drawable::Pixmap(pixmap),
                gc: self.gc,
                rectangles: &[x::Rectangle {
                    x: to_i16(i64::from(rect.x))?,
                    y: to_i16(i64::from(rect.y))?,
                    width: to_u16(rect.width)?,
                    height: to_u16(rect.height)?,
                }],
            })
            .map_err(x_err("PolyFillRectangle"))
    }

    fn grab(&mut self) -> BackdropResult<()> {
        self.conn
            .send_and_check_request(&x::GrabServer {})
            .map_err(x_err("GrabServer"))
    }

    fn ungrab(&mut self) -> BackdropResult<()> {
        self.conn
            .send_and_check_request(&x::UngrabServer {})
            .map_err(x_err("UngrabServer"))
    }

    fn root_property(&mut self, name: &str) -> BackdropResult<Option<SurfaceId>> {
        let Some(atom) = self.atom(name, false)? else {
            return Ok(None);
        };
        let cookie = self.conn.send_request(&x::GetProperty {
            delete: false,
            window: self.root,
            property: atom,
            r#type: x::ATOM_ANY,
            long_offset: 0,
            long_length: 1,
        });
        let reply = self
            .conn
            .wait_for_reply(cookie)
            .map_err(x_err("GetProperty"))?;
        if reply.r#type() != x::ATOM_PIXMAP || reply.format() != 32 || reply.length() != 1 {
            return Ok(None);
        }
        Ok(reply.value::<u32>().first().copied().filter(|id| *id != 0))
    }

    fn set_root_property(&mut self, name: &str, surface: SurfaceId) -> BackdropResult<()> {
        let atom = self
            .atom(name, true)?
            .ok_or_else(|| BackdropError::display(format!("cannot intern {name}")))?;
        self.conn
            .send_and_check_request(&x::ChangeProperty {
                mode: x::PropMode::Replace,
                window: self.root,
                property: atom,
                r#type: x::ATOM_PIXMAP,
                data: &[surface],
            })
            .map_err(x_err("ChangeProperty"))
    }

    fn delete_root_property(&mut self, name: &str) -> BackdropResult<()> {
        let Some(atom) = self.atom(name, false)? else {
            return Ok(());
        };
        self.conn
            .send_and_check_request(&x::DeleteProperty {
                window: self.root,
                property: atom,
            })
            .map_err(x_err("DeleteProperty"))
    }

    fn kill_surface_owner(&mut self, surface: SurfaceId) -> BackdropResult<()> {
        // A stale id yields an asynchronous BadValue that nothing waits for.
        self.conn.send_request(&x::KillClient { resource: surface });
        self.surfaces.remove(&surface);
        Ok(())
    }

    fn set_root_background(&mut self, background: RootBackground) -> BackdropResult<()> {
        let value = match background {
            RootBackground::None => x::Cw::BackPixmap(x::Pixmap::none()),
            RootBackground::Color(c) => x::Cw::BackPixel(self.pixel(c)),
            RootBackground::Surface(id) => x::Cw::BackPixmap(self.pixmap(id)?),
        };
        self.conn
            .send_and_check_request(&x::ChangeWindowAttributes {
                window: self.root,
                value_list: &[value],
            })
            .map_err(x_err("ChangeWindowAttributes"))
    }

    fn clear_root(&mut self) -> BackdropResult<()> {
        self.conn
            .send_and_check_request(&x::ClearArea {
                exposures: false,
                window: self.root,
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            })
            .map_err(x_err("ClearArea"))
    }

    fn desktop_shell_running(&mut self) -> BackdropResult<bool> {
        let Some(atom) = self.atom(NAUTILUS_DESKTOP_WINDOW_ID, false)? else {
            return Ok(false);
        };
        let cookie = self.conn.send_request(&x::GetProperty {
            delete: false,
            window: self.root,
            property: atom,
            r#type: x::ATOM_WINDOW,
            long_offset: 0,
            long_length: 1,
        });
        let reply = self
            .conn
            .wait_for_reply(cookie)
            .map_err(x_err("GetProperty"))?;
        if reply.r#type() != x::ATOM_WINDOW || reply.format() != 32 {
            return Ok(false);
        }
        let Some(window) = reply.value::<x::Window>().first().copied() else {
            return Ok(false);
        };

        let cookie = self.conn.send_request(&x::GetProperty {
            delete: false,
            window,
            property: x::ATOM_WM_CLASS,
            r#type: x::ATOM_STRING,
            long_offset: 0,
            long_length: 64,
        });
        // The window may be stale; a failed lookup means no shell.
        let Ok(class) = self.conn.wait_for_reply(cookie) else {
            return Ok(false);
        };
        let mut parts = class.value::<u8>().split(|b| *b == 0);
        Ok(parts.next() == Some(b"desktop_window".as_slice())
            && parts.next() == Some(b"Nautilus".as_slice()))
    }

    fn flush(&mut self) -> BackdropResult<()> {
        self.conn.flush().map_err(x_err("flush"))
    }
}

impl Drop for X11Display {
    fn drop(&mut self) {
        self.conn.send_request(&x::FreeGc { gc: self.gc });
        let _ = self.conn.flush();
    }
}
