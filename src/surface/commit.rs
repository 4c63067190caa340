//! Cross-process replacement of the root background surface.
//!
//! Whoever publishes a background surface leaves its id in `ESETROOT_PMAP_ID` and
//! `_XROOTPMAP_ID` on the root window. The next publisher (or clearer) kills the owner of the
//! previous id once the root points elsewhere, which is how the retained surface gets freed.
//! All of it happens under a server grab so two publishers cannot interleave.

use crate::{
    foundation::error::BackdropResult,
    surface::display::{DisplayServer, ESETROOT_PMAP_ID, RootBackground, SurfaceId, XROOTPMAP_ID},
};

/// Request to the committer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commit {
    /// Make this surface the shared desktop background.
    Publish(SurfaceId),
    /// Remove the published background and leave the root without one.
    ///
    /// `retain` names a surface the caller still draws on; its owner is not killed even if it
    /// was the published one.
    Clear { retain: Option<SurfaceId> },
    /// Only read the currently published id.
    Query,
}

/// Run `commit` under the server grab and return the id published afterwards.
///
/// The grab is released on every path, including errors.
#[tracing::instrument(skip(display))]
pub fn commit_root_surface(
    display: &mut dyn DisplayServer,
    commit: Commit,
) -> BackdropResult<Option<SurfaceId>> {
    display.grab()?;
    let result = commit_grabbed(display, commit);
    let released = display.ungrab().and_then(|()| display.flush());
    let published = result?;
    released?;
    tracing::debug!(?published, "root surface committed");
    Ok(published)
}

fn commit_grabbed(
    display: &mut dyn DisplayServer,
    commit: Commit,
) -> BackdropResult<Option<SurfaceId>> {
    let legacy = display.root_property(ESETROOT_PMAP_ID)?;
    let current = display.root_property(XROOTPMAP_ID)?;
    let previous = [legacy, current];

    match commit {
        Commit::Query => Ok(legacy.or(current)),
        Commit::Publish(surface) => {
            display.set_root_property(ESETROOT_PMAP_ID, surface)?;
            display.set_root_property(XROOTPMAP_ID, surface)?;
            display.set_root_background(RootBackground::Surface(surface))?;
            release_previous(display, previous, Some(surface))?;
            display.clear_root()?;
            Ok(Some(surface))
        }
        Commit::Clear { retain } => {
            display.delete_root_property(ESETROOT_PMAP_ID)?;
            display.delete_root_property(XROOTPMAP_ID)?;
            display.set_root_background(RootBackground::None)?;
            release_previous(display, previous, retain)?;
            display.clear_root()?;
            Ok(None)
        }
    }
}

/// Kill the owner of every distinct previously published id except `keep`.
///
/// Runs only once the root no longer names those ids.
fn release_previous(
    display: &mut dyn DisplayServer,
    previous: [Option<SurfaceId>; 2],
    keep: Option<SurfaceId>,
) -> BackdropResult<()> {
    let mut killed: Vec<SurfaceId> = Vec::with_capacity(2);
    for old in previous.into_iter().flatten() {
        if Some(old) != keep && !killed.contains(&old) {
            tracing::debug!(old, "releasing previous root surface");
            display.kill_surface_owner(old)?;
            killed.push(old);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/surface/commit.rs"]
mod tests;
